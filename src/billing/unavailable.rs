// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Null billing provider for deployments without a billing module.

use super::{BillingError, BillingProvider, CheckoutSession, SyncOptions};
use crate::models::SubscriptionStatus;
use async_trait::async_trait;
use std::collections::HashMap;

/// Every call reports [`BillingError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBilling;

#[async_trait]
impl BillingProvider for UnavailableBilling {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn get_user_subscription(
        &self,
        _user_id: &str,
        _options: SyncOptions,
    ) -> Result<SubscriptionStatus, BillingError> {
        Err(BillingError::Unavailable)
    }

    async fn create_checkout_session(
        &self,
        _product_id: &str,
        _metadata: &HashMap<String, String>,
    ) -> Result<CheckoutSession, BillingError> {
        Err(BillingError::Unavailable)
    }

    async fn get_customer_portal_url(
        &self,
        _customer_id: &str,
    ) -> Result<Option<String>, BillingError> {
        Err(BillingError::Unavailable)
    }
}
