// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Billing provider abstraction.
//!
//! The provider is chosen once at startup:
//! - [`RemoteBilling`] talks to the billing API and caches results
//! - [`UnavailableBilling`] stands in when no billing module is configured
//! - [`InMemoryBilling`] is deterministic, for tests and local runs

pub mod memory;
pub mod remote;
pub mod unavailable;

pub use memory::InMemoryBilling;
pub use remote::RemoteBilling;
pub use unavailable::UnavailableBilling;

use crate::config::Config;
use crate::error::AppError;
use crate::models::SubscriptionStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Billing errors. These never reach end users from the resolver.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BillingError {
    /// No billing module is configured in this deployment.
    #[error("billing module unavailable")]
    Unavailable,

    /// The provider failed or returned something we could not use.
    #[error("billing provider error: {0}")]
    Provider(String),
}

/// Options for a subscription lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Skip any provider-side cache and ask the billing API directly.
    pub force_sync: bool,
}

/// A hosted checkout page created by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub checkout_url: String,
    pub session_id: String,
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Current subscription state for a user.
    async fn get_user_subscription(
        &self,
        user_id: &str,
        options: SyncOptions,
    ) -> Result<SubscriptionStatus, BillingError>;

    /// Start a hosted checkout for `product_id`.
    async fn create_checkout_session(
        &self,
        product_id: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<CheckoutSession, BillingError>;

    /// Self-service portal URL for a billing customer, if the provider has one.
    async fn get_customer_portal_url(
        &self,
        customer_id: &str,
    ) -> Result<Option<String>, BillingError>;
}

/// Pick the provider for this deployment.
///
/// Without billing API settings the billing module is considered absent and
/// [`UnavailableBilling`] is used.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn BillingProvider>> {
    match &config.billing_api {
        Some(api) => Ok(Arc::new(RemoteBilling::new(api)?)),
        None => {
            if config.billing_enabled {
                tracing::warn!(
                    "BILLING_ENABLED is set but no billing API is configured; \
                     subscriptions will resolve to lifetime (degraded)"
                );
            }
            Ok(Arc::new(UnavailableBilling))
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        AppError::Billing(err.to_string())
    }
}
