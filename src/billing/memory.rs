// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deterministic in-process billing provider.

use super::{BillingError, BillingProvider, CheckoutSession, SyncOptions};
use crate::models::{SubscriptionPlan, SubscriptionStatus};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    subscriptions: DashMap<String, SubscriptionStatus>,
    portals: DashMap<String, String>,
    failing: AtomicBool,
    lookups: AtomicUsize,
    forced_lookups: AtomicUsize,
    checkouts: AtomicUsize,
}

/// Billing provider backed by maps. Clones share state.
///
/// Users without a record are on the free plan.
#[derive(Clone, Default)]
pub struct InMemoryBilling {
    inner: Arc<Inner>,
}

impl InMemoryBilling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_subscription(&self, user_id: &str, status: SubscriptionStatus) {
        self.inner.subscriptions.insert(user_id.to_string(), status);
    }

    pub fn set_portal_url(&self, customer_id: &str, url: &str) {
        self.inner
            .portals
            .insert(customer_id.to_string(), url.to_string());
    }

    /// Make every subsequent call fail with a provider error.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of subscription lookups served so far.
    pub fn lookups(&self) -> usize {
        self.inner.lookups.load(Ordering::SeqCst)
    }

    /// Number of subscription lookups that asked for a forced sync.
    pub fn forced_lookups(&self) -> usize {
        self.inner.forced_lookups.load(Ordering::SeqCst)
    }

    fn check_failing(&self) -> Result<(), BillingError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            Err(BillingError::Provider("simulated provider outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BillingProvider for InMemoryBilling {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    async fn get_user_subscription(
        &self,
        user_id: &str,
        options: SyncOptions,
    ) -> Result<SubscriptionStatus, BillingError> {
        self.inner.lookups.fetch_add(1, Ordering::SeqCst);
        if options.force_sync {
            self.inner.forced_lookups.fetch_add(1, Ordering::SeqCst);
        }
        self.check_failing()?;

        Ok(self
            .inner
            .subscriptions
            .get(user_id)
            .map(|s| s.clone())
            .unwrap_or(SubscriptionStatus {
                plan: SubscriptionPlan::Free,
                is_active: false,
                trial_days_left: None,
                subscription_ends_at: None,
                is_stale: false,
            }))
    }

    async fn create_checkout_session(
        &self,
        product_id: &str,
        _metadata: &HashMap<String, String>,
    ) -> Result<CheckoutSession, BillingError> {
        self.check_failing()?;
        let n = self.inner.checkouts.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CheckoutSession {
            checkout_url: format!("https://billing.invalid/checkout/{product_id}/{n}"),
            session_id: format!("cs_{n}"),
        })
    }

    async fn get_customer_portal_url(
        &self,
        customer_id: &str,
    ) -> Result<Option<String>, BillingError> {
        self.check_failing()?;
        Ok(self.inner.portals.get(customer_id).map(|u| u.clone()))
    }
}
