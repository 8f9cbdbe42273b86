// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP billing provider client with a per-user subscription cache.
//!
//! Lookup order for a subscription:
//! 1. Fresh cache entry (younger than the TTL), unless `force_sync`
//! 2. Billing API
//! 3. On API failure, the last cached entry marked `is_stale`, as long as it
//!    is younger than [`STALE_RETENTION_FACTOR`] times the TTL

use super::{BillingError, BillingProvider, CheckoutSession, SyncOptions};
use crate::config::BillingApiConfig;
use crate::models::{SubscriptionPlan, SubscriptionStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const SECONDS_PER_DAY: i64 = 86_400;

/// Cached entries are kept as a stale fallback for this many TTLs, then evicted.
pub const STALE_RETENTION_FACTOR: u32 = 10;

/// Sweep the whole cache once every this many inserts.
const PRUNE_EVERY_INSERTS: usize = 256;

#[derive(Clone)]
struct CachedStatus {
    status: SubscriptionStatus,
    fetched_at: Instant,
}

/// Subscription cache shared by all clones of a [`RemoteBilling`].
type SubscriptionCache = Arc<DashMap<String, CachedStatus>>;

/// Subscription record as returned by the billing API.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSubscription {
    pub plan: String,
    /// `active`, `trialing`, `past_due`, `canceled`, ...
    pub status: String,
    #[serde(default)]
    pub trial_ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl RemoteSubscription {
    /// Map the provider record onto our status model.
    ///
    /// Inactive subscriptions drop to `free`; the end date is kept for display.
    /// A `free` result is never active, even when the provider calls the
    /// record active under a plan name we do not know.
    pub fn into_status(self, now: DateTime<Utc>) -> SubscriptionStatus {
        let billing_active = matches!(self.status.as_str(), "active" | "trialing");
        let plan = if billing_active {
            SubscriptionPlan::parse_or_free(&self.plan)
        } else {
            SubscriptionPlan::Free
        };
        let is_active = plan != SubscriptionPlan::Free;
        let trial_days_left = match (plan, self.trial_ends_at) {
            (SubscriptionPlan::Trial, Some(ends)) => Some(trial_days_left(ends, now)),
            _ => None,
        };

        SubscriptionStatus {
            plan,
            is_active,
            trial_days_left,
            subscription_ends_at: self.current_period_end,
            is_stale: false,
        }
    }
}

/// Whole days left in a trial, rounded up, never negative.
pub fn trial_days_left(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (ends_at - now).num_seconds();
    if secs <= 0 {
        0
    } else {
        (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }
}

#[derive(Serialize)]
struct CheckoutRequest<'a> {
    product_id: &'a str,
    metadata: &'a HashMap<String, String>,
}

#[derive(Deserialize)]
struct CheckoutResponse {
    id: String,
    url: String,
}

#[derive(Deserialize)]
struct PortalResponse {
    url: String,
}

/// Billing API client.
#[derive(Clone)]
pub struct RemoteBilling {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    cache_ttl: Duration,
    cache: SubscriptionCache,
    inserts: Arc<AtomicUsize>,
}

impl RemoteBilling {
    pub fn new(config: &BillingApiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        tracing::info!(
            base_url = %config.base_url,
            ttl_secs = config.cache_ttl.as_secs(),
            "Billing API client initialized"
        );

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            cache_ttl: config.cache_ttl,
            cache: Arc::new(DashMap::new()),
            inserts: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Drop the cached subscription for a user (e.g. after a webhook).
    pub fn invalidate(&self, user_id: &str) {
        self.cache.remove(user_id);
    }

    /// Number of cached subscriptions, fresh or stale.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Drop every entry too old to serve even as a stale fallback.
    pub fn prune(&self) {
        let max_age = self.max_stale_age();
        self.cache.retain(|_, entry| entry.fetched_at.elapsed() < max_age);
    }

    fn max_stale_age(&self) -> Duration {
        self.cache_ttl.saturating_mul(STALE_RETENTION_FACTOR)
    }

    fn store(&self, user_id: &str, status: SubscriptionStatus) {
        self.cache.insert(
            user_id.to_string(),
            CachedStatus {
                status,
                fetched_at: Instant::now(),
            },
        );
        let inserted = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if inserted % PRUNE_EVERY_INSERTS == 0 {
            self.prune();
        }
    }

    async fn fetch_subscription(&self, user_id: &str) -> Result<SubscriptionStatus, BillingError> {
        let url = format!(
            "{}/v1/subscriptions/{}",
            self.base_url,
            urlencoding::encode(user_id)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| BillingError::Provider(e.to_string()))?;

        // No subscription on record is a normal answer, not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(SubscriptionStatus {
                plan: SubscriptionPlan::Free,
                is_active: false,
                trial_days_left: None,
                subscription_ends_at: None,
                is_stale: false,
            });
        }

        let record: RemoteSubscription = check_response_json(response).await?;
        Ok(record.into_status(Utc::now()))
    }
}

#[async_trait]
impl BillingProvider for RemoteBilling {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn get_user_subscription(
        &self,
        user_id: &str,
        options: SyncOptions,
    ) -> Result<SubscriptionStatus, BillingError> {
        if !options.force_sync {
            if let Some(cached) = self.cache.get(user_id) {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(cached.status.clone());
                }
            }
        }

        match self.fetch_subscription(user_id).await {
            Ok(status) => {
                self.store(user_id, status.clone());
                Ok(status)
            }
            Err(err) => {
                let max_age = self.max_stale_age();
                let Some(cached) = self
                    .cache
                    .get(user_id)
                    .filter(|c| c.fetched_at.elapsed() < max_age)
                    .map(|c| c.status.clone())
                else {
                    self.cache.remove(user_id);
                    return Err(err);
                };
                tracing::info!(
                    user_id = %user_id,
                    error = %err,
                    "Billing API failed, serving stale subscription"
                );
                Ok(SubscriptionStatus {
                    is_stale: true,
                    ..cached
                })
            }
        }
    }

    async fn create_checkout_session(
        &self,
        product_id: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<CheckoutSession, BillingError> {
        let response = self
            .http
            .post(format!("{}/v1/checkouts", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CheckoutRequest {
                product_id,
                metadata,
            })
            .send()
            .await
            .map_err(|e| BillingError::Provider(e.to_string()))?;

        let checkout: CheckoutResponse = check_response_json(response).await?;
        Ok(CheckoutSession {
            checkout_url: checkout.url,
            session_id: checkout.id,
        })
    }

    async fn get_customer_portal_url(
        &self,
        customer_id: &str,
    ) -> Result<Option<String>, BillingError> {
        let url = format!(
            "{}/v1/customers/{}/portal",
            self.base_url,
            urlencoding::encode(customer_id)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| BillingError::Provider(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let portal: PortalResponse = check_response_json(response).await?;
        Ok(Some(portal.url))
    }
}

/// Check response status and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, BillingError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Billing API rate limit hit (429)");
        }

        return Err(BillingError::Provider(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| BillingError::Provider(format!("JSON parse error: {}", e)))
}
