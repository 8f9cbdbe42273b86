// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription resolution.
//!
//! Decides a user's effective plan. Rules, first match wins:
//! 1. Billing switched off globally: lifetime for everyone
//! 2. No billing module configured: lifetime, logged as degraded
//! 3. Provider answers: its status, unmodified (including `is_stale`)
//! 4. Provider fails: free, marked stale
//!
//! Rule 4 fails closed at every call site. There is no permissive fallback
//! on provider errors.

use crate::billing::{BillingError, BillingProvider, SyncOptions};
use crate::models::{SubscriptionPlan, SubscriptionStatus};
use crate::session::SessionPayload;
use serde::Serialize;
use std::sync::Arc;

/// Which rule produced a status. For logs and telemetry only; the status
/// shape is the same regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    BillingDisabled,
    BillingUnavailable,
    Provider,
    ProviderErrorFallback,
}

impl ResolutionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionSource::BillingDisabled => "billing_disabled",
            ResolutionSource::BillingUnavailable => "billing_unavailable",
            ResolutionSource::Provider => "provider",
            ResolutionSource::ProviderErrorFallback => "provider_error_fallback",
        }
    }

    /// True when the status did not come from the provider's answer.
    pub fn is_degraded(self) -> bool {
        matches!(
            self,
            ResolutionSource::BillingUnavailable | ResolutionSource::ProviderErrorFallback
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: SubscriptionStatus,
    pub source: ResolutionSource,
}

/// Session identity joined with the resolved subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithSubscription {
    pub user_id: String,
    pub username: String,
    pub subscription_plan: SubscriptionPlan,
    pub is_subscription_active: bool,
    pub trial_days_left: Option<i64>,
}

#[derive(Clone)]
pub struct SubscriptionResolver {
    billing_enabled: bool,
    provider: Arc<dyn BillingProvider>,
}

impl SubscriptionResolver {
    pub fn new(billing_enabled: bool, provider: Arc<dyn BillingProvider>) -> Self {
        Self {
            billing_enabled,
            provider,
        }
    }

    pub fn billing_enabled(&self) -> bool {
        self.billing_enabled
    }

    pub fn provider(&self) -> &Arc<dyn BillingProvider> {
        &self.provider
    }

    /// Resolve a user's effective subscription.
    pub async fn resolve(&self, user_id: &str, force_sync: bool) -> SubscriptionStatus {
        self.resolve_detailed(user_id, force_sync).await.status
    }

    /// Resolve, also reporting which rule produced the answer.
    pub async fn resolve_detailed(&self, user_id: &str, force_sync: bool) -> Resolution {
        if !self.billing_enabled {
            return Resolution {
                status: SubscriptionStatus::lifetime_unlocked(),
                source: ResolutionSource::BillingDisabled,
            };
        }

        let options = SyncOptions { force_sync };
        let resolution = match self.provider.get_user_subscription(user_id, options).await {
            Ok(status) => {
                if status.is_stale {
                    tracing::info!(
                        user_id = %user_id,
                        plan = %status.plan,
                        "Serving stale subscription status"
                    );
                }
                Resolution {
                    status,
                    source: ResolutionSource::Provider,
                }
            }
            Err(BillingError::Unavailable) => {
                tracing::warn!(
                    user_id = %user_id,
                    provider = self.provider.name(),
                    degraded = true,
                    source = ResolutionSource::BillingUnavailable.as_str(),
                    "Billing module unavailable, granting lifetime"
                );
                Resolution {
                    status: SubscriptionStatus::lifetime_unlocked(),
                    source: ResolutionSource::BillingUnavailable,
                }
            }
            Err(BillingError::Provider(reason)) => {
                tracing::warn!(
                    user_id = %user_id,
                    provider = self.provider.name(),
                    degraded = true,
                    source = ResolutionSource::ProviderErrorFallback.as_str(),
                    error = %reason,
                    "Billing provider failed, falling back to free"
                );
                Resolution {
                    status: SubscriptionStatus::free_fallback(),
                    source: ResolutionSource::ProviderErrorFallback,
                }
            }
        };

        tracing::debug!(
            user_id = %user_id,
            plan = %resolution.status.plan,
            force_sync,
            source = resolution.source.as_str(),
            "Subscription resolved"
        );

        resolution
    }

    /// Join a session with its subscription. No session, no billing lookup.
    pub async fn session_with_subscription(
        &self,
        session: Option<&SessionPayload>,
    ) -> Option<SessionWithSubscription> {
        let session = session?;
        let status = self.resolve(&session.user_id, false).await;

        Some(SessionWithSubscription {
            user_id: session.user_id.clone(),
            username: session.username.clone(),
            subscription_plan: status.plan,
            is_subscription_active: status.is_active,
            trial_days_left: status.trial_days_left,
        })
    }
}
