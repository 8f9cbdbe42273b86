// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::billing::CheckoutSession;
use crate::entitlements::{self, PlanLimits};
use crate::error::{AppError, Result};
use crate::models::{ChartType, SubscriptionPlan, SubscriptionStatus};
use crate::services::SessionWithSubscription;
use crate::session::SessionPayload;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require an end-user session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/subscription/status", get(get_subscription_status))
        .route("/api/entitlements", get(get_entitlements))
        .route("/api/entitlements/charts/{chart_type}", get(check_chart_access))
        .route("/api/billing/checkout", post(create_checkout))
        .route("/api/billing/portal", get(get_portal))
}

// ─── Session ─────────────────────────────────────────────────

/// Current session joined with its subscription.
async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionPayload>,
) -> Result<Json<SessionWithSubscription>> {
    state
        .subscriptions
        .session_with_subscription(Some(&session))
        .await
        .map(Json)
        .ok_or(AppError::Unauthorized)
}

// ─── Subscription Status ─────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    #[serde(default)]
    pub force_sync: bool,
}

/// Subscription status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusResponse {
    pub plan: String,
    pub is_active: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub trial_days_left: Option<i64>,
    pub subscription_ends_at: Option<String>,
    pub is_stale: bool,
}

impl From<SubscriptionStatus> for StatusResponse {
    fn from(status: SubscriptionStatus) -> Self {
        Self {
            plan: status.plan.to_string(),
            is_active: status.is_active,
            trial_days_left: status.trial_days_left,
            subscription_ends_at: status.subscription_ends_at.map(format_utc_rfc3339),
            is_stale: status.is_stale,
        }
    }
}

/// Effective subscription for the caller; `forceSync=true` bypasses caches.
async fn get_subscription_status(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionPayload>,
    Query(params): Query<StatusParams>,
) -> Json<StatusResponse> {
    let status = state
        .subscriptions
        .resolve(&session.user_id, params.force_sync)
        .await;
    Json(status.into())
}

// ─── Entitlements ────────────────────────────────────────────

/// Limits for the caller's plan.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementsResponse {
    pub plan: SubscriptionPlan,
    pub limits: PlanLimits,
    pub chart_types: BTreeMap<&'static str, bool>,
}

async fn get_entitlements(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionPayload>,
) -> Json<EntitlementsResponse> {
    let plan = state
        .subscriptions
        .resolve(&session.user_id, false)
        .await
        .plan;

    let chart_types = ChartType::ALL
        .into_iter()
        .map(|ct| (ct.as_str(), entitlements::can_access_chart_type(plan, ct)))
        .collect();

    Json(EntitlementsResponse {
        plan,
        limits: entitlements::limits_for(plan),
        chart_types,
    })
}

/// 204 if the caller's plan includes the chart type, 403 otherwise.
async fn check_chart_access(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionPayload>,
    Path(chart_type): Path<String>,
) -> Result<StatusCode> {
    let chart_type: ChartType = chart_type.parse().map_err(AppError::BadRequest)?;
    let plan = state
        .subscriptions
        .resolve(&session.user_id, false)
        .await
        .plan;

    entitlements::require_chart_type(plan, chart_type)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Billing ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 128))]
    product_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalResponse {
    pub url: String,
}

/// Start a hosted checkout for the caller.
async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionPayload>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSession>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !state.subscriptions.billing_enabled() {
        return Err(AppError::BadRequest("Billing is disabled".to_string()));
    }

    let metadata = HashMap::from([
        ("user_id".to_string(), session.user_id.clone()),
        ("username".to_string(), session.username.clone()),
    ]);

    let checkout = state
        .subscriptions
        .provider()
        .create_checkout_session(&body.product_id, &metadata)
        .await?;

    tracing::info!(
        user_id = %session.user_id,
        product_id = %body.product_id,
        session_id = %checkout.session_id,
        "Checkout session created"
    );

    Ok(Json(checkout))
}

/// Billing self-service portal URL for the caller.
async fn get_portal(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionPayload>,
) -> Result<Json<PortalResponse>> {
    let user = state
        .users
        .find_user(&session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", session.user_id)))?;

    let customer_id = user
        .customer_id
        .ok_or_else(|| AppError::NotFound("No billing customer".to_string()))?;

    let url = state
        .subscriptions
        .provider()
        .get_customer_portal_url(&customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No billing portal".to_string()))?;

    Ok(Json(PortalResponse { url }))
}
