// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription status, entitlement and billing route tests.

use astrochart_api::billing::{InMemoryBilling, UnavailableBilling};
use astrochart_api::config::Config;
use astrochart_api::models::{SubscriptionPlan, SubscriptionStatus, User};
use astrochart_api::time_utils::now_secs;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, cookie: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn status(plan: SubscriptionPlan, is_active: bool) -> SubscriptionStatus {
    SubscriptionStatus {
        plan,
        is_active,
        trial_days_left: None,
        subscription_ends_at: None,
        is_stale: false,
    }
}

async fn call(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

// ─── Status resolution ───────────────────────────────────────

#[tokio::test]
async fn test_status_for_paying_user() {
    let (app, state, billing) = common::create_test_app();
    let ends = now_secs();
    billing.set_subscription(
        "u-1",
        SubscriptionStatus {
            subscription_ends_at: Some(ends),
            ..status(SubscriptionPlan::Pro, true)
        },
    );
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let response = call(&app, get("/api/subscription/status", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::json_body(response).await;
    assert_eq!(body["plan"], "pro");
    assert_eq!(body["isActive"], true);
    assert_eq!(body["isStale"], false);
    assert!(body["trialDaysLeft"].is_null());
    assert_eq!(
        body["subscriptionEndsAt"],
        astrochart_api::time_utils::format_utc_rfc3339(ends)
    );
}

#[tokio::test]
async fn test_trial_days_left_reported() {
    let (app, state, billing) = common::create_test_app();
    billing.set_subscription(
        "u-1",
        SubscriptionStatus {
            trial_days_left: Some(3),
            ..status(SubscriptionPlan::Trial, true)
        },
    );
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let body = common::json_body(call(&app, get("/api/subscription/status", &cookie)).await).await;
    assert_eq!(body["plan"], "trial");
    assert_eq!(body["trialDaysLeft"], 3);
}

#[tokio::test]
async fn test_billing_disabled_grants_lifetime() {
    let billing = InMemoryBilling::new();
    billing.set_failing(true);
    let config = Config {
        billing_enabled: false,
        ..Config::test_default()
    };
    let (app, state) = common::create_test_app_with(config, Arc::new(billing.clone()));
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let body = common::json_body(
        call(&app, get("/api/subscription/status?forceSync=true", &cookie)).await,
    )
    .await;

    assert_eq!(body["plan"], "lifetime");
    assert_eq!(body["isActive"], true);
    assert_eq!(body["isStale"], false);
    // The provider is never consulted, even on a forced sync
    assert_eq!(billing.lookups(), 0);
}

#[tokio::test]
async fn test_unconfigured_billing_grants_lifetime() {
    let (app, state) =
        common::create_test_app_with(Config::test_default(), Arc::new(UnavailableBilling));
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let body = common::json_body(call(&app, get("/api/subscription/status", &cookie)).await).await;
    assert_eq!(body["plan"], "lifetime");
    assert_eq!(body["isActive"], true);
}

#[tokio::test]
async fn test_provider_failure_falls_back_to_free() {
    let (app, state, billing) = common::create_test_app();
    billing.set_subscription("u-1", status(SubscriptionPlan::Pro, true));
    billing.set_failing(true);
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let response = call(&app, get("/api/subscription/status", &cookie)).await;
    // Provider outages never surface as request errors
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::json_body(response).await;
    assert_eq!(body["plan"], "free");
    assert_eq!(body["isActive"], false);
    assert_eq!(body["isStale"], true);
}

#[tokio::test]
async fn test_force_sync_reaches_provider() {
    let (app, state, billing) = common::create_test_app();
    let cookie = common::user_cookie(&state, "u-1", "ada");

    call(&app, get("/api/subscription/status", &cookie)).await;
    assert_eq!(billing.forced_lookups(), 0);

    call(&app, get("/api/subscription/status?forceSync=true", &cookie)).await;
    assert_eq!(billing.lookups(), 2);
    assert_eq!(billing.forced_lookups(), 1);
}

#[tokio::test]
async fn test_status_requires_session() {
    let (app, _, billing) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/subscription/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(billing.lookups(), 0);
}

// ─── Entitlements ────────────────────────────────────────────

#[tokio::test]
async fn test_free_plan_entitlements() {
    let (app, state, _) = common::create_test_app();
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let body = common::json_body(call(&app, get("/api/entitlements", &cookie)).await).await;

    assert_eq!(body["plan"], "free");
    assert_eq!(body["limits"]["maxSubjects"], 5);
    assert_eq!(body["limits"]["allowedChartTypes"], serde_json::json!(["natal"]));
    assert_eq!(body["limits"]["maxAIGenerationsPerDay"], 5);
    assert_eq!(body["chartTypes"]["natal"], true);
    assert_eq!(body["chartTypes"]["transits"], false);
    assert_eq!(body["chartTypes"]["solar_return"], false);
}

#[tokio::test]
async fn test_paid_plan_entitlements() {
    let (app, state, billing) = common::create_test_app();
    billing.set_subscription("u-1", status(SubscriptionPlan::Lifetime, true));
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let body = common::json_body(call(&app, get("/api/entitlements", &cookie)).await).await;

    assert_eq!(body["plan"], "lifetime");
    assert!(body["limits"]["maxSubjects"].is_null());
    assert_eq!(body["limits"]["allowedChartTypes"], "all");
    assert_eq!(body["limits"]["maxAIGenerationsPerDay"], 100);

    let chart_types = body["chartTypes"].as_object().unwrap();
    assert_eq!(chart_types.len(), 8);
    assert!(chart_types.values().all(|allowed| allowed.as_bool() == Some(true)));
}

#[tokio::test]
async fn test_chart_access_gate() {
    let (app, state, billing) = common::create_test_app();
    billing.set_subscription("u-pro", status(SubscriptionPlan::Pro, true));
    let free = common::user_cookie(&state, "u-free", "ada");
    let pro = common::user_cookie(&state, "u-pro", "bob");

    let response = call(&app, get("/api/entitlements/charts/natal", &free)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = call(&app, get("/api/entitlements/charts/synastry", &free)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(common::json_body(response).await["error"], "plan_required");

    let response = call(&app, get("/api/entitlements/charts/solar-return", &pro)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = call(&app, get("/api/entitlements/charts/horoscope", &pro)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_failure_closes_paid_features() {
    let (app, state, billing) = common::create_test_app();
    billing.set_subscription("u-1", status(SubscriptionPlan::Pro, true));
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let response = call(&app, get("/api/entitlements/charts/transits", &cookie)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    billing.set_failing(true);
    let response = call(&app, get("/api/entitlements/charts/transits", &cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ─── Billing ─────────────────────────────────────────────────

#[tokio::test]
async fn test_checkout_session() {
    let (app, state, _) = common::create_test_app();
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let response = call(
        &app,
        post_json(
            "/api/billing/checkout",
            &cookie,
            serde_json::json!({ "productId": "pro_monthly" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::json_body(response).await;
    assert_eq!(
        body["checkoutUrl"],
        "https://billing.invalid/checkout/pro_monthly/1"
    );
    assert_eq!(body["sessionId"], "cs_1");
}

#[tokio::test]
async fn test_checkout_rejects_empty_product() {
    let (app, state, _) = common::create_test_app();
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let response = call(
        &app,
        post_json(
            "/api/billing/checkout",
            &cookie,
            serde_json::json!({ "productId": "" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_when_billing_disabled() {
    let config = Config {
        billing_enabled: false,
        ..Config::test_default()
    };
    let (app, state) = common::create_test_app_with(config, Arc::new(InMemoryBilling::new()));
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let response = call(
        &app,
        post_json(
            "/api/billing/checkout",
            &cookie,
            serde_json::json!({ "productId": "pro_monthly" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_provider_failure() {
    let (app, state, billing) = common::create_test_app();
    billing.set_failing(true);
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let response = call(
        &app,
        post_json(
            "/api/billing/checkout",
            &cookie,
            serde_json::json!({ "productId": "pro_monthly" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_customer_portal() {
    let (app, state, billing) = common::create_test_app();
    let cookie = common::user_cookie(&state, "u-1", "ada");

    // Unknown user
    let response = call(&app, get("/api/billing/portal", &cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Known user, no billing customer yet
    let mut user = User {
        id: "u-1".to_string(),
        username: "ada".to_string(),
        onboarding_completed: true,
        terms_accepted_version: None,
        privacy_accepted_version: None,
        customer_id: None,
        created_at: "2026-01-01T00:00:00Z".to_string(),
    };
    state.users.upsert_user(&user).await.unwrap();
    let response = call(&app, get("/api/billing/portal", &cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Billing customer with a portal
    user.customer_id = Some("cus_1".to_string());
    state.users.upsert_user(&user).await.unwrap();
    billing.set_portal_url("cus_1", "https://billing.invalid/portal/cus_1");
    let response = call(&app, get("/api/billing/portal", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        common::json_body(response).await["url"],
        "https://billing.invalid/portal/cus_1"
    );
}

#[tokio::test]
async fn test_identity_store_failure_is_fatal() {
    use astrochart_api::db::UserStore;
    use astrochart_api::routes::create_router;
    use astrochart_api::AppState;

    let state = Arc::new(AppState::new(
        Config::test_default(),
        UserStore::offline(),
        Arc::new(InMemoryBilling::new()),
    ));
    let app = create_router(state.clone());
    let cookie = common::user_cookie(&state, "u-1", "ada");

    let response = call(&app, get("/api/billing/portal", &cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(common::json_body(response).await["error"], "database_error");
}
