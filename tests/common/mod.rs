// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use astrochart_api::billing::{BillingProvider, InMemoryBilling};
use astrochart_api::config::Config;
use astrochart_api::db::UserStore;
use astrochart_api::routes::create_router;
use astrochart_api::session::{AdminRole, AdminSessionPayload, SessionPayload};
use astrochart_api::time_utils::now_secs;
use astrochart_api::AppState;
use axum::{body::Body, response::Response};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Create a test app with billing enabled and an in-memory provider.
/// Returns the router, the shared state and the provider handle.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, InMemoryBilling) {
    let billing = InMemoryBilling::new();
    let (app, state) = create_test_app_with(Config::test_default(), Arc::new(billing.clone()));
    (app, state, billing)
}

/// Create a test app with explicit config and billing provider.
#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    billing: Arc<dyn BillingProvider>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, UserStore::in_memory(), billing));
    (create_router(state.clone()), state)
}

/// `Cookie` header value carrying a fresh user session.
#[allow(dead_code)]
pub fn user_cookie(state: &AppState, user_id: &str, username: &str) -> String {
    let claims = SessionPayload::issue(user_id, username, now_secs());
    let jar = state
        .sessions
        .create(CookieJar::new(), &claims)
        .expect("Failed to create session");
    let token = jar.get(state.sessions.cookie_name()).unwrap().value().to_string();
    format!("{}={}", state.sessions.cookie_name(), token)
}

/// `Cookie` header value carrying a fresh admin session.
#[allow(dead_code)]
pub fn admin_cookie(state: &AppState, username: &str, role: AdminRole) -> String {
    let claims = AdminSessionPayload::issue(username, role, now_secs());
    let jar = state
        .admin_sessions
        .create(CookieJar::new(), &claims)
        .expect("Failed to create admin session");
    let token = jar.get(state.admin_sessions.cookie_name()).unwrap().value().to_string();
    format!("{}={}", state.admin_sessions.cookie_name(), token)
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("response body should be JSON")
}

/// All `Set-Cookie` header values of a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}
