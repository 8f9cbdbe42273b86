// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session teardown routes.
//!
//! Sessions are created by the login flow through [`crate::session::SessionStore::create`];
//! these routes only clear them.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/admin/logout", post(admin_logout))
}

/// Clear the end-user session cookie. Idempotent.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(session) = state.sessions.read(&jar) {
        tracing::info!(user_id = %session.user_id, "User logged out");
    }
    (state.sessions.destroy(jar), StatusCode::NO_CONTENT)
}

/// Clear the admin session cookie. Idempotent.
async fn admin_logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    if let Some(admin) = state.admin_sessions.read(&jar) {
        tracing::info!(username = %admin.username, "Admin logged out");
    }
    (state.admin_sessions.destroy(jar), StatusCode::NO_CONTENT)
}
