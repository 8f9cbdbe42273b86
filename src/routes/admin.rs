// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Back-office routes (admin session required).

use crate::error::{AppError, Result};
use crate::models::User;
use crate::routes::api::{StatusParams, StatusResponse};
use crate::session::AdminSessionPayload;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;

/// Routes open to any admin role.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/admin/users/{user_id}", get(get_user))
}

/// Routes reserved to superadmins.
pub fn superadmin_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/admin/users/{user_id}/subscription",
        get(get_user_subscription),
    )
}

/// Look up a user record in the identity store.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSessionPayload>,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    tracing::info!(admin = %admin.username, user_id = %user_id, "Admin user lookup");

    state
        .users
        .find_user(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

/// Resolve any user's subscription, optionally forcing a provider sync.
async fn get_user_subscription(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSessionPayload>,
    Path(user_id): Path<String>,
    Query(params): Query<StatusParams>,
) -> Json<StatusResponse> {
    let resolution = state
        .subscriptions
        .resolve_detailed(&user_id, params.force_sync)
        .await;

    tracing::info!(
        admin = %admin.username,
        user_id = %user_id,
        force_sync = params.force_sync,
        source = resolution.source.as_str(),
        "Admin subscription resolution"
    );

    Json(resolution.status.into())
}
