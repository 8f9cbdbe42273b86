// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::error::AppError;
use crate::session::{AdminRole, AdminSessionPayload, SessionPayload};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Middleware that requires a valid end-user session.
///
/// The cookie is checked first and, when valid, re-issued with a renewed
/// lifetime (sliding expiration). A bearer token is accepted as a fallback
/// but never refreshed. The decoded [`SessionPayload`] is added to request
/// extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (jar, session) = state.sessions.refresh(jar);

    if let Some(session) = session {
        request.extensions_mut().insert(session);
        let response = next.run(request).await;
        return Ok((jar, response).into_response());
    }

    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    // Missing, malformed, expired and forged tokens all look the same.
    let session: SessionPayload = bearer
        .and_then(|token| state.sessions.decode(&token))
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Middleware for back-office routes; any admin role.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    admin_guard(&state, &jar, request, next, AdminRole::Admin).await
}

/// Middleware for routes reserved to superadmins.
pub async fn require_superadmin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    admin_guard(&state, &jar, request, next, AdminRole::Superadmin).await
}

async fn admin_guard(
    state: &AppState,
    jar: &CookieJar,
    mut request: Request,
    next: Next,
    minimum: AdminRole,
) -> Result<Response, AppError> {
    let admin: AdminSessionPayload = state
        .admin_sessions
        .read(jar)
        .ok_or(AppError::Unauthorized)?;

    if admin.role < minimum {
        tracing::warn!(
            username = %admin.username,
            role = ?admin.role,
            required = ?minimum,
            path = %request.uri().path(),
            "Blocked admin request with insufficient role"
        );
        return Err(AppError::Forbidden("insufficient admin role".to_string()));
    }

    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}
