// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed session token codec (HS256 JWT).
//!
//! Decoding is fail-closed: any problem with a token (bad signature, expired,
//! malformed, wrong shape) yields `None` and nothing else. Callers cannot
//! learn which check failed.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// Lifetime of a freshly issued token, in days.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Lifetime of a freshly issued token.
pub fn session_ttl() -> Duration {
    Duration::days(SESSION_TTL_DAYS)
}

/// End-user session claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    #[serde(rename = "sub")]
    pub user_id: String,
    pub username: String,
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl SessionPayload {
    /// Build claims for a session issued at `now`, valid for [`session_ttl`].
    pub fn issue(user_id: impl Into<String>, username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            issued_at: now,
            expires_at: now + session_ttl(),
        }
    }
}

/// Back-office role carried by an admin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Admin,
    Superadmin,
}

/// Admin session claims. Signed with a separate key from [`SessionPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSessionPayload {
    #[serde(rename = "sub")]
    pub username: String,
    pub role: AdminRole,
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl AdminSessionPayload {
    pub fn issue(username: impl Into<String>, role: AdminRole, now: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            role,
            issued_at: now,
            expires_at: now + session_ttl(),
        }
    }
}

/// HMAC token codec bound to one signing key.
///
/// Construct one instance per session namespace; tokens from one instance
/// never verify under another.
#[derive(Clone)]
pub struct TokenCodec {
    namespace: &'static str,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(namespace: &'static str, secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            namespace,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign claims into a compact, URL-safe token.
    pub fn encode<T: Serialize>(&self, claims: &T) -> anyhow::Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?)
    }

    /// Verify and decode a token. Returns `None` on any failure.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        match decode::<T>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(_) => {
                tracing::debug!(namespace = self.namespace, "Rejected session token");
                None
            }
        }
    }
}
