// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cookie-backed session store.
//!
//! The store never touches anything but the request's cookie jar. Each
//! namespace (end user, admin) gets its own store, codec and cookie name.

use super::codec::{session_ttl, AdminSessionPayload, SessionPayload, TokenCodec};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

/// Cookie name for end-user sessions.
pub const USER_SESSION_COOKIE: &str = "astro_session";
/// Cookie name for admin sessions.
pub const ADMIN_SESSION_COOKIE: &str = "astro_admin_session";

/// Claims that can be stored as a session.
pub trait SessionClaims: Serialize + DeserializeOwned {
    fn expires_at(&self) -> DateTime<Utc>;
}

impl SessionClaims for SessionPayload {
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl SessionClaims for AdminSessionPayload {
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Session store for one namespace.
#[derive(Debug, Clone)]
pub struct SessionStore<P> {
    codec: TokenCodec,
    cookie_name: &'static str,
    secure: bool,
    _claims: PhantomData<fn() -> P>,
}

pub type UserSessionStore = SessionStore<SessionPayload>;
pub type AdminSessionStore = SessionStore<AdminSessionPayload>;

impl UserSessionStore {
    pub fn for_users(secret: &[u8], secure: bool) -> Self {
        Self::new(TokenCodec::new("user", secret), USER_SESSION_COOKIE, secure)
    }
}

impl AdminSessionStore {
    pub fn for_admins(secret: &[u8], secure: bool) -> Self {
        Self::new(TokenCodec::new("admin", secret), ADMIN_SESSION_COOKIE, secure)
    }
}

impl<P: SessionClaims> SessionStore<P> {
    pub fn new(codec: TokenCodec, cookie_name: &'static str, secure: bool) -> Self {
        Self {
            codec,
            cookie_name,
            secure,
            _claims: PhantomData,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn cookie_name(&self) -> &'static str {
        self.cookie_name
    }

    /// Issue a token for `claims` and store it with a matching expiration.
    pub fn create(&self, jar: CookieJar, claims: &P) -> anyhow::Result<CookieJar> {
        let token = self.codec.encode(claims)?;
        let max_age = (claims.expires_at() - Utc::now()).num_seconds().max(0);
        Ok(jar.add(self.cookie(token, max_age)))
    }

    /// Decode the stored token without touching its expiration.
    pub fn read(&self, jar: &CookieJar) -> Option<P> {
        let cookie = jar.get(self.cookie_name)?;
        self.decode(cookie.value())
    }

    /// Verify a raw token string (e.g. from an `Authorization` header).
    pub fn decode(&self, token: &str) -> Option<P> {
        self.codec.decode(token)
    }

    /// Re-store a valid token with a renewed cookie lifetime.
    ///
    /// The token (and so its `exp` claim) is unchanged. Returns the jar
    /// untouched and `None` when there is no valid session to refresh.
    pub fn refresh(&self, jar: CookieJar) -> (CookieJar, Option<P>) {
        let Some(token) = jar.get(self.cookie_name).map(|c| c.value().to_string()) else {
            return (jar, None);
        };
        let Some(claims) = self.decode(&token) else {
            return (jar, None);
        };

        let jar = jar.add(self.cookie(token, session_ttl().num_seconds()));
        (jar, Some(claims))
    }

    /// Remove the stored token. Safe to call when no session exists.
    pub fn destroy(&self, jar: CookieJar) -> CookieJar {
        let mut removal = self.cookie(String::new(), 0);
        removal.make_removal();
        jar.add(removal)
    }

    fn cookie(&self, value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build((self.cookie_name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(max_age_secs))
            .build()
    }
}
