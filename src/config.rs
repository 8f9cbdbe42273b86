// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything here is read once at startup and never mutated afterwards.
//! Signing secrets are handed to the token codecs at construction time.

use std::env;
use std::time::Duration;

/// Minimum length of a signing secret before we refuse it and use a fallback.
pub const MIN_SECRET_LEN: usize = 32;

/// Fallback key for end-user sessions. Only used when `SESSION_SECRET` is
/// missing or too short.
const FALLBACK_SESSION_SECRET: &[u8] = b"INSECURE-FALLBACK-user-session-key-do-not-use-in-production";

/// Fallback key for admin sessions. Distinct from the user fallback so the two
/// namespaces stay non-interchangeable even in an unconfigured deployment.
const FALLBACK_ADMIN_SECRET: &[u8] = b"INSECURE-FALLBACK-admin-session-key-do-not-use-in-production";

const DEFAULT_BILLING_CACHE_TTL_SECS: u64 = 300;

/// Connection details for the external billing provider.
#[derive(Debug, Clone)]
pub struct BillingApiConfig {
    /// Base URL of the provider API (no trailing slash)
    pub base_url: String,
    /// Bearer token for the provider API
    pub api_key: String,
    /// How long a fetched subscription is considered fresh
    pub cache_ttl: Duration,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL (CORS origin, cookie security)
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Whether session cookies carry the `Secure` attribute
    pub cookie_secure: bool,
    /// GCP project for the Firestore identity store (in-memory store when unset)
    pub gcp_project_id: Option<String>,

    /// HMAC key for end-user session tokens (raw bytes)
    pub session_secret: Vec<u8>,
    /// HMAC key for admin session tokens (raw bytes)
    pub admin_session_secret: Vec<u8>,

    /// Global billing switch. When off, every user resolves to lifetime.
    pub billing_enabled: bool,
    /// Billing provider API; `None` means the billing module is absent.
    pub billing_api: Option<BillingApiConfig>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let cookie_secure = match env::var("COOKIE_SECURE") {
            Ok(v) => parse_bool("COOKIE_SECURE", &v)?,
            Err(_) => !is_local_url(&frontend_url),
        };

        let billing_enabled = match env::var("BILLING_ENABLED") {
            Ok(v) => parse_bool("BILLING_ENABLED", &v)?,
            Err(_) => false,
        };

        let billing_api = match (env::var("BILLING_API_URL"), env::var("BILLING_API_KEY")) {
            (Ok(url), Ok(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                let ttl_secs = match env::var("BILLING_CACHE_TTL_SECS") {
                    Ok(v) => v
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::Invalid("BILLING_CACHE_TTL_SECS", v))?,
                    Err(_) => DEFAULT_BILLING_CACHE_TTL_SECS,
                };
                Some(BillingApiConfig {
                    base_url: url.trim().trim_end_matches('/').to_string(),
                    api_key: key.trim().to_string(),
                    cache_ttl: Duration::from_secs(ttl_secs),
                })
            }
            _ => None,
        };

        Ok(Self {
            frontend_url,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            cookie_secure,
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            session_secret: signing_secret(
                "SESSION_SECRET",
                env::var("SESSION_SECRET").ok(),
                FALLBACK_SESSION_SECRET,
            ),
            admin_session_secret: signing_secret(
                "ADMIN_SESSION_SECRET",
                env::var("ADMIN_SESSION_SECRET").ok(),
                FALLBACK_ADMIN_SECRET,
            ),
            billing_enabled,
            billing_api,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            cookie_secure: false,
            gcp_project_id: None,
            session_secret: b"test_session_key_32_bytes_minimum!!".to_vec(),
            admin_session_secret: b"test_admin_key_32_bytes_minimum!!!!".to_vec(),
            billing_enabled: true,
            billing_api: None,
        }
    }
}

/// Pick the configured secret, or the fallback key if it is missing or short.
///
/// Logs once per key; this only runs during config load.
fn signing_secret(name: &'static str, configured: Option<String>, fallback: &[u8]) -> Vec<u8> {
    match configured {
        Some(value) if value.len() >= MIN_SECRET_LEN => value.into_bytes(),
        Some(value) => {
            tracing::warn!(
                variable = name,
                length = value.len(),
                minimum = MIN_SECRET_LEN,
                "Signing secret too short, using INSECURE fallback key"
            );
            fallback.to_vec()
        }
        None => {
            tracing::warn!(
                variable = name,
                "Signing secret not set, using INSECURE fallback key"
            );
            fallback.to_vec()
        }
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid(name, value.to_string())),
    }
}

fn is_local_url(url: &str) -> bool {
    url.starts_with("http://localhost") || url.starts_with("http://127.0.0.1")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_uses_fallback() {
        let secret = signing_secret("SESSION_SECRET", Some("short".to_string()), FALLBACK_SESSION_SECRET);
        assert_eq!(secret, FALLBACK_SESSION_SECRET);

        let secret = signing_secret("SESSION_SECRET", None, FALLBACK_SESSION_SECRET);
        assert_eq!(secret, FALLBACK_SESSION_SECRET);
    }

    #[test]
    fn test_long_secret_is_kept() {
        let configured = "a".repeat(MIN_SECRET_LEN);
        let secret = signing_secret("SESSION_SECRET", Some(configured.clone()), FALLBACK_SESSION_SECRET);
        assert_eq!(secret, configured.into_bytes());
    }

    #[test]
    fn test_fallback_keys_differ() {
        assert_ne!(FALLBACK_SESSION_SECRET, FALLBACK_ADMIN_SECRET);
        assert!(FALLBACK_SESSION_SECRET.len() >= MIN_SECRET_LEN);
        assert!(FALLBACK_ADMIN_SECRET.len() >= MIN_SECRET_LEN);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", " 1 ").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_local_url_detection() {
        assert!(is_local_url("http://localhost:5173"));
        assert!(is_local_url("http://127.0.0.1:3000"));
        assert!(!is_local_url("https://charts.example.com"));
    }
}
