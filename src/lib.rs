// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Astrochart API: session authentication and subscription entitlements
//!
//! This crate verifies signed session cookies, resolves each caller's
//! subscription plan (degrading gracefully when billing is stale, down or
//! absent) and gates plan-limited chart features.

pub mod billing;
pub mod config;
pub mod db;
pub mod entitlements;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use billing::BillingProvider;
use config::Config;
use db::UserStore;
use services::SubscriptionResolver;
use session::{AdminSessionStore, UserSessionStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: UserStore,
    pub sessions: UserSessionStore,
    pub admin_sessions: AdminSessionStore,
    pub subscriptions: SubscriptionResolver,
}

impl AppState {
    /// Wire up session stores and the resolver from configuration.
    pub fn new(config: Config, users: UserStore, billing: Arc<dyn BillingProvider>) -> Self {
        let sessions = UserSessionStore::for_users(&config.session_secret, config.cookie_secure);
        let admin_sessions =
            AdminSessionStore::for_admins(&config.admin_session_secret, config.cookie_secure);
        let subscriptions = SubscriptionResolver::new(config.billing_enabled, billing);

        Self {
            config,
            users,
            sessions,
            admin_sessions,
            subscriptions,
        }
    }
}
