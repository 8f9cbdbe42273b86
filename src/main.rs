// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Astrochart API Server
//!
//! Authenticates sessions and resolves subscription entitlements for the
//! chart application.

use astrochart_api::{billing, config::Config, db::UserStore, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        billing_enabled = config.billing_enabled,
        "Starting Astrochart API"
    );

    // Identity store
    let users = match &config.gcp_project_id {
        Some(project) => UserStore::firestore(project).await?,
        None => {
            tracing::warn!("GCP_PROJECT_ID not set, using in-memory user store");
            UserStore::in_memory()
        }
    };

    // Billing provider (null provider when no billing API is configured)
    let billing = billing::provider_from_config(&config)?;
    tracing::info!(provider = billing.name(), "Billing provider selected");

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), users, billing));

    // Build router
    let app = astrochart_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("astrochart_api=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
