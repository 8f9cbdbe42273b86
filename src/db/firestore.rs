// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity store: user records in Firestore, or in memory for local runs.
//!
//! Failures here are the only ones allowed to fail a request outright;
//! there is no safe default for "we don't know who this user is".

use crate::db::collections;
use crate::error::AppError;
use crate::models::{User, UserUpdate};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<DashMap<String, User>>),
    Offline,
}

/// User record store.
#[derive(Clone)]
pub struct UserStore {
    backend: Backend,
}

impl UserStore {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn firestore(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// In-process store for local runs and tests.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    /// Store that fails every call, for exercising the fatal-error path.
    pub fn offline() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    /// Get a user by ID.
    pub async fn find_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(user_id)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(users) => Ok(users.get(user_id).map(|u| u.clone())),
            Backend::Offline => Err(offline_error()),
        }
    }

    /// Create or replace a user record.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USERS)
                    .document_id(&user.id)
                    .object(user)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(users) => {
                users.insert(user.id.clone(), user.clone());
                Ok(())
            }
            Backend::Offline => Err(offline_error()),
        }
    }

    /// Apply a partial update to an existing user.
    ///
    /// Fetch-modify-write; returns `NotFound` if the user does not exist.
    pub async fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User, AppError> {
        let mut user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        update.apply(&mut user);
        self.upsert_user(&user).await?;

        tracing::debug!(user_id = %user_id, "User record updated");
        Ok(user)
    }
}

fn offline_error() -> AppError {
    AppError::Database("Database not connected (offline mode)".to_string())
}
