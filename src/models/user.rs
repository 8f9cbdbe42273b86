//! User record held by the identity store.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user ID (also used as document ID)
    pub id: String,
    /// Login name, as shown in the session
    pub username: String,
    /// Whether the onboarding flow has been finished
    #[serde(default)]
    pub onboarding_completed: bool,
    /// Version of the terms of service the user accepted
    #[serde(default)]
    pub terms_accepted_version: Option<String>,
    /// Version of the privacy policy the user accepted
    #[serde(default)]
    pub privacy_accepted_version: Option<String>,
    /// Billing provider customer ID, once the user has checked out
    #[serde(default)]
    pub customer_id: Option<String>,
    /// When the account was created (ISO 8601)
    pub created_at: String,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub onboarding_completed: Option<bool>,
    pub terms_accepted_version: Option<String>,
    pub privacy_accepted_version: Option<String>,
    pub customer_id: Option<String>,
}

impl UserUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(done) = self.onboarding_completed {
            user.onboarding_completed = done;
        }
        if let Some(version) = self.terms_accepted_version {
            user.terms_accepted_version = Some(version);
        }
        if let Some(version) = self.privacy_accepted_version {
            user.privacy_accepted_version = Some(version);
        }
        if let Some(customer_id) = self.customer_id {
            user.customer_id = Some(customer_id);
        }
    }
}
