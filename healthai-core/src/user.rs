//! User account and analysis history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AnalysisKind;

/// A stored user account
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Absent for OAuth-only accounts
    pub password_hash: Option<String>,
    pub full_name: String,
    pub google_id: Option<String>,
    /// "google" when the account was created via OAuth
    pub oauth_provider: Option<String>,
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Public view of the account, safe to serialize in responses
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            profile_picture: self.profile_picture.clone(),
            is_verified: self.is_verified,
        }
    }
}

/// Public user profile returned by auth endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub is_verified: bool,
}

/// One stored inference outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub user_id: i64,
    pub kind: AnalysisKind,
    /// Full report as returned to the client
    pub result: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// One-line summary (e.g., the predicted label)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    pub created_at: DateTime<Utc>,
}
