//! User model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{validate_email, validate_password, validate_required, validate_username};

/// User entity
///
/// `password_hash` and `refresh_token` are excluded from serialization so
/// they cannot reach the boundary through any view or handler.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: String,
    pub cover_url: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload
///
/// `avatar_file` and `cover_file` are paths to files staged by the upload
/// middleware; the handler pushes them to the asset store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub avatar_file: String,
    pub cover_file: Option<String>,
}

impl RegisterUser {
    /// Collect every violated constraint
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if let Err(v) = validate_username(&self.username) {
            violations.push(v);
        }
        if let Err(v) = validate_email(&self.email) {
            violations.push(v);
        }
        if let Err(v) = validate_password(&self.password) {
            violations.push(v);
        }
        if let Err(v) = validate_required("Display name", &self.display_name) {
            violations.push(v);
        }
        if let Err(v) = validate_required("Avatar file", &self.avatar_file) {
            violations.push(v);
        }
        violations
    }

    /// Usernames are stored case-normalized
    pub fn normalized_username(&self) -> String {
        self.username.to_lowercase()
    }
}

/// Account details update payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccount {
    pub display_name: String,
    pub email: String,
}

impl UpdateAccount {
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if let Err(v) = validate_required("Display name", &self.display_name) {
            violations.push(v);
        }
        if let Err(v) = validate_email(&self.email) {
            violations.push(v);
        }
        violations
    }
}

/// Avatar/cover replacement payload; a staged local file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceImage {
    pub image_file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RegisterUser {
        RegisterUser {
            username: "Creator_One".to_string(),
            email: "creator@example.com".to_string(),
            password: "correct-horse".to_string(),
            display_name: "Creator One".to_string(),
            avatar_file: "/tmp/staged/avatar.png".to_string(),
            cover_file: None,
        }
    }

    #[test]
    fn test_valid_registration_has_no_violations() {
        assert!(payload().validate().is_empty());
    }

    #[test]
    fn test_every_violation_is_listed() {
        let mut bad = payload();
        bad.username = "x".to_string();
        bad.email = "nope".to_string();
        bad.display_name = "  ".to_string();
        let violations = bad.validate();
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_username_is_case_normalized() {
        assert_eq!(payload().normalized_username(), "creator_one");
    }

    #[test]
    fn test_password_hash_never_serializes() {
        let user = User {
            id: Uuid::nil(),
            username: "creator_one".to_string(),
            email: "creator@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            display_name: "Creator One".to_string(),
            avatar_url: "https://assets/avatar.png".to_string(),
            cover_url: None,
            refresh_token: Some("opaque".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["username"], "creator_one");
    }
}
