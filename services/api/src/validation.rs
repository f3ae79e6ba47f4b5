//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::error::ApiError;

/// Parse a raw path/query parameter into an entity id.
///
/// `what` names the entity for the error message ("video", "comment", ...).
pub fn parse_id(raw: &str, what: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidReference(what))
}

/// Turn a list of violations into a `ValidationError`, or pass when empty.
pub fn check(violations: Vec<String>) -> Result<(), ApiError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(violations))
    }
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Require a non-empty, non-whitespace field
pub fn validate_required(field: &'static str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_malformed_input() {
        assert!(parse_id("not-a-uuid", "video").is_err());
        assert!(parse_id("", "video").is_err());
        assert!(parse_id("6b1c6f3e-58f8-4f44-9b3d-1f0a5f4cbae1", "video").is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("chai_aur_code").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("viewer@example.com").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_check_collects_violations() {
        assert!(check(vec![]).is_ok());
        let err = check(vec!["title is required".to_string()]).unwrap_err();
        match err {
            crate::error::ApiError::Validation(v) => assert_eq!(v.len(), 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
