//! Playlist model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::validate_required;

/// Playlist entity; membership lives in `playlist_videos`
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Playlist {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Playlist creation payload; name and description are both required
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
}

impl NewPlaylist {
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if let Err(v) = validate_required("Name", &self.name) {
            violations.push(v);
        }
        if let Err(v) = validate_required("Description", &self.description) {
            violations.push(v);
        }
        violations
    }
}

/// Playlist update payload; at least one field must be present
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlaylist {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdatePlaylist {
    pub fn validate(&self) -> Vec<String> {
        if self.name.is_none() && self.description.is_none() {
            vec!["Name or description is required".to_string()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_playlist_requires_both_fields() {
        let payload = NewPlaylist {
            name: String::new(),
            description: String::new(),
        };
        assert_eq!(payload.validate().len(), 2);
    }

    #[test]
    fn test_update_needs_at_least_one_field() {
        assert_eq!(UpdatePlaylist::default().validate().len(), 1);
        let partial = UpdatePlaylist {
            name: Some("Watch later".to_string()),
            description: None,
        };
        assert!(partial.validate().is_empty());
    }
}
