//! Video model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::validate_required;

/// Video entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub media_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub view_count: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Publish payload; file fields are paths staged by the upload middleware
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishVideo {
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail_file: String,
}

impl PublishVideo {
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if let Err(v) = validate_required("Title", &self.title) {
            violations.push(v);
        }
        if let Err(v) = validate_required("Description", &self.description) {
            violations.push(v);
        }
        if let Err(v) = validate_required("Video file", &self.video_file) {
            violations.push(v);
        }
        if let Err(v) = validate_required("Thumbnail file", &self.thumbnail_file) {
            violations.push(v);
        }
        violations
    }
}

/// Update payload; replacing the thumbnail is optional
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideo {
    pub title: String,
    pub description: String,
    pub thumbnail_file: Option<String>,
}

impl UpdateVideo {
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if let Err(v) = validate_required("Title", &self.title) {
            violations.push(v);
        }
        if let Err(v) = validate_required("Description", &self.description) {
            violations.push(v);
        }
        violations
    }
}

/// Query parameters for the video listing view
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_requires_title_and_description() {
        let payload = PublishVideo {
            title: " ".to_string(),
            description: String::new(),
            video_file: "/tmp/staged/clip.mp4".to_string(),
            thumbnail_file: "/tmp/staged/thumb.png".to_string(),
        };
        let violations = payload.validate();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("Title"));
        assert!(violations[1].contains("Description"));
    }

    #[test]
    fn test_update_thumbnail_is_optional() {
        let payload = UpdateVideo {
            title: "Intro".to_string(),
            description: "Hello".to_string(),
            thumbnail_file: None,
        };
        assert!(payload.validate().is_empty());
    }
}
