//! Comment model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::validate_required;

/// Comment entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub video_id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment creation/update payload
#[derive(Debug, Clone, Deserialize)]
pub struct CommentBody {
    pub content: String,
}

impl CommentBody {
    pub fn validate(&self) -> Vec<String> {
        match validate_required("Content", &self.content) {
            Ok(()) => Vec::new(),
            Err(v) => vec![v],
        }
    }
}

/// Query parameters for the comment listing view
#[derive(Debug, Clone, Deserialize)]
pub struct CommentListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
