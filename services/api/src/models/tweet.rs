//! Tweet model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::validate_required;

/// Tweet entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tweet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tweet creation/update payload
#[derive(Debug, Clone, Deserialize)]
pub struct TweetBody {
    pub content: String,
}

impl TweetBody {
    pub fn validate(&self) -> Vec<String> {
        match validate_required("Content", &self.content) {
            Ok(()) => Vec::new(),
            Err(v) => vec![v],
        }
    }
}
