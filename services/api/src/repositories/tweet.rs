//! Tweet repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::tweet::Tweet;

const TWEET_COLUMNS: &str = "id, owner_id, content, created_at, updated_at";

/// Tweet repository
#[derive(Clone)]
pub struct TweetRepository {
    pool: PgPool,
}

impl TweetRepository {
    /// Create a new tweet repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Publish a tweet
    pub async fn create(&self, owner: Uuid, content: &str) -> Result<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            r#"
            INSERT INTO tweets (owner_id, content)
            VALUES ($1, $2)
            RETURNING {TWEET_COLUMNS}
            "#
        ))
        .bind(owner)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(tweet)
    }

    /// All tweets by a user, oldest first
    pub async fn by_user(&self, user: Uuid) -> Result<Vec<Tweet>> {
        let tweets = sqlx::query_as::<_, Tweet>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE owner_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(tweets)
    }

    /// Find a tweet by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    /// Replace a tweet's content
    pub async fn update(&self, id: Uuid, content: &str) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            r#"
            UPDATE tweets
            SET content = $2, updated_at = now()
            WHERE id = $1
            RETURNING {TWEET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    /// Delete a tweet, returning the deleted record
    pub async fn delete(&self, id: Uuid) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            "DELETE FROM tweets WHERE id = $1 RETURNING {TWEET_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }
}
