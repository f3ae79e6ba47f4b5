//! Video repository for database operations

use anyhow::Result;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::video::Video;
use crate::pagination::{paginate, Page, PageRequest};
use crate::view::PipelineSpec;
use crate::views;

const VIDEO_COLUMNS: &str = "id, owner_id, title, description, media_url, thumbnail_url, duration_seconds, view_count, is_published, created_at, updated_at";

/// Video repository
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    /// Create a new video repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Window a listing pipeline
    pub async fn list(&self, spec: &PipelineSpec, request: PageRequest) -> Result<Page<Value>> {
        Ok(paginate(&self.pool, spec, request).await?)
    }

    /// Publish a new video
    pub async fn create(
        &self,
        owner: Uuid,
        title: &str,
        description: &str,
        media_url: &str,
        thumbnail_url: &str,
        duration_seconds: f64,
    ) -> Result<Video> {
        info!("Publishing video for owner {}", owner);

        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            INSERT INTO videos (owner_id, title, description, media_url, thumbnail_url, duration_seconds)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(owner)
        .bind(title)
        .bind(description)
        .bind(media_url)
        .bind(thumbnail_url)
        .bind(duration_seconds)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// Find a video by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Video>> {
        let video =
            sqlx::query_as::<_, Video>(&format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(video)
    }

    /// Update title, description, and optionally the thumbnail reference
    pub async fn update_details(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            UPDATE videos
            SET title = $2,
                description = $3,
                thumbnail_url = COALESCE($4, thumbnail_url),
                updated_at = now()
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(thumbnail_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Delete a video, returning the deleted record
    pub async fn delete(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "DELETE FROM videos WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Flip the publish flag
    pub async fn toggle_publish(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            UPDATE videos
            SET is_published = NOT is_published, updated_at = now()
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Bump the view counter
    pub async fn increment_views(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE videos SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All videos owned by a channel, newest first
    pub async fn by_owner(&self, owner: Uuid) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE owner_id = $1 ORDER BY created_at DESC, id ASC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    /// Channel statistics view for an owner
    pub async fn channel_stats(&self, owner: Uuid) -> Result<Option<Value>> {
        let stats = views::channel_stats(owner).fetch_optional(&self.pool).await?;
        Ok(stats)
    }
}
