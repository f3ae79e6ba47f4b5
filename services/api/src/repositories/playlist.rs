//! Playlist repository for database operations

use anyhow::Result;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::playlist::Playlist;
use crate::views;

const PLAYLIST_COLUMNS: &str = "id, owner_id, name, description, created_at, updated_at";

/// Playlist repository
#[derive(Clone)]
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    /// Create a new playlist repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a playlist
    pub async fn create(&self, owner: Uuid, name: &str, description: &str) -> Result<Playlist> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            r#"
            INSERT INTO playlists (owner_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING {PLAYLIST_COLUMNS}
            "#
        ))
        .bind(owner)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    /// All playlists owned by a user
    pub async fn by_user(&self, user: Uuid) -> Result<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE owner_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    /// Find a playlist by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    /// Playlist with its ordered video entries embedded
    pub async fn detail(&self, id: Uuid) -> Result<Option<Value>> {
        let detail = views::playlist_detail(id).fetch_optional(&self.pool).await?;
        Ok(detail)
    }

    /// Append a video to the end of a playlist; duplicates are allowed
    pub async fn add_video(&self, playlist: Uuid, video: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO playlist_videos (playlist_id, video_id, position)
            SELECT $1, $2, COALESCE(MAX(position), 0) + 1
            FROM playlist_videos
            WHERE playlist_id = $1
            "#,
        )
        .bind(playlist)
        .bind(video)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove every occurrence of a video from a playlist
    pub async fn remove_video(&self, playlist: Uuid, video: Uuid) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
                .bind(playlist)
                .bind(video)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Update name and/or description
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            r#"
            UPDATE playlists
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = now()
            WHERE id = $1
            RETURNING {PLAYLIST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    /// Delete a playlist, returning the deleted record
    pub async fn delete(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            "DELETE FROM playlists WHERE id = $1 RETURNING {PLAYLIST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }
}
