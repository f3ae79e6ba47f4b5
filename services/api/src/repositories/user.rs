//! User repository for database operations

use anyhow::Result;
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::user::{RegisterUser, User};
use crate::views;

const USER_COLUMNS: &str = "id, username, email, password_hash, display_name, avatar_url, cover_url, refresh_token, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a hashed password and case-normalized username
    pub async fn create(
        &self,
        payload: &RegisterUser,
        avatar_url: String,
        cover_url: Option<String>,
    ) -> Result<User> {
        info!("Creating new user: {}", payload.normalized_username());

        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(payload.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, display_name, avatar_url, cover_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(payload.normalized_username())
        .bind(&payload.email)
        .bind(password_hash)
        .bind(&payload.display_name)
        .bind(avatar_url)
        .bind(cover_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user matching either username or email
    pub async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2"
        ))
        .bind(username.to_lowercase())
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Update display name and email
    pub async fn update_account(
        &self,
        id: Uuid,
        display_name: &str,
        email: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET display_name = $2, email = $3, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(display_name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replace the avatar reference
    pub async fn set_avatar(&self, id: Uuid, url: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET avatar_url = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replace the cover image reference
    pub async fn set_cover(&self, id: Uuid, url: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET cover_url = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Channel profile view for a username, as seen by the viewer
    pub async fn channel_profile(&self, username: &str, viewer: Uuid) -> Result<Option<Value>> {
        let profile = views::channel_profile(username, viewer)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// The user's watch history, oldest first
    pub async fn watch_history(&self, user: Uuid) -> Result<Vec<Value>> {
        let history = views::watch_history(user).fetch_all(&self.pool).await?;
        Ok(history)
    }

    /// Append a video to the user's watch history
    pub async fn record_watch(&self, user: Uuid, video: Uuid) -> Result<()> {
        sqlx::query("INSERT INTO watch_history (user_id, video_id) VALUES ($1, $2)")
            .bind(user)
            .bind(video)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
