//! Likes, subscriptions, and the toggle operation

use anyhow::Result;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::engagement::Toggled;
use crate::views;

/// The relation kinds the toggle operation can act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    VideoLike,
    CommentLike,
    TweetLike,
    Subscription,
}

impl RelationKind {
    fn table(self) -> &'static str {
        match self {
            RelationKind::VideoLike | RelationKind::CommentLike | RelationKind::TweetLike => {
                "likes"
            }
            RelationKind::Subscription => "subscriptions",
        }
    }

    fn target_column(self) -> &'static str {
        match self {
            RelationKind::VideoLike => "video_id",
            RelationKind::CommentLike => "comment_id",
            RelationKind::TweetLike => "tweet_id",
            RelationKind::Subscription => "channel_id",
        }
    }

    fn actor_column(self) -> &'static str {
        match self {
            RelationKind::VideoLike | RelationKind::CommentLike | RelationKind::TweetLike => {
                "liked_by"
            }
            RelationKind::Subscription => "subscriber_id",
        }
    }
}

/// Repository for like/subscription rows
#[derive(Clone)]
pub struct EngagementRepository {
    pool: PgPool,
}

impl EngagementRepository {
    /// Create a new engagement repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the relation if absent, delete it otherwise.
    ///
    /// Delete-if-exists runs first; when nothing was deleted the row is
    /// created. Concurrent duplicate toggles from one actor are resolved by
    /// the unique indexes on the relation tables, not in-process.
    pub async fn toggle(&self, kind: RelationKind, target: Uuid, actor: Uuid) -> Result<Toggled> {
        info!("Toggling {:?} on {} by {}", kind, target, actor);

        let delete = format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
            kind.table(),
            kind.target_column(),
            kind.actor_column()
        );
        let deleted = sqlx::query(&delete)
            .bind(target)
            .bind(actor)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() > 0 {
            return Ok(Toggled { created: false });
        }

        let insert = format!(
            "INSERT INTO {} ({}, {}) VALUES ($1, $2)",
            kind.table(),
            kind.target_column(),
            kind.actor_column()
        );
        sqlx::query(&insert)
            .bind(target)
            .bind(actor)
            .execute(&self.pool)
            .await?;

        Ok(Toggled { created: true })
    }

    /// Videos the user has liked, resolved through the liked-videos view
    pub async fn liked_videos(&self, user: Uuid) -> Result<Vec<Value>> {
        let liked = views::liked_videos(user).fetch_all(&self.pool).await?;
        Ok(liked)
    }

    /// Subscriber list for a channel
    pub async fn channel_subscribers(&self, channel: Uuid) -> Result<Vec<Value>> {
        let subscribers = views::channel_subscribers(channel)
            .fetch_all(&self.pool)
            .await?;
        Ok(subscribers)
    }

    /// Channels a user has subscribed to
    pub async fn subscribed_channels(&self, subscriber: Uuid) -> Result<Vec<Value>> {
        let channels = views::subscribed_channels(subscriber)
            .fetch_all(&self.pool)
            .await?;
        Ok(channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_kind_column_mapping() {
        assert_eq!(RelationKind::VideoLike.table(), "likes");
        assert_eq!(RelationKind::VideoLike.target_column(), "video_id");
        assert_eq!(RelationKind::VideoLike.actor_column(), "liked_by");

        assert_eq!(RelationKind::CommentLike.target_column(), "comment_id");
        assert_eq!(RelationKind::TweetLike.target_column(), "tweet_id");

        assert_eq!(RelationKind::Subscription.table(), "subscriptions");
        assert_eq!(RelationKind::Subscription.target_column(), "channel_id");
        assert_eq!(RelationKind::Subscription.actor_column(), "subscriber_id");
    }
}
