//! Database-backed tests for the toggle operation and the paginator
//!
//! These tests run against a real PostgreSQL instance and are skipped when
//! no `DATABASE_URL` is provided. Each test seeds its own users and videos
//! and removes them at the end, so repeated runs against the same database
//! stay independent.

use std::collections::HashSet;

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use api::models::user::{RegisterUser, User};
use api::pagination::{paginate, PageRequest};
use api::repositories::engagement::RelationKind;
use api::repositories::{
    CommentRepository, EngagementRepository, UserRepository, VideoRepository,
};
use api::views;
use common::database::{init_pool, DatabaseConfig};

async fn test_pool() -> Result<Option<PgPool>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping database integration test");
        return Ok(None);
    }

    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(Some(pool))
}

async fn seed_user(pool: &PgPool, tag: &str) -> Result<User> {
    let suffix = Uuid::new_v4().simple().to_string();
    let payload = RegisterUser {
        username: format!("{}_{}", tag, &suffix[..10]),
        email: format!("{}_{}@example.com", tag, &suffix[..10]),
        password: "correct-horse".to_string(),
        display_name: "Integration".to_string(),
        avatar_file: "/tmp/unused-avatar.png".to_string(),
        cover_file: None,
    };
    UserRepository::new(pool.clone())
        .create(&payload, "https://assets/avatar.png".to_string(), None)
        .await
}

async fn remove_users(pool: &PgPool, ids: &[Uuid]) -> Result<()> {
    // Cascades take care of everything the users own
    sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(ids.to_vec())
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_toggle_pairs_create_and_delete() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };

    let owner = seed_user(&pool, "toggleown").await?;
    let viewer = seed_user(&pool, "togglevw").await?;
    let video = VideoRepository::new(pool.clone())
        .create(
            owner.id,
            "Intro",
            "Hello",
            "https://assets/clip.mp4",
            "https://assets/thumb.png",
            12.5,
        )
        .await?;

    let engagement = EngagementRepository::new(pool.clone());

    let first = engagement
        .toggle(RelationKind::VideoLike, video.id, viewer.id)
        .await?;
    let second = engagement
        .toggle(RelationKind::VideoLike, video.id, viewer.id)
        .await?;
    let third = engagement
        .toggle(RelationKind::VideoLike, video.id, viewer.id)
        .await?;
    assert!(first.created);
    assert!(!second.created);
    assert!(third.created);

    // After the third toggle the relation exists and the liked-videos view
    // resolves it; one more toggle removes it again.
    let video_key = serde_json::json!(video.id);
    let liked = engagement.liked_videos(viewer.id).await?;
    assert!(liked.iter().any(|row| row["video_id"] == video_key));

    let fourth = engagement
        .toggle(RelationKind::VideoLike, video.id, viewer.id)
        .await?;
    assert!(!fourth.created);

    let liked = engagement.liked_videos(viewer.id).await?;
    assert!(liked.iter().all(|row| row["video_id"] != video_key));

    remove_users(&pool, &[owner.id, viewer.id]).await
}

#[tokio::test]
async fn test_comment_pages_concatenate_without_gaps() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };

    let owner = seed_user(&pool, "pageown").await?;
    let video = VideoRepository::new(pool.clone())
        .create(
            owner.id,
            "Paged",
            "Hello",
            "https://assets/clip.mp4",
            "https://assets/thumb.png",
            1.0,
        )
        .await?;

    let comments = CommentRepository::new(pool.clone());
    for i in 0..25 {
        comments
            .create(video.id, owner.id, &format!("comment {i}"))
            .await?;
    }

    let spec = views::comment_listing(video.id);
    let mut seen = HashSet::new();
    for page in 1..=3 {
        let window = paginate(&pool, &spec, PageRequest::new(Some(page), Some(10))).await?;
        assert_eq!(window.total_items, 25);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.current_page, page);
        assert_eq!(window.items.len(), if page < 3 { 10 } else { 5 });
        for item in &window.items {
            let id = item["id"].as_str().unwrap().to_string();
            assert!(seen.insert(id), "page {page} repeated a comment");
        }
    }
    assert_eq!(seen.len(), 25);

    // A window past the end is empty, not an error
    let past = paginate(&pool, &spec, PageRequest::new(Some(4), Some(10))).await?;
    assert!(past.items.is_empty());
    assert_eq!(past.total_items, 25);

    remove_users(&pool, &[owner.id]).await
}
