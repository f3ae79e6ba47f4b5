//! Application state shared across handlers

use sqlx::PgPool;

use crate::assets::AssetClient;
use crate::middleware::JwtVerifier;
use crate::repositories::{
    CommentRepository, EngagementRepository, PlaylistRepository, TweetRepository, UserRepository,
    VideoRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub users: UserRepository,
    pub videos: VideoRepository,
    pub comments: CommentRepository,
    pub playlists: PlaylistRepository,
    pub tweets: TweetRepository,
    pub engagement: EngagementRepository,
    pub assets: AssetClient,
    pub jwt: JwtVerifier,
}

impl AppState {
    pub fn new(pool: PgPool, assets: AssetClient, jwt: JwtVerifier) -> Self {
        AppState {
            users: UserRepository::new(pool.clone()),
            videos: VideoRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            playlists: PlaylistRepository::new(pool.clone()),
            tweets: TweetRepository::new(pool.clone()),
            engagement: EngagementRepository::new(pool.clone()),
            db_pool: pool,
            assets,
            jwt,
        }
    }
}
