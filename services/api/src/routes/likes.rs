//! Like routes, all built on the shared toggle operation

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Router};
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::engagement::Toggled;
use crate::repositories::engagement::RelationKind;
use crate::state::AppState;
use crate::validation::parse_id;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle/v/:video_id", post(toggle_video_like))
        .route("/toggle/c/:comment_id", post(toggle_comment_like))
        .route("/toggle/t/:tweet_id", post(toggle_tweet_like))
        .route("/videos", get(liked_videos))
}

async fn toggle_video_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> ApiResult<Envelope<Toggled>> {
    let video = parse_id(&video_id, "video")?;

    let toggled = state
        .engagement
        .toggle(RelationKind::VideoLike, video, auth.id)
        .await?;

    let message = if toggled.created {
        "Video liked successfully"
    } else {
        "Video like removed successfully"
    };
    Ok(Envelope::ok(StatusCode::OK, toggled, message))
}

async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> ApiResult<Envelope<Toggled>> {
    let comment = parse_id(&comment_id, "comment")?;

    let toggled = state
        .engagement
        .toggle(RelationKind::CommentLike, comment, auth.id)
        .await?;

    let message = if toggled.created {
        "Comment liked successfully"
    } else {
        "Comment like removed successfully"
    };
    Ok(Envelope::ok(StatusCode::OK, toggled, message))
}

async fn toggle_tweet_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tweet_id): Path<String>,
) -> ApiResult<Envelope<Toggled>> {
    let tweet = parse_id(&tweet_id, "tweet")?;

    let toggled = state
        .engagement
        .toggle(RelationKind::TweetLike, tweet, auth.id)
        .await?;

    let message = if toggled.created {
        "Tweet liked successfully"
    } else {
        "Tweet like removed successfully"
    };
    Ok(Envelope::ok(StatusCode::OK, toggled, message))
}

async fn liked_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Envelope<Vec<Value>>> {
    let videos = state.engagement.liked_videos(auth.id).await?;

    Ok(Envelope::ok(
        StatusCode::OK,
        videos,
        "Liked videos fetched successfully",
    ))
}
