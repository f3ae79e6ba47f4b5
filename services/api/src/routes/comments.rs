//! Comment routes

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::comment::{Comment, CommentBody, CommentListParams};
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;
use crate::validation::{check, parse_id};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:video_id", get(list_comments).post(add_comment))
        .route("/c/:comment_id", patch(update_comment).delete(delete_comment))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(params): Query<CommentListParams>,
) -> ApiResult<Envelope<Page<Value>>> {
    let video = parse_id(&video_id, "video")?;

    let page = state
        .comments
        .list_for_video(video, PageRequest::new(params.page, params.limit))
        .await?;

    Ok(Envelope::ok(
        StatusCode::OK,
        page,
        "Comments fetched successfully",
    ))
}

async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
    Json(payload): Json<CommentBody>,
) -> ApiResult<Envelope<Comment>> {
    let video = parse_id(&video_id, "video")?;
    check(payload.validate())?;

    state
        .videos
        .find(video)
        .await?
        .ok_or(ApiError::NotFound("Video"))?;

    let comment = state
        .comments
        .create(video, auth.id, &payload.content)
        .await?;

    Ok(Envelope::ok(
        StatusCode::CREATED,
        comment,
        "Comment added successfully",
    ))
}

async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
    Json(payload): Json<CommentBody>,
) -> ApiResult<Envelope<Comment>> {
    let id = parse_id(&comment_id, "comment")?;
    check(payload.validate())?;

    let existing = state
        .comments
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Comment"))?;
    if existing.owner_id != auth.id {
        return Err(ApiError::Permission(
            "You do not have permission to modify this comment",
        ));
    }

    let comment = state
        .comments
        .update(id, &payload.content)
        .await?
        .ok_or(ApiError::NotFound("Comment"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        comment,
        "Comment updated successfully",
    ))
}

async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> ApiResult<Envelope<Comment>> {
    let id = parse_id(&comment_id, "comment")?;

    let existing = state
        .comments
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Comment"))?;
    if existing.owner_id != auth.id {
        return Err(ApiError::Permission(
            "You do not have permission to modify this comment",
        ));
    }

    let comment = state
        .comments
        .delete(id)
        .await?
        .ok_or(ApiError::NotFound("Comment"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        comment,
        "Comment deleted successfully",
    ))
}
