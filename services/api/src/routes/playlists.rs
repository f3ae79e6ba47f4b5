//! Playlist routes

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use serde_json::Value;
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::playlist::{NewPlaylist, Playlist, UpdatePlaylist};
use crate::state::AppState;
use crate::validation::{check, parse_id};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_playlist))
        .route(
            "/:playlist_id",
            get(get_playlist)
                .patch(update_playlist)
                .delete(delete_playlist),
        )
        .route("/add/:video_id/:playlist_id", patch(add_video))
        .route("/remove/:video_id/:playlist_id", patch(remove_video))
        .route("/user/:user_id", get(user_playlists))
}

/// Load a playlist and refuse unless the actor owns it
async fn owned_playlist(state: &AppState, id: Uuid, actor: Uuid) -> ApiResult<Playlist> {
    let playlist = state
        .playlists
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Playlist"))?;
    if playlist.owner_id != actor {
        return Err(ApiError::Permission(
            "You do not have permission to modify this playlist",
        ));
    }
    Ok(playlist)
}

async fn create_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<NewPlaylist>,
) -> ApiResult<Envelope<Playlist>> {
    check(payload.validate())?;

    let playlist = state
        .playlists
        .create(auth.id, &payload.name, &payload.description)
        .await?;

    Ok(Envelope::ok(
        StatusCode::CREATED,
        playlist,
        "Playlist created successfully",
    ))
}

async fn get_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> ApiResult<Envelope<Value>> {
    let id = parse_id(&playlist_id, "playlist")?;

    let detail = state
        .playlists
        .detail(id)
        .await?
        .ok_or(ApiError::NotFound("Playlist"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        detail,
        "Playlist fetched successfully",
    ))
}

async fn user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Envelope<Vec<Playlist>>> {
    let user = parse_id(&user_id, "user")?;

    let playlists = state.playlists.by_user(user).await?;

    Ok(Envelope::ok(
        StatusCode::OK,
        playlists,
        "Playlists fetched successfully",
    ))
}

async fn add_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<Envelope<Value>> {
    let video = parse_id(&video_id, "video")?;
    let playlist = parse_id(&playlist_id, "playlist")?;

    owned_playlist(&state, playlist, auth.id).await?;
    state
        .videos
        .find(video)
        .await?
        .ok_or(ApiError::NotFound("Video"))?;

    state.playlists.add_video(playlist, video).await?;

    let detail = state
        .playlists
        .detail(playlist)
        .await?
        .ok_or(ApiError::NotFound("Playlist"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        detail,
        "Video added to playlist successfully",
    ))
}

async fn remove_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<Envelope<Value>> {
    let video = parse_id(&video_id, "video")?;
    let playlist = parse_id(&playlist_id, "playlist")?;

    owned_playlist(&state, playlist, auth.id).await?;

    let removed = state.playlists.remove_video(playlist, video).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("Video"));
    }

    let detail = state
        .playlists
        .detail(playlist)
        .await?
        .ok_or(ApiError::NotFound("Playlist"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        detail,
        "Video removed from playlist successfully",
    ))
}

async fn update_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(playlist_id): Path<String>,
    Json(payload): Json<UpdatePlaylist>,
) -> ApiResult<Envelope<Playlist>> {
    let id = parse_id(&playlist_id, "playlist")?;
    check(payload.validate())?;

    owned_playlist(&state, id, auth.id).await?;

    let playlist = state
        .playlists
        .update(id, payload.name.as_deref(), payload.description.as_deref())
        .await?
        .ok_or(ApiError::NotFound("Playlist"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        playlist,
        "Playlist updated successfully",
    ))
}

async fn delete_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(playlist_id): Path<String>,
) -> ApiResult<Envelope<Playlist>> {
    let id = parse_id(&playlist_id, "playlist")?;

    owned_playlist(&state, id, auth.id).await?;

    let playlist = state
        .playlists
        .delete(id)
        .await?
        .ok_or(ApiError::NotFound("Playlist"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        playlist,
        "Playlist deleted successfully",
    ))
}
