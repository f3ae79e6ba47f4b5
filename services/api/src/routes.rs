//! API service routes

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Router};
use serde_json::json;

use crate::envelope::Envelope;
use crate::middleware::auth_middleware;
use crate::state::AppState;

pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

/// Create the router for the API service
///
/// Everything except the health check and registration requires a valid
/// access token; the middleware attaches the actor id before any handler
/// runs.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/users", users::router())
        .nest("/videos", videos::router())
        .nest("/comments", comments::router())
        .nest("/likes", likes::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/playlists", playlists::router())
        .nest("/tweets", tweets::router())
        .nest("/dashboard", dashboard::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/users/register", post(users::register))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Envelope<serde_json::Value> {
    Envelope::ok(
        StatusCode::OK,
        json!({ "status": "ok", "service": "clipstream-api" }),
        "OK",
    )
}
