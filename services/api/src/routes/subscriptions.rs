//! Subscription routes

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Router};
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::engagement::Toggled;
use crate::repositories::engagement::RelationKind;
use crate::state::AppState;
use crate::validation::parse_id;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/c/:channel_id",
            post(toggle_subscription).get(channel_subscribers),
        )
        .route("/u/:subscriber_id", get(subscribed_channels))
}

async fn toggle_subscription(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<String>,
) -> ApiResult<Envelope<Toggled>> {
    let channel = parse_id(&channel_id, "channel")?;
    if channel == auth.id {
        return Err(ApiError::Validation(vec![
            "You cannot subscribe to your own channel".to_string(),
        ]));
    }

    let toggled = state
        .engagement
        .toggle(RelationKind::Subscription, channel, auth.id)
        .await?;

    let message = if toggled.created {
        "Subscribed successfully"
    } else {
        "Unsubscribed successfully"
    };
    Ok(Envelope::ok(StatusCode::OK, toggled, message))
}

async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<Envelope<Vec<Value>>> {
    let channel = parse_id(&channel_id, "channel")?;

    let subscribers = state.engagement.channel_subscribers(channel).await?;

    Ok(Envelope::ok(
        StatusCode::OK,
        subscribers,
        "Subscribers fetched successfully",
    ))
}

async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> ApiResult<Envelope<Vec<Value>>> {
    let subscriber = parse_id(&subscriber_id, "subscriber")?;

    let channels = state.engagement.subscribed_channels(subscriber).await?;

    Ok(Envelope::ok(
        StatusCode::OK,
        channels,
        "Subscribed channels fetched successfully",
    ))
}
