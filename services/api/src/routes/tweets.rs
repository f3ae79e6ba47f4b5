//! Tweet routes

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::tweet::{Tweet, TweetBody};
use crate::state::AppState;
use crate::validation::{check, parse_id};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_tweet))
        .route("/user/:user_id", get(user_tweets))
        .route("/:tweet_id", patch(update_tweet).delete(delete_tweet))
}

async fn create_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<TweetBody>,
) -> ApiResult<Envelope<Tweet>> {
    check(payload.validate())?;

    let tweet = state.tweets.create(auth.id, &payload.content).await?;

    Ok(Envelope::ok(
        StatusCode::CREATED,
        tweet,
        "Tweet posted successfully",
    ))
}

async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Envelope<Vec<Tweet>>> {
    let user = parse_id(&user_id, "user")?;

    let tweets = state.tweets.by_user(user).await?;

    Ok(Envelope::ok(
        StatusCode::OK,
        tweets,
        "Tweets fetched successfully",
    ))
}

async fn update_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tweet_id): Path<String>,
    Json(payload): Json<TweetBody>,
) -> ApiResult<Envelope<Tweet>> {
    let id = parse_id(&tweet_id, "tweet")?;
    check(payload.validate())?;

    let existing = state
        .tweets
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Tweet"))?;
    if existing.owner_id != auth.id {
        return Err(ApiError::Permission(
            "You do not have permission to modify this tweet",
        ));
    }

    let tweet = state
        .tweets
        .update(id, &payload.content)
        .await?
        .ok_or(ApiError::NotFound("Tweet"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        tweet,
        "Tweet updated successfully",
    ))
}

async fn delete_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tweet_id): Path<String>,
) -> ApiResult<Envelope<Tweet>> {
    let id = parse_id(&tweet_id, "tweet")?;

    let existing = state
        .tweets
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Tweet"))?;
    if existing.owner_id != auth.id {
        return Err(ApiError::Permission(
            "You do not have permission to modify this tweet",
        ));
    }

    let tweet = state
        .tweets
        .delete(id)
        .await?
        .ok_or(ApiError::NotFound("Tweet"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        tweet,
        "Tweet deleted successfully",
    ))
}
