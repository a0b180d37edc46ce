//! JSON endpoints for adding movies from scripts or client-side code.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::{AppState, error::AppResult, models::Category, session::AuthSession};

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub status: &'static str,
    pub message: String,
}

pub async fn add_to_favorites(
    State(state): State<AppState>,
    session: AuthSession,
    Path(movie_id): Path<i32>,
) -> AppResult<(StatusCode, Json<ApiMessage>)> {
    add(&state, &session, movie_id, Category::Favorites).await
}

pub async fn add_to_watchlist(
    State(state): State<AppState>,
    session: AuthSession,
    Path(movie_id): Path<i32>,
) -> AppResult<(StatusCode, Json<ApiMessage>)> {
    let resp = add(&state, &session, movie_id, Category::Watchlist).await?;
    if resp.0 == StatusCode::OK {
        state.store.record_history(session.user.id, movie_id).await?;
    }
    Ok(resp)
}

pub async fn add_to_history(
    State(state): State<AppState>,
    session: AuthSession,
    Path(movie_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.store.record_history(session.user.id, movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add(
    state: &AppState,
    session: &AuthSession,
    movie_id: i32,
    category: Category,
) -> AppResult<(StatusCode, Json<ApiMessage>)> {
    let list = category.as_str();
    if state.store.add_movie(session.user.id, movie_id, category).await? {
        let message = format!("Movie added to {list}!");
        Ok((StatusCode::OK, Json(ApiMessage { status: "success", message })))
    } else {
        let message = format!("Movie already in {list}.");
        Ok((StatusCode::BAD_REQUEST, Json(ApiMessage { status: "fail", message })))
    }
}
