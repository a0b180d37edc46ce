use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    AppState,
    error::AppResult,
    models::{Category, RecommendRequest, Recommendations},
    session::Session,
    templates::{self, ListMembership},
};

pub async fn index(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let trending = state.tmdb.trending().await?;
    let html = templates::index_page(&session.context(), &trending, None);
    Ok((session.jar, Html(html)).into_response())
}

pub async fn top_rated(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let movies = state.tmdb.top_rated().await?;
    let html = templates::movie_list_page(&session.context(), "Top Rated", &movies);
    Ok((session.jar, Html(html)).into_response())
}

pub async fn new_released(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let movies = state.tmdb.now_playing().await?;
    let html = templates::movie_list_page(&session.context(), "New Releases", &movies);
    Ok((session.jar, Html(html)).into_response())
}

pub async fn movie_details(
    State(state): State<AppState>,
    session: Session,
    Path(movie_id): Path<i32>,
) -> AppResult<Response> {
    let Some(movie) = state.tmdb.details(movie_id).await? else {
        return Ok((StatusCode::NOT_FOUND, "Movie not found").into_response());
    };

    let membership = match &session.user {
        Some(user) => {
            state.store.record_history(user.id, movie_id).await?;
            Some(ListMembership {
                in_watchlist: state.store.contains(user.id, movie_id, Category::Watchlist).await?,
                in_favorites: state.store.contains(user.id, movie_id, Category::Favorites).await?,
            })
        },
        None => None,
    };

    let html = templates::movie_details_page(&session.context(), &movie, membership);
    Ok((session.jar, Html(html)).into_response())
}

/// Looks the title up and shows TMDB's recommendations for the best match.
pub async fn recommend(
    State(state): State<AppState>,
    session: Session,
    Form(req): Form<RecommendRequest>,
) -> AppResult<Response> {
    let query = req.movie_title.trim().to_string();
    let based_on = state.tmdb.search(&query).await?.into_iter().next();

    let movies = match &based_on {
        Some(movie) => state.tmdb.recommendations(movie.id).await?,
        None => {
            tracing::debug!(query = %query, "no search results");
            Vec::new()
        },
    };

    let rec = Recommendations { query, based_on, movies };
    let html = templates::index_page(&session.context(), &[], Some(&rec));
    Ok((session.jar, Html(html)).into_response())
}
