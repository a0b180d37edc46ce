use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use futures::{StreamExt, stream};

use crate::{
    AppState,
    error::AppResult,
    models::{Category, Movie, RemoveRequest},
    session::AuthSession,
    templates,
    tmdb::TmdbClient,
};

pub async fn add_to_watchlist(
    State(state): State<AppState>,
    session: AuthSession,
    Path(movie_id): Path<i32>,
) -> AppResult<Redirect> {
    add(&state, &session, movie_id, Category::Watchlist).await
}

pub async fn add_to_favorites(
    State(state): State<AppState>,
    session: AuthSession,
    Path(movie_id): Path<i32>,
) -> AppResult<Redirect> {
    add(&state, &session, movie_id, Category::Favorites).await
}

pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    session: AuthSession,
    Form(req): Form<RemoveRequest>,
) -> AppResult<Redirect> {
    remove(&state, &session, req, Category::Watchlist).await
}

pub async fn remove_from_favorites(
    State(state): State<AppState>,
    session: AuthSession,
    Form(req): Form<RemoveRequest>,
) -> AppResult<Redirect> {
    remove(&state, &session, req, Category::Favorites).await
}

pub async fn view_watchlist(
    State(state): State<AppState>,
    session: AuthSession,
) -> AppResult<Response> {
    view(&state, session, Category::Watchlist).await
}

pub async fn view_favorites(
    State(state): State<AppState>,
    session: AuthSession,
) -> AppResult<Response> {
    view(&state, session, Category::Favorites).await
}

pub async fn view_history(
    State(state): State<AppState>,
    session: AuthSession,
) -> AppResult<Response> {
    let ids = state.store.list_history(session.user.id).await?;
    let movies = resolve_movies(&state.tmdb, ids, state.config.max_concurrent).await;
    let html = templates::history_page(&session.context(), &movies);
    Ok((session.jar, Html(html)).into_response())
}

async fn add(
    state: &AppState,
    session: &AuthSession,
    movie_id: i32,
    category: Category,
) -> AppResult<Redirect> {
    let added = state.store.add_movie(session.user.id, movie_id, category).await?;
    tracing::debug!(
        user_id = session.user.id,
        movie_id,
        category = category.as_str(),
        added,
        "add movie"
    );
    Ok(Redirect::to(category.path()))
}

async fn remove(
    state: &AppState,
    session: &AuthSession,
    req: RemoveRequest,
    category: Category,
) -> AppResult<Redirect> {
    let movie_id = req.movie_id.as_deref().and_then(|s| s.trim().parse::<i32>().ok());
    let removed = match movie_id {
        Some(id) => state.store.remove_movie(session.user.id, id, category).await?,
        None => false,
    };

    if removed {
        tracing::debug!(
            user_id = session.user.id,
            movie_id = ?movie_id,
            category = category.as_str(),
            "removed movie"
        );
    } else {
        tracing::debug!(
            user_id = session.user.id,
            raw_id = ?req.movie_id,
            category = category.as_str(),
            "movie id not found in list"
        );
    }

    Ok(Redirect::to(category.path()))
}

async fn view(state: &AppState, session: AuthSession, category: Category) -> AppResult<Response> {
    let ids = state.store.list_movies(session.user.id, category).await?;
    let movies = resolve_movies(&state.tmdb, ids, state.config.max_concurrent).await;
    let html = templates::saved_list_page(&session.context(), category, &movies);
    Ok((session.jar, Html(html)).into_response())
}

/// Fetches details for each id, keeping list order. Ids TMDB can't resolve are
/// dropped from the page.
pub async fn resolve_movies(
    tmdb: &TmdbClient,
    ids: Vec<i32>,
    max_concurrent: usize,
) -> Vec<Movie> {
    let items: Vec<Option<Movie>> = stream::iter(ids)
        .map(|movie_id| async move {
            match tmdb.details(movie_id).await {
                Ok(movie) => {
                    if movie.is_none() {
                        tracing::debug!(movie_id, "movie not found");
                    }
                    movie
                },
                Err(err) => {
                    tracing::warn!(movie_id, error = %err, "failed to fetch movie");
                    None
                },
            }
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    items.into_iter().flatten().collect()
}
