mod api;
mod auth;
mod lists;
mod movies;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(movies::index))
        .route("/top-rated", get(movies::top_rated))
        .route("/new-released", get(movies::new_released))
        .route("/movie/{movie_id}", get(movies::movie_details))
        .route("/recommend", post(movies::recommend))
        .route("/watchlist", get(lists::view_watchlist).post(lists::remove_from_watchlist))
        .route("/watchlist/add/{movie_id}", post(lists::add_to_watchlist))
        .route("/favorites", get(lists::view_favorites).post(lists::remove_from_favorites))
        .route("/favorites/add/{movie_id}", post(lists::add_to_favorites))
        .route("/history", get(lists::view_history))
        .route("/api/watchlist/add/{movie_id}", post(api::add_to_watchlist))
        .route("/api/favorites/add/{movie_id}", post(api::add_to_favorites))
        .route("/api/history/add/{movie_id}", post(api::add_to_history))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
