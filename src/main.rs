mod config;
mod db;
mod entities;
mod error;
mod models;
mod routes;
mod session;
mod store;
mod templates;
mod tmdb;

use std::{sync::Arc, time::Duration};

use axum_extra::extract::cookie::Key;

use crate::{
    config::Config,
    store::Store,
    tmdb::{TmdbClient, TmdbCredentials},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub tmdb: Arc<TmdbClient>,
    pub cookie_key: Key,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,moviedeck=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("moviedeck/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;

    let tmdb = TmdbClient::new(
        http,
        TmdbCredentials::from_config(&config.tmdb_api_key, &config.tmdb_access_token),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    );

    let state = AppState {
        config: config.clone(),
        store: Store::new(db),
        tmdb: Arc::new(tmdb),
        cookie_key: session::cookie_key(&config.secret_key),
    };

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
