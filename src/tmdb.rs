use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;

use crate::{error::AppResult, models::Movie};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TmdbCredentials {
    /// v3 key, sent as the `api_key` query parameter.
    ApiKey(String),
    /// v4 read access token, sent as bearer auth.
    AccessToken(String),
    None,
}

impl TmdbCredentials {
    pub fn from_config(api_key: &str, access_token: &str) -> Self {
        if !access_token.trim().is_empty() {
            TmdbCredentials::AccessToken(access_token.trim().to_string())
        } else if !api_key.trim().is_empty() {
            TmdbCredentials::ApiKey(api_key.trim().to_string())
        } else {
            TmdbCredentials::None
        }
    }
}

pub struct TmdbClient {
    client: reqwest::Client,
    credentials: TmdbCredentials,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        credentials: TmdbCredentials,
        base_url: String,
        rps: u32,
    ) -> Self {
        // Warn once on app load if using mock data
        if credentials == TmdbCredentials::None {
            tracing::warn!("Using mock TMDB data - no TMDB_API_KEY or TMDB_ACCESS_TOKEN provided");
        }

        let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        Self { client, credentials, base_url, limiter }
    }

    fn is_mock(&self) -> bool {
        self.credentials == TmdbCredentials::None
    }

    pub async fn trending(&self) -> AppResult<Vec<Movie>> {
        if self.is_mock() {
            return Ok(mock::movies());
        }
        self.fetch_list("trending/movie/week", &[]).await
    }

    pub async fn top_rated(&self) -> AppResult<Vec<Movie>> {
        if self.is_mock() {
            return Ok(mock::movies());
        }
        self.fetch_list("movie/top_rated", &[("language", "en-US"), ("page", "1")]).await
    }

    pub async fn now_playing(&self) -> AppResult<Vec<Movie>> {
        if self.is_mock() {
            return Ok(mock::movies());
        }
        self.fetch_list("movie/now_playing", &[("language", "en-US"), ("page", "1")]).await
    }

    pub async fn search(&self, title: &str) -> AppResult<Vec<Movie>> {
        if title.trim().is_empty() {
            return Ok(Vec::new());
        }
        if self.is_mock() {
            return Ok(mock::movies());
        }
        self.fetch_list("search/movie", &[("query", title)]).await
    }

    pub async fn recommendations(&self, movie_id: i32) -> AppResult<Vec<Movie>> {
        if self.is_mock() {
            return Ok(mock::movies().into_iter().filter(|m| m.id != movie_id).collect());
        }
        self.fetch_list(&format!("movie/{movie_id}/recommendations"), &[]).await
    }

    /// `None` when TMDB does not answer with a success status (unknown id, bad key).
    pub async fn details(&self, movie_id: i32) -> AppResult<Option<Movie>> {
        if self.is_mock() {
            return Ok((movie_id > 0).then(|| mock::movie(movie_id)));
        }
        let Some(resp) = self.get(&format!("movie/{movie_id}"), &[("language", "en-US")]).await?
        else {
            return Ok(None);
        };
        Ok(Some(resp.json().await?))
    }

    async fn fetch_list(&self, path: &str, query: &[(&str, &str)]) -> AppResult<Vec<Movie>> {
        let Some(resp) = self.get(path, query).await? else {
            return Ok(Vec::new());
        };
        let page: MoviePage = resp.json().await?;
        tracing::debug!(path, results = page.results.len(), "fetched TMDB list");
        Ok(page.results)
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<Option<reqwest::Response>> {
        self.limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut req = self.client.get(url).query(query);
        req = match &self.credentials {
            TmdbCredentials::ApiKey(key) => req.query(&[("api_key", key)]),
            TmdbCredentials::AccessToken(token) => req.bearer_auth(token),
            TmdbCredentials::None => req,
        };

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(path, %status, "TMDB request failed");
            return Ok(None);
        }
        Ok(Some(resp))
    }
}

#[derive(Debug, Deserialize)]
struct MoviePage {
    #[serde(default)]
    results: Vec<Movie>,
}

mod mock {
    use crate::models::Movie;

    pub fn movie(id: i32) -> Movie {
        Movie {
            id,
            title: "Sample Movie".to_string(),
            release_date: Some("2024-01-01".to_string()),
            vote_average: Some(8.5),
            overview: Some("This is a sample movie description.".to_string()),
            poster_path: None,
        }
    }

    pub fn movies() -> Vec<Movie> {
        (1..=3).map(movie).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;

    use super::*;

    async fn fake_tmdb() -> String {
        let app = Router::new()
            .route(
                "/trending/movie/week",
                get(|| async {
                    Json(json!({
                        "page": 1,
                        "results": [
                            {"id": 550, "title": "Fight Club", "vote_average": 8.4, "poster_path": "/fc.jpg"},
                            {"id": 13, "title": "Forrest Gump", "poster_path": null}
                        ]
                    }))
                }),
            )
            .route(
                "/movie/top_rated",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    if q.get("api_key").map(String::as_str) != Some("good-key") {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    assert_eq!(q.get("language").map(String::as_str), Some("en-US"));
                    Json(json!({"results": [{"id": 278, "title": "The Shawshank Redemption"}]}))
                        .into_response()
                }),
            )
            .route(
                "/search/movie",
                get(|headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                    if headers.get("authorization").and_then(|v| v.to_str().ok())
                        != Some("Bearer token")
                    {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    let title = q.get("query").cloned().unwrap_or_default();
                    Json(json!({"results": [{"id": 603, "title": title}]})).into_response()
                }),
            )
            .route(
                "/movie/{id}",
                get(|Path(id): Path<i32>| async move {
                    if id == 550 {
                        Json(json!({"id": 550, "title": "Fight Club", "overview": "Mischief."}))
                            .into_response()
                    } else {
                        StatusCode::NOT_FOUND.into_response()
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn client(base_url: String, credentials: TmdbCredentials) -> TmdbClient {
        TmdbClient::new(reqwest::Client::new(), credentials, base_url, 100)
    }

    #[test]
    fn access_token_wins_over_api_key() {
        assert_eq!(
            TmdbCredentials::from_config("key", "token"),
            TmdbCredentials::AccessToken("token".to_string())
        );
        assert_eq!(
            TmdbCredentials::from_config(" key ", "  "),
            TmdbCredentials::ApiKey("key".to_string())
        );
        assert_eq!(TmdbCredentials::from_config("", ""), TmdbCredentials::None);
    }

    #[tokio::test]
    async fn parses_list_results() {
        let tmdb = client(fake_tmdb().await, TmdbCredentials::ApiKey("good-key".to_string()));
        let movies = tmdb.trending().await.unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "Fight Club");
        assert_eq!(movies[1].poster_path, None);
    }

    #[tokio::test]
    async fn error_status_yields_empty_list() {
        let base = fake_tmdb().await;
        let ok = client(base.clone(), TmdbCredentials::ApiKey("good-key".to_string()));
        assert_eq!(ok.top_rated().await.unwrap().len(), 1);

        let bad = client(base, TmdbCredentials::ApiKey("bad-key".to_string()));
        assert!(bad.top_rated().await.unwrap().is_empty());
        // The fake server rejects this path.
        assert!(bad.now_playing().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bearer_token_is_sent_and_query_is_encoded() {
        let tmdb = client(fake_tmdb().await, TmdbCredentials::AccessToken("token".to_string()));
        let results = tmdb.search("The Matrix & more").await.unwrap();
        assert_eq!(results[0].title, "The Matrix & more");
        assert!(tmdb.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn details_returns_none_for_unknown_movie() {
        let tmdb = client(fake_tmdb().await, TmdbCredentials::ApiKey("good-key".to_string()));
        let movie = tmdb.details(550).await.unwrap().unwrap();
        assert_eq!(movie.overview.as_deref(), Some("Mischief."));
        assert!(tmdb.details(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mock_mode_serves_sample_movies() {
        let tmdb = client("http://127.0.0.1:9".to_string(), TmdbCredentials::None);
        let movie = tmdb.details(42).await.unwrap().unwrap();
        assert_eq!(movie.id, 42);
        assert_eq!(movie.title, "Sample Movie");
        assert_eq!(movie.rating(), "8.5");
        assert!(tmdb.details(0).await.unwrap().is_none());
        assert_eq!(tmdb.trending().await.unwrap().len(), 3);
        assert!(tmdb.recommendations(1).await.unwrap().iter().all(|m| m.id != 1));
    }
}
