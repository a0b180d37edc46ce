use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub tmdb_api_key: String,
    pub tmdb_access_token: String,
    pub tmdb_base_url: String,
    pub tmdb_rps: u32,
    pub database_url: String,
    pub secret_key: String,
    pub max_concurrent: usize,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT").unwrap_or_else(|| "5001".to_string()).parse().context("PORT")?;

        let tmdb_api_key = var("TMDB_API_KEY").unwrap_or_default();
        let tmdb_access_token = var("TMDB_ACCESS_TOKEN").unwrap_or_default();
        let tmdb_base_url =
            var("TMDB_BASE_URL").unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        let tmdb_rps: u32 = var("TMDB_RPS").and_then(|s| s.parse().ok()).unwrap_or(4);

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://moviedeck.db?mode=rwc".to_string());

        let secret_key = var("SECRET_KEY").unwrap_or_default();

        let max_concurrent: usize =
            var("MAX_CONCURRENT_REQUESTS").and_then(|s| s.parse().ok()).unwrap_or(5);

        let bcrypt_cost: u32 = var("BCRYPT_COST")
            .and_then(|s| s.parse().ok())
            .filter(|c| (4..=31).contains(c))
            .unwrap_or(bcrypt::DEFAULT_COST);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            tmdb_api_key,
            tmdb_access_token,
            tmdb_base_url,
            tmdb_rps,
            database_url,
            secret_key,
            max_concurrent,
            bcrypt_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr.to_string(), "0.0.0.0:5001");
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.database_url, "sqlite://moviedeck.db?mode=rwc");
        assert!(config.tmdb_api_key.is_empty());
        assert_eq!(config.tmdb_rps, 4);
        assert_eq!(config.max_concurrent, 5);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn bad_numbers_fall_back_but_bad_port_fails() {
        let config = load(&[("TMDB_RPS", "fast"), ("BCRYPT_COST", "99")]).unwrap();
        assert_eq!(config.tmdb_rps, 4);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);

        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[("HOST", "not a host")]).is_err());
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("TMDB_API_KEY", "abc"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("BCRYPT_COST", "4"),
        ])
        .unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.tmdb_api_key, "abc");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bcrypt_cost, 4);
    }
}
