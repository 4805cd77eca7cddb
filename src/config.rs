use crate::catalog::DEFAULT_API_URL;
use crate::search::DEFAULT_DEBOUNCE;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const ENV_PREFIX: &str = "FILMFLUX_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Env(#[from] envy::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// Settings read from `FILMFLUX_*` environment variables (and `.env`).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key. Requests are still sent without one and fail upstream.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Where the watchlist, settings and logs live.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(envy::prefixed(ENV_PREFIX).from_env::<Config>()?)
    }

    #[cfg(test)]
    fn from_vars(vars: &[(&str, &str)]) -> Result<Self, ConfigError> {
        let vars = vars.iter().map(|(k, v)| (k.to_string(), v.to_string()));
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    /// The API key, treating a blank value as missing.
    pub fn api_key(&self) -> Option<&str> {
        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        directories::ProjectDirs::from("com", "filmflux", "filmflux")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Log a degraded start instead of refusing to run.
    pub fn warn_if_incomplete(&self) {
        if self.api_key().is_none() {
            tracing::warn!(
                "TMDB API key is missing, set {}TMDB_API_KEY; catalog requests will fail",
                ENV_PREFIX
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&[]).unwrap();
        assert_eq!(config.api_key(), None);
        assert_eq!(config.api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_prefixed_vars() {
        let config = Config::from_vars(&[
            ("FILMFLUX_TMDB_API_KEY", "abc123"),
            ("FILMFLUX_API_URL", "http://localhost:9000/3"),
            ("FILMFLUX_DEBOUNCE_MS", "250"),
            ("FILMFLUX_DATA_DIR", "/tmp/filmflux"),
            ("TMDB_API_KEY", "ignored"),
        ])
        .unwrap();

        assert_eq!(config.api_key(), Some("abc123"));
        assert_eq!(config.api_url, "http://localhost:9000/3");
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/filmflux"));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = Config::from_vars(&[("FILMFLUX_TMDB_API_KEY", "  ")]).unwrap();
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_invalid_debounce_is_error() {
        let result = Config::from_vars(&[("FILMFLUX_DEBOUNCE_MS", "soon")]);
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }
}
