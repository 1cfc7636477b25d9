use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

use crate::{
    error::{AppError, AppResult},
    services::http::RetryPolicy,
};

const MAX_RETRY_TOTAL: u32 = 10;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Movie list artifact (JSON array of `{movie_id, title}` rows)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Similarity matrix artifact (JSON array of rows)
    #[serde(default = "default_similarity_path")]
    pub similarity_path: PathBuf,

    /// TMDB API key
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// File holding the TMDB API key. Takes precedence over `TMDB_API_KEY`.
    #[serde(default)]
    pub tmdb_api_key_file: Option<PathBuf>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB image asset base URL
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Per-request timeout for metadata calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Total attempts per metadata call
    #[serde(default = "default_retry_total")]
    pub retry_total: u32,

    #[serde(default = "default_retry_backoff_factor")]
    pub retry_backoff_factor: f64,

    /// Number of neighbors returned per recommendation
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/movie_list.json")
}

fn default_similarity_path() -> PathBuf {
    PathBuf::from("data/similarity.json")
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_retry_total() -> u32 {
    3
}

fn default_retry_backoff_factor() -> f64 {
    1.0
}

fn default_recommendation_count() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Resolves the TMDB credential: secrets file first, then the environment.
    ///
    /// A configured secrets file that cannot be read is an error rather than a
    /// silent fall through to the environment.
    pub fn resolve_api_key(&self) -> AppResult<String> {
        if let Some(path) = &self.tmdb_api_key_file {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                AppError::Configuration(format!(
                    "Failed to read TMDB API key file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let key = contents.trim();
            if !key.is_empty() {
                tracing::debug!(path = %path.display(), "TMDB API key loaded from secrets file");
                return Ok(key.to_string());
            }
        }

        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Configuration(
                    "TMDB API key is not configured. Set TMDB_API_KEY or TMDB_API_KEY_FILE"
                        .to_string(),
                )
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the retry policy, rejecting budgets that could stall a request
    pub fn retry_policy(&self) -> AppResult<RetryPolicy> {
        if !(1..=MAX_RETRY_TOTAL).contains(&self.retry_total) {
            return Err(AppError::Configuration(format!(
                "RETRY_TOTAL must be between 1 and {}, got {}",
                MAX_RETRY_TOTAL, self.retry_total
            )));
        }
        if !self.retry_backoff_factor.is_finite() || self.retry_backoff_factor < 0.0 {
            return Err(AppError::Configuration(format!(
                "RETRY_BACKOFF_FACTOR must be a finite, non-negative number, got {}",
                self.retry_backoff_factor
            )));
        }

        Ok(RetryPolicy {
            max_attempts: self.retry_total,
            backoff_factor: self.retry_backoff_factor,
            ..RetryPolicy::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_from(vars: Vec<(&str, &str)>) -> Config {
        envy::from_iter(
            vars.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(vec![]);
        assert_eq!(config.catalog_path, PathBuf::from("data/movie_list.json"));
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.recommendation_count, 5);
        assert_eq!(config.port, 3000);

        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_factor, 1.0);
    }

    #[test]
    fn test_retry_settings_are_validated() {
        let config = config_from(vec![("RETRY_TOTAL", "5"), ("RETRY_BACKOFF_FACTOR", "0.5")]);
        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff_factor, 0.5);

        for vars in [
            vec![("RETRY_TOTAL", "2000")],
            vec![("RETRY_TOTAL", "0")],
            vec![("RETRY_BACKOFF_FACTOR", "inf")],
            vec![("RETRY_BACKOFF_FACTOR", "NaN")],
            vec![("RETRY_BACKOFF_FACTOR", "-1")],
        ] {
            let config = config_from(vars.clone());
            assert!(
                matches!(config.retry_policy(), Err(AppError::Configuration(_))),
                "expected {:?} to be rejected",
                vars
            );
        }
    }

    #[test]
    fn test_resolve_api_key_from_env() {
        let config = config_from(vec![("TMDB_API_KEY", " abc123 ")]);
        assert_eq!(config.resolve_api_key().unwrap(), "abc123");
    }

    #[test]
    fn test_resolve_api_key_missing() {
        let config = config_from(vec![("TMDB_API_KEY", "   ")]);
        assert!(matches!(
            config.resolve_api_key(),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_secrets_file_takes_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = config_from(vec![
            ("TMDB_API_KEY", "from-env"),
            ("TMDB_API_KEY_FILE", path.as_str()),
        ]);
        assert_eq!(config.resolve_api_key().unwrap(), "from-file");
    }

    #[test]
    fn test_empty_secrets_file_falls_back_to_env() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = config_from(vec![
            ("TMDB_API_KEY", "from-env"),
            ("TMDB_API_KEY_FILE", path.as_str()),
        ]);
        assert_eq!(config.resolve_api_key().unwrap(), "from-env");
    }

    #[test]
    fn test_unreadable_secrets_file_is_error() {
        let config = config_from(vec![
            ("TMDB_API_KEY", "from-env"),
            ("TMDB_API_KEY_FILE", "/nonexistent/tmdb_key"),
        ]);
        assert!(matches!(
            config.resolve_api_key(),
            Err(AppError::Configuration(_))
        ));
    }
}
