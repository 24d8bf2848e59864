//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local use.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default API location when `TM_API_BASE_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Requests are abandoned after this long so the CLI never hangs.
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Transport Match API, without trailing slash
    pub api_base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Where the bearer token is persisted between runs
    pub token_path: PathBuf,
    pub log_format: LogFormat,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_path: PathBuf::from(".transport-match/token"),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("TM_API_BASE_URL")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let timeout_secs = match env::var("TM_TIMEOUT_SECS") {
            Ok(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("TM_TIMEOUT_SECS", v))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let token_path = match env::var("TM_TOKEN_PATH") {
            Ok(v) => PathBuf::from(v),
            Err(_) => default_token_path()?,
        };

        let log_format = match env::var("TM_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            api_base_url: normalize_base_url(&api_base_url)?,
            timeout: Duration::from_secs(timeout_secs),
            token_path,
            log_format,
        })
    }

    /// Override the API base URL (e.g. from a command-line flag).
    pub fn with_api_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url(url)?;
        Ok(self)
    }
}

fn default_token_path() -> Result<PathBuf, ConfigError> {
    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .ok_or(ConfigError::Missing("TM_TOKEN_PATH (or HOME)"))?;
    Ok(PathBuf::from(home).join(".transport-match").join("token"))
}

/// Strip trailing slashes and require an http(s) scheme.
fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid("TM_API_BASE_URL", url.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: '{1}'")]
    Invalid(&'static str, String),
}
