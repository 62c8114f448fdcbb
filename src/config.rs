//! Runtime configuration.
//!
//! Everything is read from the environment once at startup:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `COLLOQ_API_URL` | Backend base URL, `/gemini` is appended | `http://localhost:8000/gemini` |
//! | `COLLOQ_DATA_DIR` | Where threads are persisted | platform data dir + `colloq` |
//! | `RUST_LOG` | Log filter (read by the binary) | `warn` |

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::conductor::DEFAULT_API_URL;
use crate::error::ConfigError;
use crate::session::DEFAULT_NOTICE_TTL;

pub const API_URL_ENV: &str = "COLLOQ_API_URL";
pub const DATA_DIR_ENV: &str = "COLLOQ_DATA_DIR";

/// Key the thread collection is stored under
pub const STORAGE_KEY: &str = "llm-powered-chat-platform::threads";

/// Path segment of the chat endpoint
const CHAT_ENDPOINT: &str = "/gemini";

/// Configuration for the chat client.
///
/// # Example
///
/// ```ignore
/// use colloq::config::ChatConfig;
///
/// let config = ChatConfig::from_env()
///     .with_api_url("https://chat.example.com")
///     .with_notice_ttl(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Full URL of the streaming chat endpoint
    pub api_url: String,
    /// Directory holding the persisted threads
    pub data_dir: PathBuf,
    /// How long notices stay visible
    pub notice_ttl: Duration,
    /// Key the thread collection is stored under
    pub storage_key: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: default_data_dir(),
            notice_ttl: DEFAULT_NOTICE_TTL,
            storage_key: STORAGE_KEY.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `COLLOQ_API_URL` and `COLLOQ_DATA_DIR`. Unset or blank
    /// variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = non_blank_var(API_URL_ENV) {
            config = config.with_api_url(&url);
        }
        if let Some(dir) = non_blank_var(DATA_DIR_ENV) {
            config = config.with_data_dir(dir);
        }
        config
    }

    /// Set the backend base URL. The chat endpoint path is appended unless
    /// it is already there.
    pub fn with_api_url(mut self, base: &str) -> Self {
        self.api_url = endpoint_url(base);
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    /// Check that the API URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidApiUrl {
            url: self.api_url.clone(),
            message,
        };
        let url = Url::parse(&self.api_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a base URL into the chat endpoint URL.
pub fn endpoint_url(base: &str) -> String {
    let trimmed = base.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_URL.to_string();
    }
    if trimmed.ends_with(CHAT_ENDPOINT) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, CHAT_ENDPOINT)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("colloq"))
        .unwrap_or_else(|| PathBuf::from("data"))
}
