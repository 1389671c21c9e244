//! Configuration management.

use serde::Deserialize;
use std::time::Duration;

use crate::error::Result;
use crate::pagination::{PagingMode, QueryParams};
use crate::telemetry::LoggingConfig;

/// Main configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote collection configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// Initial paging parameters
    #[serde(default)]
    pub state: StateConfig,

    /// Query parameter / envelope field names
    #[serde(default)]
    pub query_params: QueryParams,

    /// HTTP transport configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    /// URL of the remote collection
    pub url: Option<String>,

    /// Paging mode
    #[serde(default)]
    pub mode: PagingMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Index of the first page (0 or 1)
    #[serde(default = "default_first_page")]
    pub first_page: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            first_page: default_first_page(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

// Default value functions
fn default_page_size() -> u64 { crate::pagination::DEFAULT_PAGE_SIZE }
fn default_first_page() -> u64 { crate::pagination::DEFAULT_FIRST_PAGE }
fn default_timeout() -> Duration { Duration::from_secs(30) }
fn default_user_agent() -> String { format!("pageable/{}", env!("CARGO_PKG_VERSION")) }

impl Config {
    /// Load configuration from `PAGEABLE__*` environment variables.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PAGEABLE").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load from a specific file path, with environment overrides.
    pub fn from_file(path: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("PAGEABLE").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.state.page_size, 20);
        assert_eq!(config.state.first_page, 1);
        assert_eq!(config.source.mode, PagingMode::Infinite);
        assert_eq!(config.http.timeout, Duration::from_secs(30));
        assert_eq!(config.query_params.current_page, "page");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[source]
url = "https://api.example.test/items"
mode = "server"

[state]
page_size = 50
first_page = 0

[query_params]
page_size = "limit"

[http]
timeout = "5s"
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.source.url.as_deref(), Some("https://api.example.test/items"));
        assert_eq!(config.source.mode, PagingMode::Server);
        assert_eq!(config.state.page_size, 50);
        assert_eq!(config.state.first_page, 0);
        assert_eq!(config.query_params.page_size, "limit");
        assert_eq!(config.query_params.current_page, "page");
        assert_eq!(config.http.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_file_is_a_configuration_error() {
        let error = Config::from_file("/nonexistent/pageable-config").unwrap_err();
        assert_eq!(error.code().category(), "configuration");
        assert_ne!(error.code(), ErrorCode::InternalError);
    }
}
