//! Feed configuration
//!
//! A feed is described by a YAML or JSON file. Everything but the endpoint
//! has a default.
//!
//! ```yaml
//! endpoint: https://board.example.com/posts/
//! page_param: page
//! threshold_px: 150
//! throttle_ms: 200
//! fallback: markup
//! initial:
//!   page: 1
//!   has_next: true
//! http:
//!   timeout_seconds: 30
//!   rate_limit:
//!     requests_per_second: 5
//!     burst_size: 5
//! ```

use crate::controller::ControllerConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::pagination::InitialState;
use crate::scroll::DEFAULT_THRESHOLD_PX;
use crate::source::{HttpFeedSource, DEFAULT_PAGE_PARAM};
use crate::types::FallbackPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Feed Config
// ============================================================================

/// Complete feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Absolute URL of the list page
    pub endpoint: String,

    /// Query parameter carrying the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Distance from the bottom, in pixels, that triggers a load
    #[serde(default = "default_threshold_px")]
    pub threshold_px: f64,

    /// Minimum spacing between evaluated scroll signals, in milliseconds
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Reaction to a failed structured request
    #[serde(default)]
    pub fallback: FallbackPolicy,

    /// Pagination state rendered with the page
    #[serde(default)]
    pub initial: InitialState,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_page_param() -> String {
    DEFAULT_PAGE_PARAM.to_string()
}

fn default_threshold_px() -> f64 {
    DEFAULT_THRESHOLD_PX
}

fn default_throttle_ms() -> u64 {
    200
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Custom user agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Outbound rate limit; `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: None,
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

#[allow(clippy::unnecessary_wraps)]
fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

impl HttpConfig {
    /// Convert to client configuration
    pub fn to_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder().timeout(Duration::from_secs(self.timeout_seconds));
        builder = match self.rate_limit {
            Some(limit) => builder.rate_limit(limit),
            None => builder.no_rate_limit(),
        };
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }
}

// ============================================================================
// Loading and validation
// ============================================================================

impl FeedConfig {
    /// Config with defaults for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            page_param: default_page_param(),
            threshold_px: default_threshold_px(),
            throttle_ms: default_throttle_ms(),
            fallback: FallbackPolicy::default(),
            initial: InitialState::default(),
            http: HttpConfig::default(),
        }
    }

    /// Load from a file. `.json` files are read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        parsed.with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the types cannot rule out
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| Error::invalid_value("endpoint", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.page_param.trim().is_empty() {
            return Err(Error::invalid_value("page_param", "cannot be empty"));
        }
        if !self.threshold_px.is_finite() || self.threshold_px < 0.0 {
            return Err(Error::invalid_value(
                "threshold_px",
                "must be a non-negative number",
            ));
        }
        if self.throttle_ms == 0 {
            return Err(Error::invalid_value("throttle_ms", "must be positive"));
        }
        if self.initial.page == 0 {
            return Err(Error::invalid_value("initial.page", "pages start at 1"));
        }
        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value("http.timeout_seconds", "must be positive"));
        }
        Ok(())
    }

    /// Controller settings
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::new()
            .threshold(self.threshold_px)
            .throttle(Duration::from_millis(self.throttle_ms))
            .fallback(self.fallback)
            .initial(self.initial.page, self.initial.has_next)
    }

    /// Build the HTTP page source
    pub fn build_source(&self) -> Result<HttpFeedSource> {
        let client = HttpClient::with_config(self.http.to_client_config())?;
        Ok(HttpFeedSource::new(client, &self.endpoint)?.with_page_param(&self.page_param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_minimal_config() {
        let config = FeedConfig::from_yaml_str("endpoint: https://board.example.com/posts/").unwrap();

        assert_eq!(config, FeedConfig::new("https://board.example.com/posts/"));
        assert_eq!(config.page_param, "page");
        assert_eq!(config.throttle_ms, 200);
        assert_eq!(config.fallback, FallbackPolicy::None);
        assert_eq!(config.initial, InitialState::default());
        assert_eq!(config.http.rate_limit, Some(RateLimiterConfig::default()));
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
endpoint: https://board.example.com/posts/?category=news
page_param: p
threshold_px: 100
throttle_ms: 250
fallback: markup
initial:
  page: 3
  has_next: false
http:
  timeout_seconds: 5
  user_agent: pager-test
  rate_limit: null
";
        let config = FeedConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.page_param, "p");
        assert_eq!(config.threshold_px, 100.0);
        assert_eq!(config.fallback, FallbackPolicy::Markup);
        assert_eq!(config.initial, InitialState { page: 3, has_next: false });
        assert_eq!(config.http.rate_limit, None);
        assert_eq!(config.http.user_agent.as_deref(), Some("pager-test"));

        let controller = config.controller_config();
        assert_eq!(controller.throttle_interval, Duration::from_millis(250));
        assert_eq!(controller.initial.page, 3);

        let client = config.http.to_client_config();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert!(client.rate_limit.is_none());
        assert_eq!(client.user_agent, "pager-test");
    }

    #[test]
    fn test_parse_json_config() {
        let config =
            FeedConfig::from_json_str(r#"{"endpoint": "http://localhost:8000/", "throttle_ms": 50}"#)
                .unwrap();
        assert_eq!(config.throttle_ms, 50);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            ("endpoint: /posts/", "endpoint"),
            ("endpoint: ftp://example.com/", "endpoint"),
            ("endpoint: https://x.test/\npage_param: ''", "page_param"),
            ("endpoint: https://x.test/\nthreshold_px: -1", "threshold_px"),
            ("endpoint: https://x.test/\nthrottle_ms: 0", "throttle_ms"),
            ("endpoint: https://x.test/\ninitial:\n  page: 0", "initial.page"),
        ];

        for (yaml, field) in cases {
            let err = FeedConfig::from_yaml_str(yaml).unwrap_err();
            assert!(
                matches!(&err, Error::InvalidConfigValue { field: f, .. } if f == field),
                "{yaml}: {err}"
            );
        }
    }

    #[test]
    fn test_missing_endpoint_is_parse_error() {
        let err = FeedConfig::from_yaml_str("throttle_ms: 100").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_from_file_yaml_and_json() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(yaml, "endpoint: https://board.example.com/posts/").unwrap();
        let config = FeedConfig::from_file(yaml.path()).unwrap();
        assert_eq!(config.endpoint, "https://board.example.com/posts/");

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"endpoint": "https://board.example.com/posts/"}}"#).unwrap();
        let config = FeedConfig::from_file(json.path()).unwrap();
        assert_eq!(config.page_param, "page");
    }

    #[test]
    fn test_from_file_errors() {
        let err = FeedConfig::from_file("/nonexistent/feed.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));

        let mut bad = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(bad, "endpoint: not a url").unwrap();
        let err = FeedConfig::from_file(bad.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_build_source() {
        let config = FeedConfig {
            page_param: "p".to_string(),
            ..FeedConfig::new("https://board.example.com/posts/")
        };
        let source = config.build_source().unwrap();
        assert_eq!(source.page_param(), "p");
        assert_eq!(
            source.page_url(2).as_str(),
            "https://board.example.com/posts/?p=2"
        );
    }
}
