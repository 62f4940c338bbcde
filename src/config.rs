//! Client configuration
//!
//! Holds the API base URL, transport timeout, pagination delay and session
//! cache policy. Can be built in code, loaded from YAML, or read from the
//! environment.

use crate::error::{Error, Result};
use crate::session::SessionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.bananatag.com/";

/// Transport timeout for a single request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay between pages of an all-pages fetch
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(1200);

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "BTAG_BASE_URL";

/// Configuration for [`BtagClient`](crate::client::BtagClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL that endpoint paths are appended to
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Pause before each follow-up page
    pub page_delay: Duration,
    /// User agent string
    pub user_agent: String,
    /// Session cache eviction policy
    pub session: SessionPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            page_delay: DEFAULT_PAGE_DELAY,
            user_agent: format!("btag-api/{}", env!("CARGO_PKG_VERSION")),
            session: SessionPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Default config with `BTAG_BASE_URL` applied when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        config
    }

    /// Parse a YAML config document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        Ok(file.into())
    }

    /// Load a YAML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Check that the base URL is usable
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }

    /// Join an endpoint path onto the base URL
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        join_url(&self.base_url, endpoint)
    }
}

/// Join an endpoint path onto a base URL with exactly one slash between them
pub fn join_url(base: &str, endpoint: &str) -> String {
    let base = base.trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    format!("{base}/{endpoint}")
}

/// Builder for [`ClientConfig`]
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the delay between pages
    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.config.page_delay = delay;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the session cache policy
    pub fn session_policy(mut self, policy: SessionPolicy) -> Self {
        self.config.session = policy;
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// On-disk representation of [`ClientConfig`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    page_delay_ms: Option<u64>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    session_ttl_secs: Option<u64>,
    #[serde(default)]
    max_sessions: Option<usize>,
}

impl From<ConfigFile> for ClientConfig {
    fn from(file: ConfigFile) -> Self {
        let mut config = ClientConfig::default();
        if let Some(url) = file.base_url {
            config.base_url = url;
        }
        if let Some(ms) = file.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = file.page_delay_ms {
            config.page_delay = Duration::from_millis(ms);
        }
        if let Some(agent) = file.user_agent {
            config.user_agent = agent;
        }
        if let Some(secs) = file.session_ttl_secs {
            // 0 disables expiry
            config.session.ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(max) = file.max_sessions {
            config.session.max_entries = max;
        }
        config
    }
}
