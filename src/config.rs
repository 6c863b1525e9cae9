//! # Client Configuration
//!
//! Layered configuration for the job client and CLI.
//!
//! Precedence (highest to lowest):
//! 1. Environment variables (`PDF4ME_API_KEY`, `PDF4ME_BASE_URL`,
//!    `PDF4ME_POLLING__MAX_RETRIES`, ...)
//! 2. Config file (`--config`, `PDF4ME_CONFIG`, or `./pdf4me.toml`)
//! 3. Default values

use config::{Config, Environment, File};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::{ClientError, ClientResult};
use crate::policy::{ExponentialBackoff, FixedDelay, PollPolicy};

pub const DEFAULT_BASE_URL: &str = "https://api.pdf4me.com/";
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_CONFIG_FILE: &str = "pdf4me.toml";

/// Client configuration
///
/// # Examples
///
/// ```rust
/// use pdf4me_client::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.base_url, "https://api.pdf4me.com/");
/// assert_eq!(config.polling.max_retries, 10);
/// assert_eq!(config.polling.retry_delay_ms, 10_000);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL endpoints are resolved against
    pub base_url: String,
    /// PDF4me API key
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Poll loop settings
    pub polling: PollingConfig,
}

/// Poll loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Maximum status GETs per job
    pub max_retries: u32,
    /// Delay before each GET (base delay for exponential backoff)
    pub retry_delay_ms: u64,
    /// Delay schedule
    #[serde(default)]
    pub backoff: BackoffStrategy,
    /// Growth factor for exponential backoff
    #[serde(default = "default_multiplier")]
    pub backoff_multiplier: f64,
    /// Delay cap for exponential backoff
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    #[default]
    Fixed,
    Exponential,
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    60_000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_retries: crate::policy::DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: crate::policy::DEFAULT_RETRY_DELAY.as_millis() as u64,
            backoff: BackoffStrategy::Fixed,
            backoff_multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl PollingConfig {
    /// Build the poll policy this configuration describes
    pub fn policy(&self) -> Arc<dyn PollPolicy> {
        let delay = Duration::from_millis(self.retry_delay_ms);
        match self.backoff {
            BackoffStrategy::Fixed => Arc::new(FixedDelay::new(self.max_retries, delay)),
            BackoffStrategy::Exponential => Arc::new(ExponentialBackoff::new(
                self.max_retries,
                delay,
                self.backoff_multiplier,
                Duration::from_millis(self.max_delay_ms),
            )),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            polling: PollingConfig::default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("polling", &self.polling)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from defaults, the first config file found, and
    /// the environment
    pub fn load() -> ClientResult<Self> {
        Self::load_with(Self::find_config_file().as_deref(), false)
    }

    /// Load configuration using a specific file, which must exist
    pub fn load_from_file(path: &Path) -> ClientResult<Self> {
        Self::load_with(Some(path), true)
    }

    fn load_with(path: Option<&Path>, required: bool) -> ClientResult<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("base_url", defaults.base_url.clone())
            .and_then(|b| b.set_default("timeout_ms", defaults.timeout_ms))
            .and_then(|b| b.set_default("polling.max_retries", defaults.polling.max_retries))
            .and_then(|b| b.set_default("polling.retry_delay_ms", defaults.polling.retry_delay_ms))
            .and_then(|b| b.set_default("polling.backoff", "fixed"))
            .and_then(|b| b.set_default("polling.backoff_multiplier", defaults.polling.backoff_multiplier))
            .and_then(|b| b.set_default("polling.max_delay_ms", defaults.polling.max_delay_ms))
            .map_err(|e| ClientError::config_error(format!("Invalid default: {e}")))?;

        if let Some(path) = path {
            debug!("Loading config from: {}", path.display());
            builder = builder.add_source(File::from(path).required(required));
        }

        builder = builder.add_source(
            Environment::with_prefix("PDF4ME")
                .prefix_separator("_")
                .separator("__"),
        );

        let config: Self = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ClientError::config_error(format!("Failed to load configuration: {e}")))?;

        debug!("Loaded client configuration: {:?}", config);
        Ok(config)
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PDF4ME_CONFIG") {
            return Some(PathBuf::from(path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        local.is_file().then(|| local.to_path_buf())
    }

    /// Check values a client cannot run without
    pub fn validate(&self) -> ClientResult<()> {
        self.credentials()?;
        self.parsed_base_url()?;
        if self.polling.max_retries == 0 {
            return Err(ClientError::config_error(
                "polling.max_retries must be at least 1",
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::config_error("timeout_ms must be positive"));
        }
        if self.polling.backoff == BackoffStrategy::Exponential
            && !(self.polling.backoff_multiplier.is_finite() && self.polling.backoff_multiplier >= 1.0)
        {
            return Err(ClientError::config_error(
                "polling.backoff_multiplier must be a finite number >= 1.0",
            ));
        }
        Ok(())
    }

    pub fn credentials(&self) -> ClientResult<Credentials> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            ClientError::config_error("No API key configured (set PDF4ME_API_KEY)")
        })?;
        Credentials::new(key)
    }

    pub fn parsed_base_url(&self) -> ClientResult<Url> {
        Url::parse(&self.base_url).map_err(|e| ClientError::invalid_url(&self.base_url, e))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
