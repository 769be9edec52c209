//! # Run Configuration
//!
//! Process-level settings resolved once at start-up and passed down
//! explicitly. `Config::from_env` is the only place that reads the
//! environment.
//!
//! ## Environment
//!
//! - `BASE_OUTPUT_DIR`: root of the output tree, defaults to `./output`

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the output root
pub const BASE_OUTPUT_DIR_ENV: &str = "BASE_OUTPUT_DIR";

/// Default output root, relative to the working directory
pub const DEFAULT_BASE_OUTPUT_DIR: &str = "./output";

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for a run
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory under which dated output is written
    pub base_output_dir: PathBuf,

    /// User agent to use for requests
    pub user_agent: String,

    /// Timeout in seconds applied to every HTTP request
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_output_dir: PathBuf::from(DEFAULT_BASE_OUTPUT_DIR),
            user_agent: format!("web2md/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Create a new builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup(BASE_OUTPUT_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            config.base_output_dir = PathBuf::from(dir);
        }
        config
    }

    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the output root
    pub fn base_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_output_dir = dir.into();
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}
