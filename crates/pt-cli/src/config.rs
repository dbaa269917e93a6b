//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pt_core::{ConfigurationError, DEFAULT_OPTIMAL_SECONDS, OptimalThreshold};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the record service, e.g. `http://localhost:8080/api`.
    pub api_url: String,
    /// Optimal processing time per product, in seconds.
    pub optimal_seconds: f64,
    /// Per-request timeout for record service calls, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            optimal_seconds: DEFAULT_OPTIMAL_SECONDS,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PT_*)
        figment = figment.merge(Env::prefixed("PT_"));

        figment.extract()
    }

    /// Validates the configured optimal time.
    pub fn threshold(&self) -> Result<OptimalThreshold, ConfigurationError> {
        OptimalThreshold::new(self.optimal_seconds)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds a record service client from this configuration.
    pub fn client(&self) -> Result<pt_api::Client, pt_api::ApiError> {
        pt_api::Client::with_timeout(&self.api_url, self.request_timeout())
    }
}

/// Returns the platform-specific config directory for pt.
///
/// On Linux: `~/.config/pt`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pt"))
}
