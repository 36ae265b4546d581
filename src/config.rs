//! Application configuration.
//!
//! One [`Config`] is constructed per invocation from environment variables
//! and an optional `.env` file, then passed by reference to whatever needs
//! it. Nothing in the crate reads configuration ambiently.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::compiler::DEFAULT_TIMEOUT;
use crate::error::Result;

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// Tool home: where `templates/`, `project_assets/` and `dirinfo/` live
    pub home: PathBuf,
    /// Path to the global catalog index
    pub dirinfo_path: PathBuf,
    /// Directory holding the template set
    pub templates_dir: PathBuf,
    /// Wall-clock budget for one compiler run
    pub compile_timeout: Duration,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// Shared image directory shipped with the tool.
    #[must_use]
    pub fn tool_images(&self) -> PathBuf {
        self.home.join("project_assets").join("images")
    }

    /// Rendered emoji directory shipped with the tool.
    #[must_use]
    pub fn emoji_images(&self) -> PathBuf {
        self.home.join("project_assets").join("emoji").join("emoji_pngs")
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = PathBuf::from(".");
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            dirinfo_path: home.join("dirinfo").join("dirinfo.yaml"),
            templates_dir: home.join("templates"),
            home,
            compile_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    #[allow(clippy::unnecessary_wraps)] // Returns Result for forward-compatible API
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        let mut config = Self::default();

        if let Ok(home) = env::var("SLIDEFLOW_HOME") {
            config.home = PathBuf::from(shellexpand::tilde(&home).to_string());
            config.dirinfo_path = config.home.join("dirinfo").join("dirinfo.yaml");
            config.templates_dir = config.home.join("templates");
        }

        // Individual overrides beat the home-derived defaults
        if let Ok(path) = env::var("SLIDEFLOW_DIRINFO") {
            config.dirinfo_path = PathBuf::from(shellexpand::tilde(&path).to_string());
        }

        if let Ok(path) = env::var("SLIDEFLOW_TEMPLATES") {
            config.templates_dir = PathBuf::from(shellexpand::tilde(&path).to_string());
        }

        if let Ok(seconds) = env::var("SLIDEFLOW_TIMEOUT") {
            if let Ok(seconds) = seconds.parse::<u64>() {
                config.compile_timeout = Duration::from_secs(seconds);
            }
        }

        Ok(config)
    }
}
