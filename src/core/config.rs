//! Configuration for the proctoring dashboard client

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::collection::{CollectionError, CollectionResult};

/// Application name for directory paths
const APP_NAME: &str = "proctoring-dashboard";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// LMS root URL the REST paths are resolved against
    pub base_url: String,

    /// Course whose exams are listed when none is given on the command line
    pub course_id: Option<String>,

    /// HTTP request timeout (seconds)
    pub timeout_secs: u64,

    /// Value of the `Authorization` header, e.g. "JWT <token>"
    pub auth_header: Option<String>,

    /// Interval between refreshes in watch mode (seconds)
    pub refresh_interval_secs: u64,

    /// Change events buffered per subscriber before it lags
    pub event_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:18000".into(),
            course_id: None,
            timeout_secs: 10,
            auth_header: None,
            refresh_interval_secs: 30,
            event_capacity: 64,
        }
    }
}

impl DashboardConfig {
    /// Default config file location
    /// - Linux: $XDG_CONFIG_HOME/proctoring-dashboard/config.toml
    /// - elsewhere: the platform config dir, or the working directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Load config from TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save config to TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parsed base URL
    pub fn base_url(&self) -> CollectionResult<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| CollectionError::Config(format!("Invalid base_url '{}': {}", self.base_url, e)))
    }

    pub fn validate(&self) -> CollectionResult<()> {
        self.base_url()?;
        if self.timeout_secs == 0 {
            return Err(CollectionError::Config("timeout_secs must be positive".into()));
        }
        if self.refresh_interval_secs == 0 {
            return Err(CollectionError::Config(
                "refresh_interval_secs must be positive".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(CollectionError::Config("event_capacity must be positive".into()));
        }
        Ok(())
    }
}
