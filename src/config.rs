//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.insightdash.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analytics service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Default filter settings.
    #[serde(default)]
    pub filters: FilterConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "insight_report.md".to_string()
}

/// Analytics service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Analytics service base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Session settings: who is acting, and where.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Email of the acting user.
    #[serde(default)]
    pub email: Option<String>,

    /// Default establishment id (super-user selections).
    #[serde(default)]
    pub establishment: Option<String>,
}

/// Default filter settings applied before CLI overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Default survey cycle.
    #[serde(default = "default_cycle")]
    pub cycle: u32,

    /// Default academic year; computed from today's date when unset.
    #[serde(default)]
    pub academic_year: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cycle: default_cycle(),
            academic_year: None,
        }
    }
}

fn default_cycle() -> u32 {
    1
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".insightdash.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref api_url) = args.api_url {
            self.service.base_url = api_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.service.timeout_seconds = timeout;
        }

        if let Some(ref email) = args.email {
            self.session.email = Some(email.clone());
        }
        if let Some(ref establishment) = args.establishment {
            self.session.establishment = Some(establishment.clone());
        }

        if let Some(cycle) = args.cycle {
            self.filters.cycle = cycle;
        }
        if let Some(ref academic_year) = args.academic_year {
            self.filters.academic_year = Some(academic_year.clone());
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
