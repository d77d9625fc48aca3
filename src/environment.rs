// src/environment.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::poller::PollerConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_LOG_FILE: &str = "/tmp/cv-uploader.log";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub api_base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
    pub log_file: PathBuf,
    pub poller: PollerConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            poller: PollerConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

impl EnvironmentConfig {
    /// Load configuration for the current environment. A missing file falls
    /// back to built-in defaults; environment variables win over the file.
    pub fn load(path: &Path) -> Result<Self> {
        let environment = Self::get_environment();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_yaml(&content, &environment)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            info!("{} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(
            std::env::var("CV_API_URL").ok(),
            std::env::var("CV_API_TOKEN").ok(),
        );

        info!(
            "Loaded configuration for environment {}: {}",
            environment, config.api_base_url
        );
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("CV_UPLOADER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(content)?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    /// Blank values are ignored
    pub fn apply_overrides(&mut self, api_base_url: Option<String>, token: Option<String>) {
        if let Some(url) = api_base_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
    }
}
