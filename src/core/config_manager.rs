// src/core/config_manager.rs
//! Configuration from environment variables over an optional config.yaml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TEMPLATE: &str = "template_1";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
    pub default_template: String,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub log_file: Option<PathBuf>,
}

/// One environment block of config.yaml; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileSection {
    pub api_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub default_template: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: FileSection,
    #[serde(default)]
    production: FileSection,
}

impl ConfigManager {
    /// Load all configurations
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        let file = Self::load_file(Path::new(CONFIG_FILE), &environment)?;
        Self::from_sources(environment, file, |key| std::env::var(key).ok())
    }

    fn get_environment() -> String {
        std::env::var("RESUME_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_file(path: &Path, environment: &str) -> Result<Option<FileSection>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config_file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        }))
    }

    /// Environment variables win over the file section, which wins over defaults.
    pub fn from_sources<F>(environment: String, file: Option<FileSection>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();

        let timeout_seconds = match env("RESUME_API_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("RESUME_API_TIMEOUT_SECS must be a number, got '{}'", raw))?,
            None => file.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let base_url = env("RESUME_API_URL")
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        validate_base_url(&base_url)?;

        Ok(Self {
            environment,
            service: ServiceConfig {
                base_url,
                timeout_seconds,
            },
            logging: LoggingConfig {
                level: env("RESUME_LOG_LEVEL")
                    .or(file.log_level)
                    .unwrap_or_else(|| "info".to_string()),
                log_file: env("RESUME_LOG_FILE").map(PathBuf::from).or(file.log_file),
            },
            default_template: env("RESUME_DEFAULT_TEMPLATE")
                .or(file.default_template)
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
        })
    }

    /// Point at another service (the `--api-url` flag).
    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        validate_base_url(url)?;
        self.service.base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }
}

fn validate_base_url(url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("Resume service URL must start with http:// or https://: {}", url);
    }
    Ok(())
}
