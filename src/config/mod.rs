// Application configuration
//
// Defaults -> TOML file -> environment -> CLI flags, later layers winning.
// The TOML file is optional; every section has a working default except the
// completion-service API key, which must come from the file, the
// TOGETHER_API_KEY environment variable, or the CLI.

use crate::interview::InterviewLimits;
use crate::llm::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "TOGETHER_API_KEY";

const DEFAULT_PORT: u16 = 4620;
const DEFAULT_BIND: &str = "127.0.0.1";

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub bind: String,
    /// Allowed CORS origins; empty means permissive
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for the interview record file; defaults to ~/.o2c-discovery
    pub records_dir: Option<PathBuf>,
}

/// Merged application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub interview: InterviewLimits,
    pub server: ServerSettings,
    pub storage: StorageSettings,
}

// ============================================================================
// Loading
// ============================================================================

impl AppConfig {
    /// Load configuration: file if present, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(p)
                    .map_err(|e| format!("Failed to read config {}: {}", p.display(), e))?;
                toml::from_str(&content)
                    .map_err(|e| format!("Failed to parse config {}: {}", p.display(), e))?
            }
            Some(p) => {
                log::warn!("config file {} not found, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.llm.api_key = Some(key);
            }
        }

        Ok(config)
    }

    /// Concrete client configuration; fails when no API key is configured
    pub fn llm_config(&self) -> Result<LlmConfig, String> {
        let api_key = self
            .llm
            .api_key
            .clone()
            .ok_or_else(|| format!("No completion-service API key set (use {} or the config file)", API_KEY_ENV))?;

        Ok(LlmConfig {
            api_key,
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone(),
            timeout_secs: self.llm.timeout_secs,
        })
    }

    /// Records directory, defaulting to the home-dir location
    pub fn records_dir(&self) -> PathBuf {
        self.storage
            .records_dir
            .clone()
            .unwrap_or_else(crate::file_storage::default_records_dir)
    }
}
