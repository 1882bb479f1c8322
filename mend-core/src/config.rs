//! Configuration types.
//!
//! Loaded from a TOML file (conventionally `mend.toml` under
//! [`mend_paths::config_dir`]); every field has a default so a missing or
//! partial file still yields a working configuration. API keys come from the
//! environment, never from the file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::ChainConfig;

/// Default model id for the cheap tier.
pub const DEFAULT_CHEAP_MODEL: &str = "deepseek-ai/deepseek-v3";

/// Default model id for the smart tier.
pub const DEFAULT_SMART_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// Default base URL of the remote context service.
pub const DEFAULT_MEMORY_BASE_URL: &str = "https://api.ultracontext.ai";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MendConfig {
    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub chain: ChainConfig,
}

/// Model ids for the two paid tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Model behind the cheap tier.
    pub cheap: String,
    /// Model behind the smart tier.
    pub smart: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            cheap: DEFAULT_CHEAP_MODEL.to_string(),
            smart: DEFAULT_SMART_MODEL.to_string(),
        }
    }
}

/// Remote context service settings.
///
/// Disabled by default: without the remote service the resolver runs with
/// process-local storage, which is a fully supported mode, not best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Whether to use the remote context service at all.
    pub enabled: bool,
    /// Base URL of the context service.
    pub base_url: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: DEFAULT_MEMORY_BASE_URL.to_string(),
        }
    }
}

impl MendConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
