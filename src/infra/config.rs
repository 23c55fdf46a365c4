// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::paths;
use crate::profile::ProfileName;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host identifier handed to the environment resolver. Empty resolves to MOCK.
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub profiles: ProfilesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            log_level: default_log_level(),
            profiles: ProfilesConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".into()
}

/// Optional per-profile tuning, applied on top of the compiled-in table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilesConfig {
    pub production: Option<ProfileTuning>,
    pub development: Option<ProfileTuning>,
    pub mock: Option<ProfileTuning>,
}

impl ProfilesConfig {
    pub fn tuning_for(&self, name: ProfileName) -> Option<&ProfileTuning> {
        match name {
            ProfileName::Production => self.production.as_ref(),
            ProfileName::Development => self.development.as_ref(),
            ProfileName::Mock => self.mock.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileTuning {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
