use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::Result;

const CONFIG_DIR: &str = "rockon-manager";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub general: GeneralConfig,
    pub api: ApiConfig,
    pub poll: PollConfig,
}

impl ManagerConfig {
    /// Default location: `<config dir>/rockon-manager/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(path),
            None => {
                info!("No config directory on this system, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ManagerConfig = toml::from_str(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub title: String,
    /// Run against an in-memory demo appliance instead of the real API
    pub dryrun: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: "Rock-ons".to_string(),
            dryrun: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Appliances ship with self-signed certificates
    pub accept_invalid_certs: bool,
    /// Page size requested from paginated collections
    pub page_size: u32,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost".to_string(),
            request_timeout_secs: 30,
            accept_invalid_certs: true,
            page_size: 9000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    /// Consecutive failed fetches tolerated before polling gives up
    pub retry_limit: u32,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 15_000,
            retry_limit: 3,
        }
    }
}
