//! Global calgrid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CalGridError, CalGridResult};

static DEFAULT_SERVER_URL: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Environment variable that overrides `server_url`.
pub const SERVER_ENV: &str = "CALGRID_SERVER";

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Configuration at ~/.config/calgrid/config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the remote event service
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Per-request timeout when talking to the event service
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn config_path() -> CalGridResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalGridError::Config("Could not determine config directory".into()))?
            .join("calgrid");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it does not exist,
    /// then apply the `CALGRID_SERVER` override.
    pub fn load() -> CalGridResult<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(server) = std::env::var(SERVER_ENV)
            && !server.trim().is_empty()
        {
            config.server_url = server;
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> CalGridResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CalGridError::Config(format!("Could not read {}: {e}", path.display()))
        })?;

        toml::from_str(&contents)
            .map_err(|e| CalGridError::Config(format!("Could not parse {}: {e}", path.display())))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalGridResult<()> {
        let contents = format!(
            "\
# calgrid configuration

# Where the event service lives (overridden by ${SERVER_ENV}):
# server_url = \"{DEFAULT_SERVER_URL}\"

# Seconds to wait for each request:
# request_timeout_secs = {DEFAULT_REQUEST_TIMEOUT_SECS}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalGridError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalGridError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
