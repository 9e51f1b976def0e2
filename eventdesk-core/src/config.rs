//! Global eventdesk configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EventDeskError, EventDeskResult};

pub const DEFAULT_EVENTS_PATH: &str = "events.json";
pub const DEFAULT_ASSET_DIR: &str = "assets/events";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

fn default_events_path() -> String {
    DEFAULT_EVENTS_PATH.to_string()
}

fn default_asset_dir() -> String {
    DEFAULT_ASSET_DIR.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Global configuration at ~/.config/eventdesk/config.toml
///
/// The access token is deliberately not part of this file; it is passed
/// per invocation through a flag or the environment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EventDeskConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    #[serde(default = "default_events_path")]
    pub events_path: String,

    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Public site the events file is published on. When unset, the file is
    /// read through the contents API instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
}

impl Default for EventDeskConfig {
    fn default() -> Self {
        EventDeskConfig {
            owner: None,
            repo: None,
            events_path: default_events_path(),
            asset_dir: default_asset_dir(),
            api_url: default_api_url(),
            site_url: None,
        }
    }
}

impl EventDeskConfig {
    pub fn config_path() -> EventDeskResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventDeskError::Config("Could not determine config directory".into()))?
            .join("eventdesk");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/eventdesk/config.toml, writing a commented default file
    /// on first run.
    pub fn load() -> EventDeskResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> EventDeskResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            EventDeskError::Config(format!("Could not read {}: {e}", path.display()))
        })?;

        toml::from_str(&contents)
            .map_err(|e| EventDeskError::Config(format!("Invalid {}: {e}", path.display())))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventDeskResult<()> {
        let contents = format!(
            "\
# eventdesk configuration

# Repository holding the site:
# owner = \"my-school\"
# repo = \"website\"

# Where the event list and uploaded images live inside the repository:
# events_path = \"{DEFAULT_EVENTS_PATH}\"
# asset_dir = \"{DEFAULT_ASSET_DIR}\"

# GitHub API endpoint:
# api_url = \"{DEFAULT_API_URL}\"

# Public site to read the current event list from
# (defaults to reading it through the GitHub API):
# site_url = \"https://my-school.example\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventDeskError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventDeskError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
