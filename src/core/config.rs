//! Store-local configuration loaded from `skyroster.toml`.

use crate::core::error::RosterError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "skyroster.toml";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RosterConfig {
    /// SQLite file name, relative to the store root.
    pub db_name: String,
    /// Role label recorded against every audited operation.
    pub actor: String,
    pub audit_log: bool,
    pub busy_timeout_secs: u64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            db_name: "flights.db".to_string(),
            actor: "operator".to_string(),
            audit_log: true,
            busy_timeout_secs: 5,
        }
    }
}

/// Load config from `<root>/skyroster.toml`. No file means defaults.
pub fn load_config(root: &Path) -> Result<RosterConfig, RosterError> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(RosterConfig::default());
    }
    let content = fs::read_to_string(&config_path).map_err(RosterError::IoError)?;
    let config: RosterConfig = toml::from_str(&content)
        .map_err(|e| RosterError::ConfigError(format!("{}: {}", config_path.display(), e)))?;
    if config.db_name.trim().is_empty() {
        return Err(RosterError::ConfigError(
            "db_name must not be empty".to_string(),
        ));
    }
    Ok(config)
}
