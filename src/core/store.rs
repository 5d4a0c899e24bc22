//! Store handle for the roster database.
//!
//! A `Store` is passed explicitly to every operation; nothing holds a global
//! connection. Connections are opened per operation by the broker and closed
//! when the operation returns.

use crate::core::broker::DbBroker;
use crate::core::config::{self, RosterConfig};
use crate::core::error::RosterError;
use std::env;
use std::path::{Path, PathBuf};

/// Environment override for the store root.
pub const ROOT_ENV_VAR: &str = "SKYROSTER_ROOT";
/// Default store directory under the working directory.
pub const DEFAULT_ROOT_DIR: &str = ".skyroster";

#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute or working-directory-relative path to the store root
    pub root: PathBuf,
    pub config: RosterConfig,
}

impl Store {
    /// Open a store rooted at `root`, reading `skyroster.toml` if present.
    pub fn open(root: &Path) -> Result<Self, RosterError> {
        let config = config::load_config(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn with_config(root: &Path, config: RosterConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(&self.config.db_name)
    }

    pub fn broker(&self) -> DbBroker {
        DbBroker::new(self)
    }
}

/// Resolve the store root: explicit flag, then `SKYROSTER_ROOT`, then `./.skyroster`.
pub fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf, RosterError> {
    if let Some(root) = explicit {
        return Ok(root);
    }
    if let Ok(root) = env::var(ROOT_ENV_VAR) {
        if !root.trim().is_empty() {
            return Ok(PathBuf::from(root));
        }
    }
    Ok(env::current_dir()?.join(DEFAULT_ROOT_DIR))
}
