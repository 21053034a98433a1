//! Roster configuration.
//!
//! Loaded from `~/.roster/config.toml`. Every key is optional and a missing
//! file means defaults. A file that exists but does not parse is an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::Role;
use crate::retry::RetryPolicy;
use crate::storage::Storage;

/// Roster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Path of the SQLite database. Defaults to `~/.roster/roster.sqlite`.
    pub database: Option<PathBuf>,

    /// Attempts per write while the database is locked by another writer.
    pub max_attempts: u32,

    /// How long one attempt waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Fallback identity when neither `--as` nor `ROSTER_ACTOR` is given.
    pub actor: Option<String>,
    pub role: Option<Role>,
    pub ngo: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            max_attempts: 3,
            busy_timeout_ms: 250,
            actor: None,
            role: None,
            ngo: None,
        }
    }
}

impl Config {
    /// Load config from `~/.roster/config.toml`.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.roster/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".roster").join("config.toml"))
    }

    /// The database to open: `database` if set, else the default location.
    pub fn database(&self) -> Option<PathBuf> {
        self.database.clone().or_else(Storage::default_path)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            ..RetryPolicy::default()
        }
    }
}
