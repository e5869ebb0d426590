//! Runtime configuration. The only knob is where the SQLite file lives; the
//! log file always sits next to it so a portable data directory carries both.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "CONTACT_APP_DB";
/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".contact-app";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "contacts.sqlite";
/// Log file written beside the database.
const LOG_FILE_NAME: &str = "contact-app.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve paths from `CONTACT_APP_DB`, falling back to the home folder.
    pub fn from_env() -> Result<Self> {
        let db_path = match env::var_os(DB_PATH_ENV) {
            Some(raw) if !raw.is_empty() => PathBuf::from(raw),
            _ => default_db_path()?,
        };
        Ok(Self::for_db_path(db_path))
    }

    /// Derive the full configuration from a database path.
    pub fn for_db_path(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let log_path = db_path
            .parent()
            .map(|dir| dir.join(LOG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
        Self { db_path, log_path }
    }
}

fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
