mod config;
pub mod database;
pub mod http_store;

pub use config::{
    Config, EmailConfig, LogConfig, PersistenceConfig, RemoteConfig, RemoteMode, TimerConfig,
};
pub use database::Database;
pub use http_store::HttpDocumentStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the Focus Hub data directory, creating it if needed.
///
/// `FOCUSHUB_DATA_DIR` wins when set. Otherwise `~/.config/focushub[-dev]/`,
/// with the `-dev` suffix selected by `FOCUSHUB_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSHUB_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSHUB_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focushub-dev")
            } else {
                base_dir.join("focushub")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
