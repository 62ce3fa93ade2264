//! Configuration module for db-backup-manager
//!
//! Settings come from the process environment. A `.env` file in the working
//! directory is merged in first; variables already set in the environment
//! take precedence over it.
//!
//! ## Example Usage
//!
//! ```no_run
//! use db_backup_manager::config;
//!
//! let settings = config::load_settings_from_env()?;
//! println!("Scanning {:?}", settings.root_dir);
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{
    load_settings, load_settings_from_env, validate_settings, ConfigError, Result,
    COMPRESSION_KEY, CONFIG_FILE_KEY, DESTINATION_DIR_KEY, LOG_DIR_KEY, LOG_LEVEL_KEY,
    LOG_MAX_FILES_KEY, QUIET_KEY, RETENTION_COUNT_KEY, ROOT_DIR_KEY, WEBHOOK_URL_KEY,
};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
