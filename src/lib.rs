//! Database Backup Manager Library
//!
//! Discovers databases across per-application directories, dumps them with
//! their native tools, compresses and rotates the results, and reports
//! failures to a chat webhook.

pub mod config;
pub mod database;
pub mod managers;
pub mod utils;

// Re-export commonly used types
pub use config::{load_settings, load_settings_from_env, ConfigError, Settings};
pub use database::{ConnectionDescriptor, DatabaseKind};
pub use managers::backup::{BackupManager, RunSummary};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::notification::NotificationManager;
