//! Fluent API for building test settings
//!
//! Defaults to built-in compression so tests do not need a `bzip2` binary.

use db_backup_manager::config::{CompressionMethod, Settings};
use std::path::{Path, PathBuf};

/// Builder for creating test settings
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new(root: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        let mut settings = Settings::new(root, destination);
        settings.compression = CompressionMethod::Builtin;
        Self { settings }
    }

    pub fn webhook(mut self, url: impl Into<String>) -> Self {
        self.settings.webhook_url = Some(url.into());
        self
    }

    pub fn retention(mut self, count: usize) -> Self {
        self.settings.retention_count = count;
        self
    }

    pub fn compression(mut self, method: CompressionMethod) -> Self {
        self.settings.compression = method;
        self
    }

    pub fn config_file_name(mut self, name: &str) -> Self {
        self.settings.config_file_name = name.to_string();
        self
    }

    pub fn pg_dump(mut self, path: impl AsRef<Path>) -> Self {
        self.settings.tools.pg_dump = path.as_ref().display().to_string();
        self
    }

    pub fn mysqldump(mut self, path: impl AsRef<Path>) -> Self {
        self.settings.tools.mysqldump = path.as_ref().display().to_string();
        self
    }

    pub fn sqlite3(mut self, path: impl AsRef<Path>) -> Self {
        self.settings.tools.sqlite3 = path.as_ref().display().to_string();
        self
    }

    pub fn redis_cli(mut self, path: impl AsRef<Path>) -> Self {
        self.settings.tools.redis_cli = path.as_ref().display().to_string();
        self
    }

    pub fn bzip2(mut self, path: impl AsRef<Path>) -> Self {
        self.settings.tools.bzip2 = path.as_ref().display().to_string();
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}
