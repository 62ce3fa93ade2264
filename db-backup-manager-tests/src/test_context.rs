//! Test context and harness for backup runs
//!
//! Lays out a scratch tree with an application root, a destination and a
//! directory for fake tools:
//!
//! ```text
//! <tmp>/apps/<app>/.env
//! <tmp>/backups/<app>/backup-*.bz2
//! <tmp>/bin/<tool>
//! ```

use crate::fixtures::database_urls_line;
use crate::settings_builder::SettingsBuilder;
use anyhow::Result;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Test context that manages test resources and provides common utilities
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with empty root and destination directories
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("apps")).expect("Failed to create root dir");
        Self { temp_dir }
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory scanned for applications
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("apps")
    }

    /// Directory receiving backups; created by the run itself
    pub fn destination(&self) -> PathBuf {
        self.temp_dir.path().join("backups")
    }

    /// Directory for fake tools
    pub fn bin_dir(&self) -> PathBuf {
        self.temp_dir.path().join("bin")
    }

    /// Settings pointing at this context's root and destination
    pub fn settings(&self) -> SettingsBuilder {
        SettingsBuilder::new(self.root(), self.destination())
    }

    /// Create an application directory whose `.env` lists `urls`
    pub fn add_app(&self, name: &str, urls: &[&str]) -> PathBuf {
        self.add_app_config(name, ".env", &database_urls_line(urls))
    }

    /// Create an application directory with a raw configuration file
    pub fn add_app_config(&self, name: &str, file_name: &str, contents: &str) -> PathBuf {
        let dir = self.root().join(name);
        fs::create_dir_all(&dir).expect("Failed to create application directory");
        fs::write(dir.join(file_name), contents).expect("Failed to write configuration file");
        dir
    }

    /// Backup directory of one application
    pub fn backup_dir(&self, app: &str) -> PathBuf {
        self.destination().join(app)
    }

    /// Sorted file names in an application's backup directory
    pub fn backups(&self, app: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.backup_dir(app)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Seed `count` backups for `app`, oldest first, one hour apart
    ///
    /// Names are `backup-<db>-<n>.<suffix>` so they sort in age order too.
    pub fn add_old_backups(&self, app: &str, db: &str, suffix: &str, count: usize) -> Vec<PathBuf> {
        let dir = self.backup_dir(app);
        fs::create_dir_all(&dir).expect("Failed to create backup directory");

        (0..count)
            .map(|i| {
                let path = dir.join(format!("backup-{}-{:02}.{}", db, i, suffix));
                let age = Duration::from_secs(3600 * (count - i) as u64 + 86_400);
                let file = File::create(&path).expect("Failed to create backup file");
                file.set_modified(SystemTime::now() - age)
                    .expect("Failed to set modification time");
                path
            })
            .collect()
    }

    /// Create a file in the temp dir
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Read a file from the temp directory
    pub fn read_file(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.temp_dir.path().join(name))?)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
