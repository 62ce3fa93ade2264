//! Count-based retention of compressed backups
//!
//! Each backup kind in a destination directory is pruned independently so a
//! burst of SQL dumps never evicts the last Redis snapshot.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// File name prefix shared by every backup
pub const BACKUP_PREFIX: &str = "backup-";

/// Compressed suffixes pruned independently of each other
pub const RETAINED_SUFFIXES: [&str; 2] = [".sql.bz2", ".rdb.bz2"];

/// Outcome of one retention pass over a directory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetentionReport {
    pub kept: usize,
    pub removed: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
pub struct RetentionManager {
    keep: usize,
}

impl RetentionManager {
    pub fn new(keep: usize) -> Self {
        Self { keep }
    }

    pub fn keep(&self) -> usize {
        self.keep
    }

    /// Prune `dir`, keeping the newest `keep` backups of each kind
    ///
    /// A missing directory is not an error. Files that cannot be deleted are
    /// logged and left in place.
    pub fn apply(&self, dir: &Path) -> Result<RetentionReport> {
        let mut report = RetentionReport::default();
        if !dir.is_dir() {
            debug!("No backups to rotate in {:?}", dir);
            return Ok(report);
        }

        for suffix in RETAINED_SUFFIXES {
            let backups = list_backups(dir, suffix)?;
            let excess = backups.len().saturating_sub(self.keep);
            report.kept += backups.len() - excess;

            for path in backups.into_iter().take(excess) {
                match fs::remove_file(&path) {
                    Ok(()) => {
                        info!("Removed old backup {:?}", path);
                        report.removed.push(path);
                    }
                    Err(e) => warn!("Failed to remove old backup {:?}: {}", path, e),
                }
            }
        }

        Ok(report)
    }
}

/// Backups in `dir` ending in `suffix`, oldest first
pub fn list_backups(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut backups: Vec<(SystemTime, PathBuf)> = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let entry = entry.with_context(|| format!("Failed to read entry in {:?}", dir))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(BACKUP_PREFIX) || !name.ends_with(suffix) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) => {
                warn!("Failed to stat {:?}: {}", entry.path(), e);
                continue;
            }
        };
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        backups.push((modified, entry.path()));
    }

    backups.sort();
    Ok(backups.into_iter().map(|(_, path)| path).collect())
}
