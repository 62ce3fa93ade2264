//! Discovery of application directories and their database URLs

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key whose value lists the connection URLs of an application
pub const DATABASE_URLS_KEY: &str = "BACKUP_DATABASE_URLS";

const QUOTES: &[char] = &['"', '\''];

/// An immediate subdirectory of the scan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirectory {
    pub path: PathBuf,
    /// Base name, also used for the destination subdirectory
    pub name: String,
    /// Raw connection URLs, not yet validated
    pub urls: Vec<String>,
}

/// List the immediate subdirectories of `root`, sorted by name
pub fn list_app_directories(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("Failed to read {:?}", root))? {
        let entry = entry.with_context(|| format!("Failed to read entry in {:?}", root))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        dirs.push((name, path));
    }
    dirs.sort();
    Ok(dirs)
}

/// Scan every application directory under `root` for database URLs
pub fn scan_root(root: &Path, config_file_name: &str) -> Result<Vec<AppDirectory>> {
    let dirs = list_app_directories(root)?;
    Ok(dirs
        .into_iter()
        .map(|(name, path)| {
            let urls = read_database_urls(&path.join(config_file_name));
            debug!("{}: {} database URL(s)", name, urls.len());
            AppDirectory { path, name, urls }
        })
        .collect())
}

/// Read the database URLs from one configuration file
///
/// A missing or unreadable file yields no URLs.
pub fn read_database_urls(config_file: &Path) -> Vec<String> {
    match fs::read_to_string(config_file) {
        Ok(contents) => parse_database_urls(&contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_file, e);
            Vec::new()
        }
    }
}

/// Extract the URL list from configuration file contents
pub fn parse_database_urls(contents: &str) -> Vec<String> {
    let prefix = format!("{}=", DATABASE_URLS_KEY);
    let value = contents.lines().find_map(|line| {
        let line = line.trim();
        let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
        line.strip_prefix(prefix.as_str())
    });

    match value {
        Some(value) => split_url_list(value),
        None => Vec::new(),
    }
}

fn split_url_list(value: &str) -> Vec<String> {
    let value = strip_enclosing_quotes(value.trim());
    value
        .split(',')
        .map(|item| item.trim().trim_matches(QUOTES).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_enclosing_quotes(value: &str) -> &str {
    for &quote in QUOTES {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
