use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Run-wide settings, captured once at startup and shared by every component
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory whose immediate subdirectories are scanned for databases
    pub root_dir: PathBuf,

    /// Directory receiving one subdirectory of backups per application
    pub destination_dir: PathBuf,

    /// Chat webhook receiving failure and summary messages
    pub webhook_url: Option<String>,

    /// Compressed backups kept per application directory and backup kind
    pub retention_count: usize,

    /// Suppress console output (file logging and webhooks are unaffected)
    pub quiet: bool,

    /// Name of the per-application file holding `BACKUP_DATABASE_URLS`
    pub config_file_name: String,

    pub compression: CompressionMethod,

    pub tools: ToolPaths,

    /// Logging configuration
    pub log_directory: Option<PathBuf>,
    pub log_level: String,
    pub log_max_files: u32,
}

impl Settings {
    /// Settings with defaults for everything except the two required directories
    pub fn new(root_dir: impl Into<PathBuf>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            destination_dir: destination_dir.into(),
            webhook_url: None,
            retention_count: default_retention_count(),
            quiet: false,
            config_file_name: default_config_file_name(),
            compression: CompressionMethod::default(),
            tools: ToolPaths::default(),
            log_directory: None,
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
        }
    }
}

/// How dump files are turned into `.bz2` archives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Run the external `bzip2` program
    #[default]
    External,
    /// Compress in-process with the bzip2 library
    Builtin,
}

impl FromStr for CompressionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "external" => Ok(Self::External),
            "builtin" => Ok(Self::Builtin),
            other => Err(format!(
                "unknown compression method '{}' (expected 'external' or 'builtin')",
                other
            )),
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => write!(f, "external"),
            Self::Builtin => write!(f, "builtin"),
        }
    }
}

/// Programs invoked for each database kind and for compression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub pg_dump: String,
    pub mysqldump: String,
    pub sqlite3: String,
    pub redis_cli: String,
    pub bzip2: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            pg_dump: "pg_dump".to_string(),
            mysqldump: "mysqldump".to_string(),
            sqlite3: "sqlite3".to_string(),
            redis_cli: "redis-cli".to_string(),
            bzip2: "bzip2".to_string(),
        }
    }
}

// Default value functions

pub(crate) fn default_retention_count() -> usize { 5 }
pub(crate) fn default_config_file_name() -> String { ".env".to_string() }
pub(crate) fn default_log_level() -> String { "info".to_string() }
pub(crate) fn default_log_max_files() -> u32 { 10 }
