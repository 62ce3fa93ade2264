use super::expand_tilde;
use super::types::*;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Required setting {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Failed to load .env: {0}")]
    DotEnv(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub const ROOT_DIR_KEY: &str = "BACKUP_ROOT_DIR";
pub const DESTINATION_DIR_KEY: &str = "BACKUP_DESTINATION_DIR";
pub const WEBHOOK_URL_KEY: &str = "BACKUP_WEBHOOK_URL";
pub const RETENTION_COUNT_KEY: &str = "BACKUP_RETENTION_COUNT";
pub const QUIET_KEY: &str = "BACKUP_QUIET";
pub const CONFIG_FILE_KEY: &str = "BACKUP_CONFIG_FILE";
pub const COMPRESSION_KEY: &str = "BACKUP_COMPRESSION";
pub const LOG_DIR_KEY: &str = "BACKUP_LOG_DIR";
pub const LOG_LEVEL_KEY: &str = "BACKUP_LOG_LEVEL";
pub const LOG_MAX_FILES_KEY: &str = "BACKUP_LOG_MAX_FILES";

/// Load settings from the process environment, after merging `.env` from the
/// working directory when one exists
pub fn load_settings_from_env() -> Result<Settings> {
    // Variables already present in the environment win over `.env`
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e.into()),
    }
    load_settings(|key| std::env::var(key).ok())
}

/// Build and validate settings from a key lookup
///
/// Empty values are treated as unset.
pub fn load_settings<F>(lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let root_dir = get(ROOT_DIR_KEY)
        .map(|v| expand_tilde(&PathBuf::from(v)))
        .ok_or(ConfigError::Missing(ROOT_DIR_KEY))?;
    let destination_dir = get(DESTINATION_DIR_KEY)
        .map(|v| expand_tilde(&PathBuf::from(v)))
        .ok_or(ConfigError::Missing(DESTINATION_DIR_KEY))?;

    let mut settings = Settings::new(root_dir, destination_dir);

    settings.webhook_url = get(WEBHOOK_URL_KEY);

    if let Some(value) = get(RETENTION_COUNT_KEY) {
        settings.retention_count = value.parse().map_err(|e| ConfigError::InvalidValue {
            key: RETENTION_COUNT_KEY,
            reason: format!("'{}' is not a non-negative integer ({})", value, e),
        })?;
    }

    if let Some(value) = get(QUIET_KEY) {
        settings.quiet = parse_bool(QUIET_KEY, &value)?;
    }

    if let Some(value) = get(CONFIG_FILE_KEY) {
        settings.config_file_name = value;
    }

    if let Some(value) = get(COMPRESSION_KEY) {
        settings.compression = value
            .parse()
            .map_err(|reason| ConfigError::InvalidValue {
                key: COMPRESSION_KEY,
                reason,
            })?;
    }

    let tools = &mut settings.tools;
    for (key, slot) in [
        ("BACKUP_PG_DUMP", &mut tools.pg_dump),
        ("BACKUP_MYSQLDUMP", &mut tools.mysqldump),
        ("BACKUP_SQLITE3", &mut tools.sqlite3),
        ("BACKUP_REDIS_CLI", &mut tools.redis_cli),
        ("BACKUP_BZIP2", &mut tools.bzip2),
    ] {
        if let Some(value) = get(key) {
            *slot = expand_tilde(&PathBuf::from(value)).display().to_string();
        }
    }

    settings.log_directory = get(LOG_DIR_KEY).map(|v| expand_tilde(&PathBuf::from(v)));
    if let Some(value) = get(LOG_LEVEL_KEY) {
        settings.log_level = value;
    }
    if let Some(value) = get(LOG_MAX_FILES_KEY) {
        settings.log_max_files = value.parse().map_err(|e| ConfigError::InvalidValue {
            key: LOG_MAX_FILES_KEY,
            reason: format!("'{}' is not a non-negative integer ({})", value, e),
        })?;
    }

    validate_settings(&settings)?;
    Ok(settings)
}

/// Validate the settings before any backup starts
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if !settings.root_dir.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "Root directory does not exist or is not a directory: {:?}",
            settings.root_dir
        )));
    }

    if settings.destination_dir.as_os_str().is_empty() {
        return Err(ConfigError::Missing(DESTINATION_DIR_KEY));
    }

    if settings.retention_count == 0 {
        return Err(ConfigError::InvalidValue {
            key: RETENTION_COUNT_KEY,
            reason: "must keep at least one backup".to_string(),
        });
    }

    if let Some(ref url) = settings.webhook_url {
        let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidValue {
            key: WEBHOOK_URL_KEY,
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: WEBHOOK_URL_KEY,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
    }

    if settings.config_file_name.contains('/') {
        return Err(ConfigError::InvalidValue {
            key: CONFIG_FILE_KEY,
            reason: "must be a plain file name".to_string(),
        });
    }

    Ok(())
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            reason: format!("'{}' is not a boolean", value),
        }),
    }
}
