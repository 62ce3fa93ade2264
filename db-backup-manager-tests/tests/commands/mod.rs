//! Backup run tests for db-backup-manager
//!
//! These drive complete runs through the real process executor against fake
//! dump tools, a scratch directory tree and a local webhook recorder.

#[cfg(unix)]
mod compression;
#[cfg(unix)]
mod notifications;
#[cfg(unix)]
mod safety;

/// Whether `name` is `backup-<db>-<14 digit timestamp>.<suffix>`
pub fn is_backup_name(name: &str, db: &str, suffix: &str) -> bool {
    let Some(rest) = name.strip_prefix(&format!("backup-{}-", db)) else {
        return false;
    };
    let Some(timestamp) = rest.strip_suffix(&format!(".{}", suffix)) else {
        return false;
    };
    timestamp.len() == 14 && timestamp.bytes().all(|b| b.is_ascii_digit())
}

#[test]
fn test_is_backup_name() {
    assert!(is_backup_name("backup-app-20250102030405.sql.bz2", "app", "sql.bz2"));
    assert!(!is_backup_name("backup-app-2025.sql.bz2", "app", "sql.bz2"));
    assert!(!is_backup_name("backup-app-20250102030405.sql", "app", "sql.bz2"));
}
