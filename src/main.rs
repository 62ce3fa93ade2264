use clap::Parser;
use db_backup_manager::managers::logging::{self, LoggingConfig};
use db_backup_manager::{config, BackupManager};
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "db-backup-manager")]
#[command(
    about = "Back up every database listed under the application root",
    long_about = "Scans each directory under BACKUP_ROOT_DIR for BACKUP_DATABASE_URLS, \
                  dumps every database concurrently, compresses the dumps with bzip2 \
                  and keeps the newest BACKUP_RETENTION_COUNT backups per application. \
                  Settings are read from the environment and from ./.env."
)]
#[command(version)]
struct Cli {
    /// Suppress console output (file logs and webhook messages are unaffected)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration errors are always printed, even in quiet mode
    let settings = match config::load_settings_from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let quiet = cli.quiet || settings.quiet;

    // Setup logging (must keep guard alive)
    let logging_config = LoggingConfig::from_settings(&settings, quiet);
    let _log_guard = match logging::init_logging(&logging_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            if !quiet {
                eprintln!("Failed to initialize file logging: {:#}", e);
                logging::init_console_logging();
            }
            None
        }
    };

    // Individual job failures never change the exit code
    let manager = BackupManager::new(settings);
    match manager.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Backup run aborted: {:#}", e);
            if quiet {
                eprintln!("Backup run aborted: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
