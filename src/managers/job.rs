//! A single database backup: dump, then compress

use crate::config::ToolPaths;
use crate::database::{build_dump_command, ConnectionDescriptor};
use crate::managers::notification::NotificationManager;
use crate::utils::compress::Compressor;
use crate::utils::executor::CommandExecutor;
use anyhow::Context;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Format of the timestamp embedded in backup file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// One database's backup within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupJob {
    /// Application directory the URL was found in
    pub source_dir: PathBuf,
    pub app_name: String,
    pub descriptor: ConnectionDescriptor,
    /// Uncompressed dump file to produce
    pub target: PathBuf,
    pub timestamp: String,
}

impl BackupJob {
    pub fn new(
        source_dir: &Path,
        app_name: &str,
        descriptor: ConnectionDescriptor,
        destination_root: &Path,
        timestamp: &str,
    ) -> Self {
        let target = destination_root
            .join(app_name)
            .join(backup_file_name(&descriptor, timestamp));

        Self {
            source_dir: source_dir.to_path_buf(),
            app_name: app_name.to_string(),
            descriptor,
            target,
            timestamp: timestamp.to_string(),
        }
    }

    /// `<app>/<database>` label for logs and notifications
    pub fn label(&self) -> String {
        format!("{}/{}", self.app_name, self.descriptor.database_name())
    }
}

/// `backup-<database>-<timestamp>.<sql|rdb>`
pub fn backup_file_name(descriptor: &ConnectionDescriptor, timestamp: &str) -> String {
    format!(
        "backup-{}-{}.{}",
        descriptor.database_name(),
        timestamp,
        descriptor.kind().extension()
    )
}

/// Give every job its own target file
///
/// Jobs resolving to the same name (two `app.db` files, two Redis servers on
/// index 0) get a `-2`, `-3`, .. suffix before the extension, in job order.
pub fn assign_unique_targets(jobs: &mut [BackupJob]) {
    let mut taken: HashSet<PathBuf> = HashSet::new();

    for job in jobs.iter_mut() {
        if taken.insert(job.target.clone()) {
            continue;
        }

        let base = format!(
            "backup-{}-{}",
            job.descriptor.database_name(),
            job.timestamp
        );
        let extension = job.descriptor.kind().extension();
        let mut n = 2;
        let unique = loop {
            let candidate = job.target.with_file_name(format!("{}-{}.{}", base, n, extension));
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };

        debug!("{} shares its file name, using {:?}", job.label(), unique);
        taken.insert(unique.clone());
        job.target = unique;
    }
}

/// Runs jobs; cheap to clone into each spawned task
#[derive(Debug, Clone)]
pub struct JobRunner {
    tools: ToolPaths,
    compressor: Compressor,
    notifier: NotificationManager,
}

impl JobRunner {
    pub fn new(tools: ToolPaths, compressor: Compressor, notifier: NotificationManager) -> Self {
        Self {
            tools,
            compressor,
            notifier,
        }
    }

    /// Dump and compress one database, returning whether both steps succeeded
    ///
    /// Failures are logged and sent to the webhook here, so the caller only
    /// needs the outcome for the run summary.
    pub async fn run<E: CommandExecutor>(&self, executor: &E, job: &BackupJob) -> bool {
        let label = job.label();
        info!("Backing up {} ({})", label, job.descriptor.describe());

        if let Some(parent) = job.target.parent() {
            if let Err(e) = fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))
            {
                self.report_failure(&format!("Backup failed for {}: {:#}", label, e))
                    .await;
                return false;
            }
        }

        let command = build_dump_command(&job.descriptor, &job.target, &self.tools);
        let output = match executor.run(&command).await {
            Ok(output) => output,
            Err(e) => {
                remove_partial_dump(&job.target);
                self.report_failure(&format!("Backup failed for {}: {:#}", label, e))
                    .await;
                return false;
            }
        };

        if !output.success {
            let mut message = format!(
                "Backup failed for {} (exit code {}): {}",
                label,
                output
                    .exit_code
                    .map_or_else(|| "none".to_string(), |code| code.to_string()),
                command
            );
            if !output.output.is_empty() {
                message.push('\n');
                message.push_str(&output.output);
            }
            remove_partial_dump(&job.target);
            self.report_failure(&message).await;
            return false;
        }

        info!("Dumped {} to {:?}", label, job.target);

        match self.compressor.compress(executor, &job.target).await {
            Ok(archive) => {
                info!("Backup of {} stored at {:?}", label, archive);
                true
            }
            Err(e) => {
                self.report_failure(&format!(
                    "Compression failed for {} ({:?} kept uncompressed): {:#}",
                    label, job.target, e
                ))
                .await;
                false
            }
        }
    }

    async fn report_failure(&self, message: &str) {
        error!("{}", message);
        self.notifier.notify(message).await;
    }
}

fn remove_partial_dump(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove partial dump {:?}: {}", path, e);
        }
    }
}
