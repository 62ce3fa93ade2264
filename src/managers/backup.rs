//! Backup manager - orchestrates a full backup run
//!
//! A run scans the root directory, launches one task per database, waits for
//! all of them, rotates old backups and reports the outcome.

use crate::config::{CompressionMethod, Settings};
use crate::database::{ConnectionDescriptor, DatabaseKind};
use crate::managers::job::{assign_unique_targets, BackupJob, JobRunner, TIMESTAMP_FORMAT};
use crate::managers::notification::NotificationManager;
use crate::managers::retention::RetentionManager;
use crate::utils::compress::Compressor;
use crate::utils::executor::{CommandExecutor, RealExecutor};
use crate::utils::scanner::{list_app_directories, scan_root, AppDirectory};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Job outcomes of one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    fn record(&mut self, success: bool) {
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}

pub struct BackupManager<E: CommandExecutor = RealExecutor> {
    settings: Arc<Settings>,
    executor: Arc<E>,
    notifier: NotificationManager,
    runner: JobRunner,
}

impl BackupManager<RealExecutor> {
    /// Create a backup manager that runs real processes
    pub fn new(settings: Settings) -> Self {
        Self::with_executor(settings, RealExecutor::new())
    }
}

impl<E: CommandExecutor> BackupManager<E> {
    /// Create a backup manager with a specific command executor
    pub fn with_executor(settings: Settings, executor: E) -> Self {
        let notifier = NotificationManager::new(settings.webhook_url.clone());
        let compressor = Compressor::new(settings.compression, settings.tools.bzip2.clone());
        let runner = JobRunner::new(settings.tools.clone(), compressor, notifier.clone());

        Self {
            settings: Arc::new(settings),
            executor: Arc::new(executor),
            notifier,
            runner,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run backups for every database found under the root directory
    ///
    /// Individual job failures are reported and counted, never returned.
    /// Errors are limited to the destination or root being unusable.
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();

        info!(
            "Starting backup run {} for {:?}",
            timestamp, self.settings.root_dir
        );

        fs::create_dir_all(&self.settings.destination_dir).with_context(|| {
            format!(
                "Failed to create destination directory {:?}",
                self.settings.destination_dir
            )
        })?;

        let app_dirs = scan_root(&self.settings.root_dir, &self.settings.config_file_name)?;
        let jobs = self.plan_jobs(&app_dirs, &timestamp).await;
        self.preflight(&jobs);

        let summary = self.launch(jobs).await;

        self.apply_retention();

        info!(
            "Backup run finished in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        self.report(&summary).await;

        Ok(summary)
    }

    /// Turn every URL into a job, reporting the ones that cannot be parsed
    async fn plan_jobs(&self, app_dirs: &[AppDirectory], timestamp: &str) -> Vec<BackupJob> {
        let mut jobs = Vec::new();

        for app in app_dirs {
            for url in &app.urls {
                match ConnectionDescriptor::parse(url) {
                    Ok(descriptor) => jobs.push(BackupJob::new(
                        &app.path,
                        &app.name,
                        descriptor,
                        &self.settings.destination_dir,
                        timestamp,
                    )),
                    Err(e) => {
                        let message = format!("Skipping database in {}: {}", app.name, e);
                        warn!("{}", message);
                        self.notifier.notify(&message).await;
                    }
                }
            }
        }

        assign_unique_targets(&mut jobs);

        info!(
            "Found {} database(s) in {} application directories",
            jobs.len(),
            app_dirs.len()
        );
        jobs
    }

    /// Warn about tools the planned jobs need but which cannot be found
    fn preflight(&self, jobs: &[BackupJob]) {
        let tools = &self.settings.tools;
        let mut needed = BTreeSet::new();

        for job in jobs {
            let program = match job.descriptor.kind() {
                DatabaseKind::Postgres => &tools.pg_dump,
                DatabaseKind::MySql => &tools.mysqldump,
                DatabaseKind::Sqlite => &tools.sqlite3,
                DatabaseKind::Redis => &tools.redis_cli,
            };
            needed.insert(program.as_str());
        }
        if !jobs.is_empty() && self.settings.compression == CompressionMethod::External {
            needed.insert(tools.bzip2.as_str());
        }

        for program in needed {
            match which::which(program) {
                Ok(path) => debug!("Using {} at {:?}", program, path),
                Err(_) => warn!(
                    "{} not found, backups depending on it will fail",
                    program
                ),
            }
        }
    }

    /// Spawn every job and wait for all of them
    async fn launch(&self, jobs: Vec<BackupJob>) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut tasks = JoinSet::new();

        for job in jobs {
            let executor = Arc::clone(&self.executor);
            let runner = self.runner.clone();
            tasks.spawn(async move { runner.run(executor.as_ref(), &job).await });
        }

        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(success) => summary.record(success),
                Err(e) => {
                    error!("Backup task did not complete: {}", e);
                    summary.record(false);
                }
            }
        }

        summary
    }

    /// Rotate the backups of every application currently under the root
    fn apply_retention(&self) {
        let apps = match list_app_directories(&self.settings.root_dir) {
            Ok(apps) => apps,
            Err(e) => {
                warn!("Skipping retention, cannot list applications: {:#}", e);
                return;
            }
        };
        let retention = RetentionManager::new(self.settings.retention_count);

        for (name, _) in apps {
            let dir = self.settings.destination_dir.join(&name);
            match retention.apply(&dir) {
                Ok(report) if !report.removed.is_empty() => info!(
                    "Rotated {}: kept {}, removed {}",
                    name,
                    report.kept,
                    report.removed.len()
                ),
                Ok(_) => {}
                Err(e) => warn!("Failed to apply retention in {:?}: {:#}", dir, e),
            }
        }
    }

    async fn report(&self, summary: &RunSummary) {
        if summary.total() == 0 {
            info!("No databases were backed up");
            return;
        }

        info!("Backup summary: {}", summary);

        // Failed jobs have already been notified one by one
        if summary.failed == 0 {
            self.notifier
                .notify(&format!("Database backups completed: {}", summary))
                .await;
        }
    }
}
