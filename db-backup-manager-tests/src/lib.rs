//! Test utilities for db-backup-manager
//!
//! This crate provides shared fixtures, a scratch directory harness,
//! fake dump tools and a recording webhook server for testing backup runs.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{fake_sqlite3, TestContext};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let ctx = TestContext::new();
//!     ctx.add_app("blog", &["sqlite:///data/app.db"]);
//!     let settings = ctx
//!         .settings()
//!         .sqlite3(fake_sqlite3(&ctx.bin_dir()))
//!         .build();
//!     // ... run a BackupManager with these settings
//! }
//! ```

pub mod fixtures;
pub mod settings_builder;
pub mod test_context;
pub mod webhook;

// Re-export commonly used items
pub use fixtures::*;
pub use settings_builder::SettingsBuilder;
pub use test_context::TestContext;
pub use webhook::WebhookRecorder;

// Re-export types from the main crate for convenience
pub use db_backup_manager::config::{CompressionMethod, Settings, ToolPaths};
pub use db_backup_manager::database::{ConnectionDescriptor, DatabaseKind};
pub use db_backup_manager::managers::backup::{BackupManager, RunSummary};

// Re-export the mock executor from the main crate
pub use db_backup_manager::utils::executor::mock::{CommandCall, MockExecutor, MockResponse};
pub use db_backup_manager::utils::executor::{CommandExecutor, RealExecutor};

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
