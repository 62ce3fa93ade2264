//! External compression through a configurable `bzip2` program

use crate::is_backup_name;
use test_utils::{
    failing_tool, fake_sqlite3, write_script, BackupManager, CompressionMethod, RunSummary,
    TestContext, SQLITE_URL,
};

/// Stands in for `bzip2 --keep --force <file>`: copies the last argument to `<file>.bz2`
fn copying_bzip2(ctx: &TestContext) -> std::path::PathBuf {
    write_script(
        &ctx.bin_dir(),
        "bzip2",
        "for arg in \"$@\"; do file=\"$arg\"; done\ncp \"$file\" \"$file.bz2\"\n",
    )
}

#[tokio::test]
async fn test_external_compressor_used() {
    let ctx = TestContext::new();
    ctx.add_app("app", &[SQLITE_URL]);
    let settings = ctx
        .settings()
        .compression(CompressionMethod::External)
        .sqlite3(fake_sqlite3(&ctx.bin_dir()))
        .bzip2(copying_bzip2(&ctx))
        .build();

    let summary = BackupManager::new(settings).run().await.unwrap();

    assert_eq!(summary, RunSummary { succeeded: 1, failed: 0 });
    let backups = ctx.backups("app");
    assert_eq!(backups.len(), 1);
    assert!(is_backup_name(&backups[0], "app", "sql.bz2"));
}

#[tokio::test]
async fn test_compression_failure_keeps_dump() {
    let ctx = TestContext::new();
    ctx.add_app("app", &[SQLITE_URL]);
    let settings = ctx
        .settings()
        .compression(CompressionMethod::External)
        .sqlite3(fake_sqlite3(&ctx.bin_dir()))
        .bzip2(failing_tool(&ctx.bin_dir(), "bzip2"))
        .build();

    let summary = BackupManager::new(settings).run().await.unwrap();

    assert_eq!(summary, RunSummary { succeeded: 0, failed: 1 });
    let backups = ctx.backups("app");
    assert_eq!(backups.len(), 1);
    assert!(is_backup_name(&backups[0], "app", "sql"), "{:?}", backups);
}
