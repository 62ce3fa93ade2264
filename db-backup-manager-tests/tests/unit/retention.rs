//! Count-based retention

use db_backup_manager::managers::retention::{list_backups, RetentionManager};
use test_utils::TestContext;

#[test]
fn test_seven_old_backups_pruned_to_five() {
    let ctx = TestContext::new();
    let paths = ctx.add_old_backups("blog", "app", "sql.bz2", 7);

    let report = RetentionManager::new(5).apply(&ctx.backup_dir("blog")).unwrap();

    assert_eq!(report.removed, paths[..2].to_vec());
    assert_eq!(report.kept, 5);
    assert_eq!(ctx.backups("blog").len(), 5);
    assert!(paths[2..].iter().all(|path| path.exists()));
}

#[test]
fn test_second_pass_removes_nothing() {
    let ctx = TestContext::new();
    ctx.add_old_backups("blog", "app", "sql.bz2", 4);
    let retention = RetentionManager::new(2);

    let first = retention.apply(&ctx.backup_dir("blog")).unwrap();
    let second = retention.apply(&ctx.backup_dir("blog")).unwrap();

    assert_eq!(first.removed.len(), 2);
    assert!(second.removed.is_empty());
    assert_eq!(second.kept, 2);
}

#[test]
fn test_fewer_backups_than_limit() {
    let ctx = TestContext::new();
    ctx.add_old_backups("blog", "app", "sql.bz2", 3);

    let report = RetentionManager::new(5).apply(&ctx.backup_dir("blog")).unwrap();

    assert!(report.removed.is_empty());
    assert_eq!(ctx.backups("blog").len(), 3);
}

#[test]
fn test_sql_and_rdb_counted_separately() {
    let ctx = TestContext::new();
    ctx.add_old_backups("cache", "app", "sql.bz2", 3);
    ctx.add_old_backups("cache", "0", "rdb.bz2", 3);

    let report = RetentionManager::new(1).apply(&ctx.backup_dir("cache")).unwrap();

    assert_eq!(report.removed.len(), 4);
    assert_eq!(
        ctx.backups("cache"),
        vec!["backup-0-02.rdb.bz2", "backup-app-02.sql.bz2"]
    );
}

#[test]
fn test_list_backups_oldest_first() {
    let ctx = TestContext::new();
    let paths = ctx.add_old_backups("blog", "app", "sql.bz2", 3);
    ctx.create_file("backups/blog/backup-app-99.sql", "uncompressed");

    let listed = list_backups(&ctx.backup_dir("blog"), ".sql.bz2").unwrap();
    assert_eq!(listed, paths);
}
