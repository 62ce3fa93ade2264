//! Application directory discovery

use db_backup_manager::utils::scanner::{read_database_urls, scan_root};
use test_utils::{TestContext, REDIS_URL, SQLITE_URL};

#[test]
fn test_apps_scanned_in_name_order() {
    let ctx = TestContext::new();
    ctx.add_app("zeta", &[SQLITE_URL]);
    ctx.add_app("alpha", &[REDIS_URL, SQLITE_URL]);
    ctx.add_app_config("middle", ".env", "APP_ENV=production\n");

    let apps = scan_root(&ctx.root(), ".env").unwrap();

    let names: Vec<_> = apps.iter().map(|app| app.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "middle", "zeta"]);
    assert_eq!(apps[0].urls, vec![REDIS_URL, SQLITE_URL]);
    assert!(apps[1].urls.is_empty());
    assert_eq!(apps[2].path, ctx.root().join("zeta"));
}

#[test]
fn test_custom_config_file_name() {
    let ctx = TestContext::new();
    ctx.add_app_config("blog", "backup.env", "BACKUP_DATABASE_URLS=sqlite:///srv/blog.db\n");
    ctx.add_app("shop", &[SQLITE_URL]);

    let apps = scan_root(&ctx.root(), "backup.env").unwrap();

    assert_eq!(apps[0].urls, vec!["sqlite:///srv/blog.db"]);
    assert!(apps[1].urls.is_empty());
}

#[test]
fn test_missing_config_file_yields_no_urls() {
    let ctx = TestContext::new();
    assert!(read_database_urls(&ctx.root().join("nothing/.env")).is_empty());
}

#[cfg(unix)]
#[test]
fn test_unreadable_config_file_yields_no_urls() {
    let ctx = TestContext::new();
    // A directory where the file should be cannot be read as text
    let dir = ctx.root().join("broken");
    std::fs::create_dir_all(dir.join(".env")).unwrap();

    assert!(read_database_urls(&dir.join(".env")).is_empty());
}

#[test]
fn test_comment_lines_do_not_match() {
    let ctx = TestContext::new();
    ctx.add_app_config(
        "blog",
        ".env",
        "# BACKUP_DATABASE_URLS=sqlite:///old.db\nBACKUP_DATABASE_URLS='sqlite:///new.db'\n",
    );

    let apps = scan_root(&ctx.root(), ".env").unwrap();
    assert_eq!(apps[0].urls, vec!["sqlite:///new.db"]);
}
