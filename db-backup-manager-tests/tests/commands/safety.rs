//! Connection URL values reach dump tools as literal arguments

use test_utils::{recording_tool, BackupManager, RunSummary, TestContext};

#[tokio::test]
async fn test_shell_metacharacters_not_interpreted() {
    let ctx = TestContext::new();
    let marker = ctx.temp_dir().join("pwned");
    let log = ctx.temp_dir().join("args.log");

    let db_path = format!(
        "/data/x$(touch {m});touch {m} `touch {m}`|touch {m}&&touch {m}.db",
        m = marker.display()
    );
    ctx.add_app("app", &[&format!("sqlite://{}", db_path)]);
    let settings = ctx
        .settings()
        .sqlite3(recording_tool(&ctx.bin_dir(), "sqlite3", &log))
        .build();

    let summary = BackupManager::new(settings).run().await.unwrap();

    assert_eq!(summary, RunSummary { succeeded: 1, failed: 0 });
    assert!(!marker.exists(), "a shell interpreted the database path");
    let recorded = std::fs::read_to_string(&log).unwrap();
    assert_eq!(recorded, format!("{}\n.dump\n", db_path));
}

#[tokio::test]
async fn test_redis_password_is_one_argument() {
    let ctx = TestContext::new();
    let marker = ctx.temp_dir().join("pwned");
    let log = ctx.temp_dir().join("args.log");

    let password = format!("pw;touch {}", marker.display());
    ctx.add_app("cache", &[&format!("redis://{}@127.0.0.1:6379/0", password)]);
    let settings = ctx
        .settings()
        .redis_cli(recording_tool(&ctx.bin_dir(), "redis-cli", &log))
        .build();

    BackupManager::new(settings).run().await.unwrap();

    assert!(!marker.exists());
    let recorded = std::fs::read_to_string(&log).unwrap();
    let args: Vec<&str> = recorded.lines().collect();
    let auth = args.iter().position(|arg| *arg == "-a").unwrap();
    assert_eq!(args[auth + 1], password);
}
