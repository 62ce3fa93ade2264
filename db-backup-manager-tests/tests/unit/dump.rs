//! Dump command construction

use db_backup_manager::database::build_dump_command;
use std::path::{Path, PathBuf};
use test_utils::{ConnectionDescriptor, ToolPaths, MYSQL_URL, POSTGRES_URL, REDIS_URL, SQLITE_URL};

fn command_for(url: &str) -> db_backup_manager::utils::CommandSpec {
    let descriptor = ConnectionDescriptor::parse(url).unwrap();
    build_dump_command(&descriptor, Path::new("/backups/app/out"), &ToolPaths::default())
}

#[test]
fn test_passwords_never_appear_in_rendered_commands() {
    for (url, password) in [
        (POSTGRES_URL, "s3cret"),
        (MYSQL_URL, "p@ss"),
        (REDIS_URL, "hunter2"),
    ] {
        let rendered = command_for(url).to_string();
        assert!(
            !rendered.contains(password),
            "{} leaked its password: {}",
            url,
            rendered
        );
    }
}

#[test]
fn test_server_passwords_travel_in_environment() {
    let postgres = command_for(POSTGRES_URL);
    assert!(!postgres.args.iter().any(|arg| arg.contains("s3cret")));
    assert!(postgres.env.contains(&("PGPASSWORD".to_string(), "s3cret".to_string())));

    let mysql = command_for(MYSQL_URL);
    assert!(!mysql.args.iter().any(|arg| arg.contains("p@ss")));
    assert!(mysql.env.contains(&("MYSQL_PWD".to_string(), "p@ss".to_string())));
}

#[test]
fn test_output_destination_per_kind() {
    let output = PathBuf::from("/backups/app/out");

    // pg_dump and redis-cli write the file themselves
    assert_eq!(command_for(POSTGRES_URL).stdout_file, None);
    assert_eq!(command_for(REDIS_URL).stdout_file, None);
    assert!(command_for(REDIS_URL).args.ends_with(&["--rdb".to_string(), "/backups/app/out".to_string()]));

    assert_eq!(command_for(MYSQL_URL).stdout_file, Some(output.clone()));
    assert_eq!(command_for(SQLITE_URL).stdout_file, Some(output));
}
