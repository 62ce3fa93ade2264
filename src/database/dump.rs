//! Dump command construction for each database kind

use super::url::{ConnectionDescriptor, RedisConnection, ServerConnection};
use crate::config::ToolPaths;
use crate::utils::command::CommandSpec;
use std::path::Path;

/// Build the dump command writing a full backup of `descriptor` to `output`
pub fn build_dump_command(
    descriptor: &ConnectionDescriptor,
    output: &Path,
    tools: &ToolPaths,
) -> CommandSpec {
    match descriptor {
        ConnectionDescriptor::Postgres(conn) => postgres_command(conn, output, &tools.pg_dump),
        ConnectionDescriptor::MySql(conn) => mysql_command(conn, output, &tools.mysqldump),
        ConnectionDescriptor::Sqlite { path } => CommandSpec::new(&tools.sqlite3)
            .arg(path.display().to_string())
            .arg(".dump")
            .stdout_to(output),
        ConnectionDescriptor::Redis(conn) => redis_command(conn, output, &tools.redis_cli),
    }
}

/// Schema and data in pg_dump's custom archive format
fn postgres_command(conn: &ServerConnection, output: &Path, program: &str) -> CommandSpec {
    let mut command = CommandSpec::new(program)
        .arg(format!("--host={}", conn.host))
        .arg(format!("--port={}", conn.port))
        .arg(format!("--username={}", conn.user))
        .arg("--no-password")
        .arg("--format=custom")
        .arg("--verbose")
        .arg(format!("--file={}", output.display()))
        .arg(format!("--dbname={}", conn.database));

    if !conn.password.is_empty() {
        command = command
            .env("PGPASSWORD", &conn.password)
            .secret(&conn.password);
    }
    command
}

fn mysql_command(conn: &ServerConnection, output: &Path, program: &str) -> CommandSpec {
    let mut command = CommandSpec::new(program)
        .arg(format!("--host={}", conn.host))
        .arg(format!("--port={}", conn.port))
        .arg(format!("--user={}", conn.user))
        .arg("--single-transaction")
        .arg("--routines")
        .arg("--triggers")
        .arg(&conn.database)
        .stdout_to(output);

    if !conn.password.is_empty() {
        command = command
            .env("MYSQL_PWD", &conn.password)
            .secret(&conn.password);
    }
    command
}

/// RDB snapshot fetched over the replication protocol
fn redis_command(conn: &RedisConnection, output: &Path, program: &str) -> CommandSpec {
    let mut command = CommandSpec::new(program)
        .arg("-h")
        .arg(&conn.host)
        .arg("-p")
        .arg(conn.port.to_string())
        .arg("-n")
        .arg(conn.db_index.to_string());

    if let Some(ref user) = conn.user {
        command = command.arg("--user").arg(user);
    }
    if !conn.password.is_empty() {
        command = command
            .arg("-a")
            .arg(&conn.password)
            .arg("--no-auth-warning")
            .secret(&conn.password);
    }

    command.arg("--rdb").arg(output.display().to_string())
}
