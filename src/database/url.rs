//! Connection URL parsing
//!
//! Each supported scheme has its own structural parser. Anything that does
//! not match one of them exactly is rejected with a [`UrlParseError`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The database engines that can be backed up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseKind {
    Postgres,
    MySql,
    Sqlite,
    Redis,
}

impl DatabaseKind {
    /// Extension of the uncompressed dump file
    pub fn extension(&self) -> &'static str {
        match self {
            DatabaseKind::Redis => "rdb",
            _ => "sql",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::MySql => "mysql",
            DatabaseKind::Sqlite => "sqlite",
            DatabaseKind::Redis => "redis",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Credentials and location of a network database server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConnection {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConnection {
    pub user: Option<String>,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub db_index: u32,
}

/// A parsed connection URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionDescriptor {
    Postgres(ServerConnection),
    MySql(ServerConnection),
    Sqlite { path: PathBuf },
    Redis(RedisConnection),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlParseError {
    #[error("unrecognized connection URL: {0}")]
    Unrecognized(String),

    #[error("malformed {kind} connection URL {url}: {reason}")]
    Malformed {
        kind: DatabaseKind,
        url: String,
        reason: &'static str,
    },
}

const POSTGRES_SCHEME: &str = "postgresql://";
const MYSQL_SCHEME: &str = "mysql://";
const SQLITE_SCHEME: &str = "sqlite://";
const REDIS_SCHEME: &str = "redis://";

impl ConnectionDescriptor {
    /// Parse a connection URL
    pub fn parse(url: &str) -> Result<Self, UrlParseError> {
        if let Some(rest) = url.strip_prefix(POSTGRES_SCHEME) {
            parse_server(rest)
                .map(ConnectionDescriptor::Postgres)
                .map_err(|reason| malformed(DatabaseKind::Postgres, url, reason))
        } else if let Some(rest) = url.strip_prefix(MYSQL_SCHEME) {
            parse_server(rest)
                .map(ConnectionDescriptor::MySql)
                .map_err(|reason| malformed(DatabaseKind::MySql, url, reason))
        } else if let Some(rest) = url.strip_prefix(SQLITE_SCHEME) {
            parse_sqlite(rest)
                .map(|path| ConnectionDescriptor::Sqlite { path })
                .map_err(|reason| malformed(DatabaseKind::Sqlite, url, reason))
        } else if let Some(rest) = url.strip_prefix(REDIS_SCHEME) {
            parse_redis(rest)
                .map(ConnectionDescriptor::Redis)
                .map_err(|reason| malformed(DatabaseKind::Redis, url, reason))
        } else {
            Err(UrlParseError::Unrecognized(redact_url(url)))
        }
    }

    pub fn kind(&self) -> DatabaseKind {
        match self {
            ConnectionDescriptor::Postgres(_) => DatabaseKind::Postgres,
            ConnectionDescriptor::MySql(_) => DatabaseKind::MySql,
            ConnectionDescriptor::Sqlite { .. } => DatabaseKind::Sqlite,
            ConnectionDescriptor::Redis(_) => DatabaseKind::Redis,
        }
    }

    /// Short token naming the database inside backup file names
    pub fn database_name(&self) -> String {
        match self {
            ConnectionDescriptor::Postgres(conn) | ConnectionDescriptor::MySql(conn) => {
                conn.database.clone()
            }
            ConnectionDescriptor::Sqlite { path } => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sqlite".to_string()),
            ConnectionDescriptor::Redis(conn) => conn.db_index.to_string(),
        }
    }

    /// Host and database, never credentials; used in logs and notifications
    pub fn describe(&self) -> String {
        match self {
            ConnectionDescriptor::Postgres(conn) | ConnectionDescriptor::MySql(conn) => format!(
                "{} {}@{}:{}/{}",
                self.kind(),
                conn.user,
                conn.host,
                conn.port,
                conn.database
            ),
            ConnectionDescriptor::Sqlite { path } => format!("sqlite {}", path.display()),
            ConnectionDescriptor::Redis(conn) => {
                format!("redis {}:{}/{}", conn.host, conn.port, conn.db_index)
            }
        }
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = UrlParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn malformed(kind: DatabaseKind, url: &str, reason: &'static str) -> UrlParseError {
    UrlParseError::Malformed {
        kind,
        url: redact_url(url),
        reason,
    }
}

/// Replace the userinfo part of a URL so credentials never reach logs
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.rsplit_once('@') {
        Some((_, location)) => format!("{}://****@{}", scheme, location),
        None => url.to_string(),
    }
}

/// `user:password@host:port/dbname`
fn parse_server(rest: &str) -> Result<ServerConnection, &'static str> {
    let (userinfo, location) = rest.rsplit_once('@').ok_or("missing credentials")?;
    let (user, password) = userinfo.split_once(':').ok_or("missing password separator")?;
    if user.is_empty() {
        return Err("empty user");
    }

    let (host, port, database) = parse_location(location)?;
    if database.is_empty() {
        return Err("empty database name");
    }
    if database.contains('/') {
        return Err("database name contains '/'");
    }
    if database.starts_with('-') {
        return Err("database name starts with '-'");
    }

    Ok(ServerConnection {
        user: user.to_string(),
        password: password.to_string(),
        host,
        port,
        database: database.to_string(),
    })
}

/// `/absolute/path/to/file`
fn parse_sqlite(rest: &str) -> Result<PathBuf, &'static str> {
    if !rest.starts_with('/') {
        return Err("path is not absolute");
    }
    let path = Path::new(rest);
    if path.file_name().is_none() {
        return Err("path has no file name");
    }
    Ok(path.to_path_buf())
}

/// `[user:]password@host:port/dbindex`
fn parse_redis(rest: &str) -> Result<RedisConnection, &'static str> {
    let (userinfo, location) = rest.rsplit_once('@').ok_or("missing credentials")?;
    let (user, password) = match userinfo.split_once(':') {
        Some((user, password)) if user.is_empty() => (None, password),
        Some((user, password)) => (Some(user.to_string()), password),
        None => (None, userinfo),
    };

    let (host, port, index) = parse_location(location)?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return Err("database index is not a number");
    }
    let db_index = index.parse().map_err(|_| "database index out of range")?;

    Ok(RedisConnection {
        user,
        password: password.to_string(),
        host,
        port,
        db_index,
    })
}

/// `host:port/tail`, returning the unparsed tail
fn parse_location(location: &str) -> Result<(String, u16, &str), &'static str> {
    let (authority, tail) = location.split_once('/').ok_or("missing database")?;
    let (host, port) = authority.split_once(':').ok_or("missing port")?;
    if host.is_empty() {
        return Err("empty host");
    }
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err("port is not a number");
    }
    let port: u16 = port.parse().map_err(|_| "port out of range")?;
    if port == 0 {
        return Err("port out of range");
    }
    Ok((host.to_string(), port, tail))
}
