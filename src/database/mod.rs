//! Database connection URLs and the dump commands built from them

pub mod dump;
pub mod url;

pub use dump::build_dump_command;
pub use url::{ConnectionDescriptor, DatabaseKind, RedisConnection, ServerConnection, UrlParseError};
