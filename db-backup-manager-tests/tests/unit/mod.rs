//! Unit tests for db-backup-manager
//!
//! These exercise individual components through the public API.

mod dump;
mod retention;
mod scanner;
mod url;
