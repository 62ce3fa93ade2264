pub mod command;
pub mod compress;
pub mod scanner;

// Trait-based abstraction for testability
pub mod executor;

// Re-export commonly used types and traits (used by test crate)
pub use command::{CommandOutput, CommandSpec};
pub use executor::{CommandExecutor, RealExecutor};
