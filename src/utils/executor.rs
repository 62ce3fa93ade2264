//! Command execution abstraction for testability
//!
//! Backup jobs and the compressor run their commands through
//! [`CommandExecutor`], so tests can substitute [`mock::MockExecutor`].

use super::command::{CommandOutput, CommandSpec};
use anyhow::Result;
use std::future::Future;

/// Abstraction for command execution, enabling mocking in tests
pub trait CommandExecutor: Send + Sync + 'static {
    /// Run a command to completion
    fn run(&self, command: &CommandSpec) -> impl Future<Output = Result<CommandOutput>> + Send;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run(&self, command: &CommandSpec) -> impl Future<Output = Result<CommandOutput>> + Send {
        super::command::run_command(command)
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, MutexGuard};

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
        pub env: Vec<(String, String)>,
        pub stdout_file: Option<std::path::PathBuf>,
    }

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        /// Exit 0; `stdout` goes to the redirect file when the command has one
        Success { stdout: String, stderr: String },
        /// Nonzero exit with the given combined output
        Failure { output: String, exit_code: i32 },
        /// The program could not be started
        SpawnError(String),
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }

    /// Mock executor for testing
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        /// Pre-configured responses: program name -> response
        responses: Arc<Mutex<HashMap<String, MockResponse>>>,
        /// Default response when no specific response is configured
        default_response: Arc<Mutex<MockResponse>>,
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure a response for a specific program
        pub fn expect(self, program: &str, response: MockResponse) -> Self {
            lock(&self.responses).insert(program.to_string(), response);
            self
        }

        /// Set the default response for unconfigured programs
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *lock(&self.default_response) = response;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            lock(&self.calls).clone()
        }

        /// Check if a program was called
        pub fn was_called(&self, program: &str) -> bool {
            lock(&self.calls).iter().any(|c| c.program == program)
        }

        /// Get number of calls to a specific program
        pub fn call_count(&self, program: &str) -> usize {
            lock(&self.calls)
                .iter()
                .filter(|c| c.program == program)
                .count()
        }

        fn record_call(&self, command: &CommandSpec) {
            lock(&self.calls).push(CommandCall {
                program: command.program.clone(),
                args: command.args.clone(),
                env: command.env.clone(),
                stdout_file: command.stdout_file.clone(),
            });
        }

        fn get_response(&self, program: &str) -> MockResponse {
            lock(&self.responses)
                .get(program)
                .cloned()
                .unwrap_or_else(|| lock(&self.default_response).clone())
        }

        fn execute_response(
            &self,
            command: &CommandSpec,
            response: MockResponse,
        ) -> Result<CommandOutput> {
            match response {
                MockResponse::Success { stdout, stderr } => {
                    let mut output = stderr;
                    match command.stdout_file {
                        Some(ref path) => std::fs::write(path, stdout)?,
                        None => output.insert_str(0, &stdout),
                    }
                    Ok(CommandOutput {
                        success: true,
                        exit_code: Some(0),
                        output,
                    })
                }
                MockResponse::Failure { output, exit_code } => Ok(CommandOutput {
                    success: false,
                    exit_code: Some(exit_code),
                    output,
                }),
                MockResponse::SpawnError(message) => {
                    anyhow::bail!("Failed to execute {}: {}", command.program, message)
                }
            }
        }
    }

    impl CommandExecutor for MockExecutor {
        fn run(
            &self,
            command: &CommandSpec,
        ) -> impl Future<Output = Result<CommandOutput>> + Send {
            self.record_call(command);
            let response = self.get_response(&command.program);
            let result = self.execute_response(command, response);
            async move { result }
        }
    }
}
