//! Child process execution with captured diagnostics
//!
//! Commands are always spawned from an argument vector, never through a
//! shell, so values taken from connection URLs or file paths reach the child
//! process verbatim.

use anyhow::{Context, Result};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, error};

/// A fully described external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Standard output is written to this file instead of being captured
    pub stdout_file: Option<PathBuf>,
    secrets: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_file = Some(path.into());
        self
    }

    /// Mark a value that must never appear in logs or notifications
    pub fn secret(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.secrets.push(value);
        }
        self
    }

    /// Rendering for logs, with secrets masked and other arguments quoted
    pub fn redacted(&self) -> String {
        let mut rendered = quote(&self.program);
        for arg in &self.args {
            rendered.push(' ');
            if self.secrets.iter().any(|secret| secret == arg) {
                rendered.push_str(MASK);
                continue;
            }
            let masked = self.redact(arg);
            if masked == *arg {
                rendered.push_str(&quote(arg));
            } else {
                rendered.push_str(&masked);
            }
        }
        if let Some(ref file) = self.stdout_file {
            rendered.push_str(" > ");
            rendered.push_str(&quote(&file.display().to_string()));
        }
        rendered
    }

    /// Mask secrets in arbitrary text, such as captured tool output
    ///
    /// Secrets shorter than [`MIN_MASKED_LEN`] characters are left alone here,
    /// since they would match unrelated text.
    pub fn redact(&self, text: &str) -> String {
        self.secrets
            .iter()
            .filter(|secret| secret.chars().count() >= MIN_MASKED_LEN)
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), MASK))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

const MASK: &str = "****";

/// Shortest secret masked inside free-form text
pub const MIN_MASKED_LEN: usize = 4;

fn quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=./:@,+%".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// Result of a finished child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// Captured stdout (unless redirected) followed by stderr
    pub output: String,
}

/// Spawn the command and wait for it to exit
///
/// A nonzero exit is reported through [`CommandOutput::success`]; only a
/// failure to start the process is an error.
pub async fn run_command(command: &CommandSpec) -> Result<CommandOutput> {
    let mut cmd = tokio::process::Command::new(&command.program);
    cmd.args(&command.args);
    for (key, value) in &command.env {
        cmd.env(key, value);
    }
    cmd.stdin(Stdio::null());
    cmd.stderr(Stdio::piped());

    match command.stdout_file {
        Some(ref path) => {
            let file = create_output_file(path)?;
            cmd.stdout(Stdio::from(file));
        }
        None => {
            cmd.stdout(Stdio::piped());
        }
    }

    debug!("Running command: {}", command);

    let child = cmd
        .spawn()
        .with_context(|| format!("Failed to execute {}", command.program))?;
    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("Failed to wait for {}", command.program))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let combined = command.redact(combined.trim_end());

    if !output.status.success() {
        error!("Command failed: {}", command);
        if !combined.is_empty() {
            error!("Output: {}", combined);
        }
    } else if !combined.is_empty() {
        debug!("Command output: {}", combined);
    }

    Ok(CommandOutput {
        success: output.status.success(),
        exit_code: output.status.code(),
        output: combined,
    })
}

fn create_output_file(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Failed to create output file {:?}", path))
}
