//! bzip2 compression of finished dump files
//!
//! The uncompressed file is only removed once the `.bz2` archive has been
//! written successfully. On failure the original stays and any partial
//! archive is deleted. An archive that already exists is never overwritten.

use super::command::CommandSpec;
use super::executor::CommandExecutor;
use crate::config::CompressionMethod;
use anyhow::{Context, Result};
use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const COMPRESSED_EXTENSION: &str = "bz2";

/// Compresses dump files into `<file>.bz2`
#[derive(Debug, Clone)]
pub struct Compressor {
    method: CompressionMethod,
    program: String,
}

impl Compressor {
    pub fn new(method: CompressionMethod, program: impl Into<String>) -> Self {
        Self {
            method,
            program: program.into(),
        }
    }

    pub fn method(&self) -> CompressionMethod {
        self.method
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Compress `source`, returning the archive path
    pub async fn compress<E: CommandExecutor>(&self, executor: &E, source: &Path) -> Result<PathBuf> {
        let target = compressed_path(source);
        if target.exists() {
            anyhow::bail!("Archive {:?} already exists", target);
        }
        debug!("Compressing {:?} with {} method", source, self.method);

        let result = match self.method {
            CompressionMethod::External => self.compress_external(executor, source).await,
            CompressionMethod::Builtin => {
                let (source, target) = (source.to_path_buf(), target.clone());
                tokio::task::spawn_blocking(move || compress_builtin(&source, &target))
                    .await
                    .context("Compression task panicked")
                    .and_then(|result| result)
            }
        };

        if let Err(e) = result {
            if target.exists() {
                if let Err(remove_err) = fs::remove_file(&target) {
                    warn!("Failed to remove partial archive {:?}: {}", target, remove_err);
                }
            }
            return Err(e);
        }

        if !target.is_file() {
            anyhow::bail!("Compression reported success but {:?} was not created", target);
        }

        fs::remove_file(source)
            .with_context(|| format!("Failed to remove uncompressed file {:?}", source))?;

        info!("Compressed {:?}", target);
        Ok(target)
    }

    async fn compress_external<E: CommandExecutor>(
        &self,
        executor: &E,
        source: &Path,
    ) -> Result<()> {
        let command = CommandSpec::new(&self.program)
            .arg("--keep")
            .arg("--force")
            .arg(source.display().to_string());

        let output = executor.run(&command).await?;
        if !output.success {
            anyhow::bail!(
                "{} exited with code {:?}: {}",
                self.program,
                output.exit_code,
                output.output
            );
        }
        Ok(())
    }
}

/// `backup-x.sql` -> `backup-x.sql.bz2`
pub fn compressed_path(source: &Path) -> PathBuf {
    let mut name: OsString = source.as_os_str().to_owned();
    name.push(".");
    name.push(COMPRESSED_EXTENSION);
    PathBuf::from(name)
}

fn compress_builtin(source: &Path, target: &Path) -> Result<()> {
    let input = File::open(source).with_context(|| format!("Failed to open {:?}", source))?;
    let output =
        File::create(target).with_context(|| format!("Failed to create {:?}", target))?;

    let mut reader = BufReader::new(input);
    let mut encoder = BzEncoder::new(BufWriter::new(output), Compression::best());
    io::copy(&mut reader, &mut encoder).context("Failed to compress dump")?;
    let mut writer = encoder.finish().context("Failed to finish bzip2 stream")?;
    writer.flush().context("Failed to flush archive")?;
    Ok(())
}
