//! 7-Zip archive capability.
//!
//! Release archives are `.7z` files. Rather than linking a decoder, this
//! module drives the `7z` command-line tool:
//! - Opening lists the archive (`7z l`) to reject files that are not archives
//! - Extraction unpacks everything below the target (`7z x`)
//! - The archive file stays open for reading until the handle is closed

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::error::ArchiveError;
use crate::traits::{Archive, ArchiveOpener};

/// Default name of the 7-Zip executable.
pub const DEFAULT_SEVEN_ZIP: &str = "7z";

/// Opens archives with the `7z` command-line tool.
#[derive(Debug, Clone)]
pub struct SevenZipExtractor {
    program: PathBuf,
}

impl Default for SevenZipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SevenZipExtractor {
    /// Create an extractor using `7z` from `PATH`.
    pub fn new() -> Self {
        Self::with_program(DEFAULT_SEVEN_ZIP)
    }

    /// Create an extractor using a specific 7-Zip executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The 7-Zip executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check that the 7-Zip executable can be run.
    pub fn check_available(&self) -> Result<(), ArchiveError> {
        Command::new(&self.program)
            .output()
            .map(|_| ())
            .map_err(|e| self.unavailable(e))
    }

    fn unavailable(&self, e: std::io::Error) -> ArchiveError {
        ArchiveError::ToolUnavailable {
            tool: self.program.display().to_string(),
            reason: e.to_string(),
        }
    }

    fn run(&self, args: &[OsString]) -> Result<(), ArchiveError> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| self.unavailable(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let reason = if stderr.trim().is_empty() {
                stdout.trim().lines().last().unwrap_or("").to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ArchiveError::ToolFailed {
                tool: self.program.display().to_string(),
                reason: format!("{} ({})", reason, output.status),
            });
        }

        Ok(())
    }
}

impl ArchiveOpener for SevenZipExtractor {
    fn open(&self, path: &Path) -> Result<Box<dyn Archive>, ArchiveError> {
        let file = File::open(path)?;
        self.run(&[OsString::from("l"), path.as_os_str().to_owned()])?;
        debug!(path = %path.display(), "Opened archive");

        Ok(Box::new(SevenZipArchive {
            extractor: self.clone(),
            path: path.to_path_buf(),
            file,
        }))
    }
}

/// An archive opened by [`SevenZipExtractor`].
#[derive(Debug)]
pub struct SevenZipArchive {
    extractor: SevenZipExtractor,
    path: PathBuf,
    file: File,
}

impl Archive for SevenZipArchive {
    fn extract_all(&mut self, target: &Path) -> Result<(), ArchiveError> {
        // `7z x -o` creates the target itself.
        let mut out_flag = OsString::from("-o");
        out_flag.push(target.as_os_str());

        self.extractor.run(&[
            OsString::from("x"),
            OsString::from("-y"),
            out_flag,
            self.path.as_os_str().to_owned(),
        ])
    }

    fn close(self: Box<Self>) -> Result<(), ArchiveError> {
        // Dropping the handle releases the file; on Windows the archive
        // cannot be deleted while it is held open.
        drop(self.file);
        Ok(())
    }
}
