//! Process-start capability backed by `std::process`.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::traits::ProcessStarter;

/// Starts programs as detached child processes.
///
/// The child is not waited on; it keeps running after the launcher exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandStarter;

impl CommandStarter {
    /// Create a new command starter.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessStarter for CommandStarter {
    fn start(&self, program: &Path, args: &[String]) -> io::Result<()> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .spawn()?;
        debug!(pid = child.id(), program = %program.display(), "Process started");
        Ok(())
    }
}
