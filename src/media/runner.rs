use std::io;
use tracing::debug;

use super::MediaCommand;

/// Captured result of a finished media processor run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human readable reason for a failed run: stderr, or stdout when stderr is empty.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim_end();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("process exited with code {}", code),
            None => "process terminated by signal".to_string(),
        }
    }
}

/// Runs a media command to completion, blocking the caller.
///
/// `Err` means the process could not be launched at all.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &MediaCommand) -> io::Result<ProcessOutput>;
}

/// Runner backed by `std::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &MediaCommand) -> io::Result<ProcessOutput> {
        debug!("Executing media processing command: {}", command);
        debug!("Description: {}", command.description);

        let output = command.to_command().output()?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
