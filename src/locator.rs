//! Locating the ffmpeg binary used for every extraction.
//!
//! A copy bundled next to the application wins; otherwise the system command
//! is probed once with `-version`. The result is resolved a single time per
//! process and read without synchronization afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::error::{ExtractError, Result, VidcutError};
use crate::media::{CommandRunner, MediaCommandBuilder, SystemRunner};

static PROCESSOR: OnceLock<ProcessorHandle> = OnceLock::new();

/// Resolved reference to the media processor executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorHandle {
    /// Binary shipped inside the application directory
    Bundled(PathBuf),
    /// Command name resolved through PATH
    System(String),
    Unavailable,
}

impl ProcessorHandle {
    pub fn is_available(&self) -> bool {
        !matches!(self, ProcessorHandle::Unavailable)
    }

    /// Program to launch, or `ProcessorUnavailable`.
    pub fn program(&self) -> std::result::Result<PathBuf, ExtractError> {
        match self {
            ProcessorHandle::Bundled(path) => Ok(path.clone()),
            ProcessorHandle::System(name) => Ok(PathBuf::from(name)),
            ProcessorHandle::Unavailable => Err(ExtractError::ProcessorUnavailable),
        }
    }
}

impl fmt::Display for ProcessorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorHandle::Bundled(path) => write!(f, "bundled ({})", path.display()),
            ProcessorHandle::System(name) => write!(f, "system ({})", name),
            ProcessorHandle::Unavailable => write!(f, "unavailable"),
        }
    }
}

pub struct Locator<R: CommandRunner = SystemRunner> {
    install_dir: Option<PathBuf>,
    config: MediaConfig,
    runner: R,
}

impl Locator<SystemRunner> {
    /// Locator rooted at the directory of the running executable
    pub fn from_current_exe(config: MediaConfig) -> Self {
        let install_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        if install_dir.is_none() {
            warn!("Cannot determine application directory, skipping bundled ffmpeg");
        }

        Self {
            install_dir,
            config,
            runner: SystemRunner,
        }
    }
}

impl<R: CommandRunner> Locator<R> {
    pub fn new<P: Into<PathBuf>>(install_dir: P, config: MediaConfig, runner: R) -> Self {
        Self {
            install_dir: Some(install_dir.into()),
            config,
            runner,
        }
    }

    /// Platform-specific path of the bundled binary
    pub fn bundled_path(&self) -> Option<PathBuf> {
        let name = format!("{}{}", self.config.binary_name, std::env::consts::EXE_SUFFIX);
        self.install_dir
            .as_ref()
            .map(|dir| dir.join(&self.config.bundled_dir).join(name))
    }

    /// Resolve the processor: bundled path, then system command, then unavailable.
    pub fn locate(&self) -> ProcessorHandle {
        if let Some(path) = self.bundled_path() {
            if path.exists() {
                info!("Using bundled ffmpeg: {}", path.display());
                return ProcessorHandle::Bundled(path);
            }
            debug!("No bundled ffmpeg at {}", path.display());
        }

        let probe = MediaCommandBuilder::new(&self.config.binary_name).version_check();
        match self.runner.run(&probe) {
            Ok(output) if output.success() => {
                info!("Using system ffmpeg: {}", self.config.binary_name);
                ProcessorHandle::System(self.config.binary_name.clone())
            }
            Ok(output) => {
                warn!("{} -version exited with {:?}", self.config.binary_name, output.code);
                ProcessorHandle::Unavailable
            }
            Err(e) => {
                warn!("{} not found: {}", self.config.binary_name, e);
                ProcessorHandle::Unavailable
            }
        }
    }
}

/// Resolve the processor once for this process and return the cached handle.
pub fn init_processor(config: &MediaConfig) -> &'static ProcessorHandle {
    PROCESSOR.get_or_init(|| Locator::from_current_exe(config.clone()).locate())
}

/// First line of the processor's `-version` output.
pub fn version_info<R: CommandRunner>(handle: &ProcessorHandle, runner: &R) -> Result<String> {
    let program = handle.program()?;
    let command = MediaCommandBuilder::new(program).version_check();

    let output = runner.run(&command)?;
    if !output.success() {
        return Err(VidcutError::Extract(ExtractError::ProcessingFailed(output.diagnostic())));
    }

    Ok(output
        .stdout
        .lines()
        .next()
        .unwrap_or("Unknown version")
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MockCommandRunner, ProcessOutput};
    use assert_fs::prelude::*;
    use std::io;

    fn bundled_name() -> String {
        format!("ffmpeg/bin/ffmpeg{}", std::env::consts::EXE_SUFFIX)
    }

    #[test]
    fn test_bundled_binary_wins_without_probe() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child(bundled_name()).touch().unwrap();

        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(0);

        let handle = Locator::new(temp.path(), MediaConfig::default(), runner).locate();
        assert_eq!(handle, ProcessorHandle::Bundled(temp.child(bundled_name()).path().to_path_buf()));
    }

    #[test]
    fn test_falls_back_to_system_command() {
        let temp = assert_fs::TempDir::new().unwrap();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.program == Path::new("ffmpeg") && cmd.arg_strings() == ["-version"])
            .times(1)
            .returning(|_| Ok(ProcessOutput { code: Some(0), ..Default::default() }));

        let handle = Locator::new(temp.path(), MediaConfig::default(), runner).locate();
        assert_eq!(handle, ProcessorHandle::System("ffmpeg".to_string()));
    }

    #[test]
    fn test_missing_command_is_unavailable() {
        let temp = assert_fs::TempDir::new().unwrap();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "not found")));

        let handle = Locator::new(temp.path(), MediaConfig::default(), runner).locate();
        assert_eq!(handle, ProcessorHandle::Unavailable);
        assert!(!handle.is_available());
    }

    #[test]
    fn test_failing_probe_is_unavailable() {
        let temp = assert_fs::TempDir::new().unwrap();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_| Ok(ProcessOutput { code: Some(1), ..Default::default() }));

        let handle = Locator::new(temp.path(), MediaConfig::default(), runner).locate();
        assert_eq!(handle, ProcessorHandle::Unavailable);
    }

    #[test]
    fn test_configured_binary_name_and_dir() {
        let config = MediaConfig {
            binary_name: "avconv".to_string(),
            bundled_dir: PathBuf::from("tools"),
        };
        let locator = Locator::new("/opt/vidcut", config, MockCommandRunner::new());
        let expected = format!("avconv{}", std::env::consts::EXE_SUFFIX);
        assert_eq!(
            locator.bundled_path(),
            Some(Path::new("/opt/vidcut").join("tools").join(expected))
        );
    }

    #[test]
    fn test_version_info_first_line() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|_| {
            Ok(ProcessOutput {
                code: Some(0),
                stdout: "ffmpeg version 6.1.1\nbuilt with gcc\n".to_string(),
                stderr: String::new(),
            })
        });

        let handle = ProcessorHandle::System("ffmpeg".to_string());
        assert_eq!(version_info(&handle, &runner).unwrap(), "ffmpeg version 6.1.1");
    }

    #[test]
    fn test_version_info_unavailable() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(0);

        let err = version_info(&ProcessorHandle::Unavailable, &runner).unwrap_err();
        assert!(matches!(err, VidcutError::Extract(ExtractError::ProcessorUnavailable)));
    }

    #[test]
    fn test_init_processor_resolves_once() {
        let missing = MediaConfig {
            binary_name: "vidcut-missing-ffmpeg-51a7".to_string(),
            ..MediaConfig::default()
        };
        let first = init_processor(&missing);
        assert_eq!(first, &ProcessorHandle::Unavailable);

        // Later calls return the cached handle whatever config they pass
        let second = init_processor(&MediaConfig::default());
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(PROCESSOR.get().unwrap(), first));
    }
}
