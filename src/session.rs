//! Collaborator-facing extraction API.
//!
//! A session remembers the loaded source video and turns every outcome into
//! an [`ExtractionStatus`] line for the caller to show. Nothing escapes as an
//! error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::error::ExtractError;
use crate::handler::{ExtractionHandler, ExtractionRequest};
use crate::media::{CommandRunner, SystemRunner};

/// Result of one session call, rendered as a single status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    Loaded(PathBuf),
    Success(PathBuf),
    Failed(ExtractError),
}

impl ExtractionStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, ExtractionStatus::Failed(_))
    }
}

impl From<Result<PathBuf, ExtractError>> for ExtractionStatus {
    fn from(result: Result<PathBuf, ExtractError>) -> Self {
        match result {
            Ok(path) => ExtractionStatus::Success(path),
            Err(e) => ExtractionStatus::Failed(e),
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStatus::Loaded(path) => {
                let name = path.file_name().map(Path::new).unwrap_or(path.as_path());
                write!(f, "Loaded: {}", name.display())
            }
            ExtractionStatus::Success(path) => write!(f, "Success! Audio saved to: {}", path.display()),
            ExtractionStatus::Failed(e) => write!(f, "Error: {}", e),
        }
    }
}

/// Clears the in-flight flag when the worker finishes, even on panic.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ExtractionSession<R: CommandRunner + 'static = SystemRunner> {
    handler: Arc<ExtractionHandler<R>>,
    source: Option<PathBuf>,
    in_flight: Arc<AtomicBool>,
}

impl<R: CommandRunner + 'static> ExtractionSession<R> {
    pub fn new(handler: ExtractionHandler<R>) -> Self {
        Self {
            handler: Arc::new(handler),
            source: None,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Record the video to cut from. Drag-and-drop payloads wrapped in braces are unwrapped.
    pub fn load_source(&mut self, path: &str) -> ExtractionStatus {
        let path = PathBuf::from(strip_drop_braces(path));
        info!("Loaded source video: {}", path.display());
        self.source = Some(path.clone());
        ExtractionStatus::Loaded(path)
    }

    /// Run an extraction on the calling thread, blocking until ffmpeg exits.
    pub fn request_extraction(
        &self,
        start: &str,
        end: &str,
        directory: &str,
        prefix: &str,
    ) -> ExtractionStatus {
        let request = ExtractionRequest::new(start, end, directory, prefix);
        let status = ExtractionStatus::from(self.handler.extract(self.source(), &request));
        log_status(&status);
        status
    }

    /// Run an extraction on tokio's blocking pool.
    ///
    /// Only one extraction per session runs at a time; a second call while one
    /// is pending fails with `ExtractionInProgress`. Must be called within a
    /// tokio runtime.
    pub fn spawn_extraction(
        &self,
        request: ExtractionRequest,
    ) -> Result<oneshot::Receiver<ExtractionStatus>, ExtractError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Extraction requested while another is running");
            return Err(ExtractError::ExtractionInProgress);
        }

        let guard = InFlight(Arc::clone(&self.in_flight));
        let handler = Arc::clone(&self.handler);
        let source = self.source.clone();
        let (tx, rx) = oneshot::channel();

        tokio::task::spawn_blocking(move || {
            let status = ExtractionStatus::from(handler.extract(source.as_deref(), &request));
            log_status(&status);
            drop(guard);
            // Receiver may have been dropped; the file is written either way.
            let _ = tx.send(status);
        });

        Ok(rx)
    }

    /// Await an off-thread extraction and fold every failure into the status.
    pub async fn extract_in_background(&self, request: ExtractionRequest) -> ExtractionStatus {
        match self.spawn_extraction(request) {
            Ok(rx) => rx.await.unwrap_or_else(|_| {
                ExtractionStatus::Failed(ExtractError::ProcessingFailed(
                    "extraction worker stopped unexpectedly".to_string(),
                ))
            }),
            Err(e) => ExtractionStatus::Failed(e),
        }
    }
}

fn log_status(status: &ExtractionStatus) {
    match status {
        ExtractionStatus::Failed(e) if e.is_validation() => info!("Extraction rejected: {}", e),
        ExtractionStatus::Failed(e) => warn!("Extraction failed: {}", e),
        _ => info!("{}", status),
    }
}

fn strip_drop_braces(path: &str) -> &str {
    path.strip_prefix('{')
        .and_then(|p| p.strip_suffix('}'))
        .unwrap_or(path)
}
