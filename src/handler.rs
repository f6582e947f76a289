//! Validation and execution of a single time-range extraction.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::locator::ProcessorHandle;
use crate::media::{CommandRunner, MediaCommand, MediaCommandBuilder, SystemRunner};

type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Raw user input for one extraction, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub start: String,
    pub end: String,
    pub directory: String,
    pub prefix: String,
}

impl ExtractionRequest {
    pub fn new<S1, S2, S3, S4>(start: S1, end: S2, directory: S3, prefix: S4) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: Into<String>,
    {
        Self {
            start: start.into(),
            end: end.into(),
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }
}

/// Seconds into the source timeline, with the text they were parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
    start_text: String,
    end_text: String,
}

impl TimeRange {
    /// Parse both bounds without checking their order.
    fn parse(start: &str, end: &str) -> ExtractResult<Self> {
        let start_text = start.trim();
        let end_text = end.trim();
        let start = parse_seconds(start_text).ok_or(ExtractError::InvalidTimeFormat)?;
        let end = parse_seconds(end_text).ok_or(ExtractError::InvalidTimeFormat)?;

        Ok(Self {
            start,
            end,
            start_text: start_text.to_string(),
            end_text: end_text.to_string(),
        })
    }

    pub fn start_text(&self) -> &str {
        &self.start_text
    }

    pub fn end_text(&self) -> &str {
        &self.end_text
    }

    /// `start < end`; false whenever either side is NaN
    pub fn is_ordered(&self) -> bool {
        self.start < self.end
    }
}

/// Parse seconds, allowing `_` as a separator between two digits (`1_000`).
fn parse_seconds(text: &str) -> Option<f64> {
    if !text.contains('_') {
        return text.parse().ok();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut digits = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c != '_' {
            digits.push(c);
            continue;
        }
        let before = i > 0 && chars[i - 1].is_ascii_digit();
        let after = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
        if !(before && after) {
            return None;
        }
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub prefix: String,
}

impl OutputTarget {
    /// `{directory}/{prefix}_{start}_{end}.wav`; the prefix must be a bare file name.
    pub fn output_path(&self, range: &TimeRange) -> PathBuf {
        self.directory.join(format!(
            "{}_{}_{}.wav",
            self.prefix,
            range.start_text(),
            range.end_text()
        ))
    }
}

/// A request that passed every check and is ready to run
#[derive(Debug, Clone)]
pub struct ValidatedExtraction {
    pub range: TimeRange,
    pub target: OutputTarget,
    pub output_path: PathBuf,
    pub command: MediaCommand,
}

/// Turns extraction requests into ffmpeg runs against one resolved processor.
pub struct ExtractionHandler<R: CommandRunner = SystemRunner> {
    processor: ProcessorHandle,
    runner: R,
    remove_partial_output: bool,
}

impl ExtractionHandler<SystemRunner> {
    pub fn new(processor: ProcessorHandle) -> Self {
        Self::with_runner(processor, SystemRunner)
    }
}

impl<R: CommandRunner> ExtractionHandler<R> {
    pub fn with_runner(processor: ProcessorHandle, runner: R) -> Self {
        Self {
            processor,
            runner,
            remove_partial_output: false,
        }
    }

    /// Delete whatever ffmpeg left at the output path when it fails.
    pub fn remove_partial_output(mut self, enabled: bool) -> Self {
        self.remove_partial_output = enabled;
        self
    }

    /// Check a request in order and build its command without running anything.
    pub fn prepare(
        &self,
        source: Option<&Path>,
        request: &ExtractionRequest,
    ) -> ExtractResult<ValidatedExtraction> {
        let program = self.processor.program()?;
        let source = source.ok_or(ExtractError::NoSourceSelected)?;
        let range = TimeRange::parse(&request.start, &request.end)?;

        if request.directory.is_empty() {
            return Err(ExtractError::MissingOutputDirectory);
        }

        let prefix = request.prefix.trim();
        if prefix.is_empty() {
            return Err(ExtractError::MissingPrefix);
        }
        if prefix.chars().any(std::path::is_separator) {
            return Err(ExtractError::InvalidPrefix);
        }

        if !range.is_ordered() {
            return Err(ExtractError::InvalidTimeOrder);
        }

        let target = OutputTarget {
            directory: PathBuf::from(&request.directory),
            prefix: prefix.to_string(),
        };
        let output_path = target.output_path(&range);
        let command = MediaCommandBuilder::new(program).extract_audio_range(
            source,
            range.start_text(),
            range.end_text(),
            &output_path,
        );

        Ok(ValidatedExtraction {
            range,
            target,
            output_path,
            command,
        })
    }

    /// Validate, run ffmpeg to completion and return the written file.
    pub fn extract(&self, source: Option<&Path>, request: &ExtractionRequest) -> ExtractResult<PathBuf> {
        let job = self.prepare(source, request)?;

        info!(
            "Extracting audio {}s..{}s to {}",
            job.range.start_text(),
            job.range.end_text(),
            job.output_path.display()
        );
        debug!("Executing ffmpeg command: {}", job.command);

        let failure = match self.runner.run(&job.command) {
            Ok(output) if output.success() => {
                info!("Audio extraction completed");
                return Ok(job.output_path);
            }
            Ok(output) => output.diagnostic(),
            Err(e) => format!("Failed to execute ffmpeg: {}", e),
        };

        warn!("Audio extraction failed: {}", failure);
        if self.remove_partial_output {
            self.discard_output(&job.output_path);
        }
        Err(ExtractError::ProcessingFailed(failure))
    }

    fn discard_output(&self, path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed partial output {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove partial output {}: {}", path.display(), e),
        }
    }
}
