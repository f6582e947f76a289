//! Vidcut - time-range audio extraction
//!
//! Command-line front end: collects the source file, time range and output
//! destination, hands them to an extraction session and prints its status.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidcut::cli::{Args, Commands};
use vidcut::config::{Config, LogConfig};
use vidcut::error::VidcutError;
use vidcut::handler::{ExtractionHandler, ExtractionRequest};
use vidcut::locator::{init_processor, version_info};
use vidcut::media::SystemRunner;
use vidcut::session::ExtractionSession;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Only an explicitly named file is read
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::default(),
    };

    let _guard = setup_logging(args.verbose, &config.log)?;

    // Resolved once, shared read-only for the rest of the process
    let processor = init_processor(&config.media);
    info!("Media processor: {}", processor);

    match args.command {
        Commands::Check => {
            println!("ffmpeg: {}", processor);
            match version_info(processor, &SystemRunner) {
                Ok(version) => println!("{}", version),
                Err(e) => {
                    println!("Error: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Cut { input, start, end, output_dir, prefix } => {
            if !processor.is_available() {
                warn!("No usable ffmpeg found, extraction is disabled");
            }

            let handler = ExtractionHandler::new(processor.clone())
                .remove_partial_output(config.extraction.remove_partial_output);
            let mut session = ExtractionSession::new(handler);

            if let Some(input) = input {
                println!("{}", session.load_source(&input));
            }

            let request = ExtractionRequest::new(start, end, output_dir, prefix);
            let status = session.extract_in_background(request).await;
            println!("{}", status);

            if !status.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Setup logging to the console and, when configured, a daily rotated file
fn setup_logging(verbose: bool, log: &LogConfig) -> Result<Option<WorkerGuard>> {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Status lines own stdout
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match &log.directory {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let (non_blocking_file, guard) = non_blocking(rolling::daily(log_dir, "vidcut.log"));
            let layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false); // No ANSI colors in file
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| VidcutError::Logging(e.to_string()))?;

    Ok(guard)
}
