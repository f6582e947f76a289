use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save the audio of a time range as a 44.1 kHz stereo WAV file
    Cut {
        /// Input video file
        #[arg(short, long)]
        input: Option<String>,

        /// Start time in seconds
        #[arg(short, long, allow_hyphen_values = true)]
        start: String,

        /// End time in seconds
        #[arg(short, long, allow_hyphen_values = true)]
        end: String,

        /// Directory the WAV file is written to
        #[arg(short, long, default_value = "")]
        output_dir: String,

        /// Filename prefix, output is {prefix}_{start}_{end}.wav
        #[arg(short, long, default_value = "")]
        prefix: String,
    },

    /// Show which ffmpeg binary will be used
    Check,
}
