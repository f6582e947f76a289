//! Vidcut - time-range audio extraction
//!
//! Cuts a start..end range out of a video file and writes its audio track as
//! a 16-bit 44.1 kHz stereo WAV file using ffmpeg.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod locator;
pub mod media;
pub mod session;
