// Media processor plumbing
//
// - Commands: ffmpeg argument builders
// - Runner: blocking execution with captured output

pub mod commands;
pub mod runner;

pub use commands::*;
pub use runner::*;
