use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, VidcutError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Command name looked up on PATH when no bundled binary exists
    pub binary_name: String,
    /// Directory of the bundled binary, relative to the executable's directory
    pub bundled_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Delete the output file when ffmpeg fails part way through
    #[serde(default)]
    pub remove_partial_output: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory for daily rotated log files; console only when unset
    pub directory: Option<PathBuf>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_name: "ffmpeg".to_string(),
            bundled_dir: PathBuf::from("ffmpeg").join("bin"),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VidcutError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| VidcutError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VidcutError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| VidcutError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
