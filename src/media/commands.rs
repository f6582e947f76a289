use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Audio codec written by every extraction: 16-bit little-endian PCM.
pub const WAV_CODEC: &str = "pcm_s16le";
pub const WAV_SAMPLE_RATE: u32 = 44_100;
pub const WAV_CHANNELS: u32 = 2;

/// Abstract media processing command representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<P: Into<PathBuf>, S: Into<String>>(program: P, description: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Start position, as an absolute timestamp when placed after the input
    pub fn seek_start<S: AsRef<OsStr>>(self, position: S) -> Self {
        self.arg("-ss").arg(position)
    }

    /// End position, as an absolute timestamp when placed after the input
    pub fn seek_end<S: AsRef<OsStr>>(self, position: S) -> Self {
        self.arg("-to").arg(position)
    }

    /// Set audio codec
    pub fn audio_codec<S: AsRef<OsStr>>(self, codec: S) -> Self {
        self.arg("-acodec").arg(codec)
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Set audio channels
    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    /// Arguments as UTF-8 strings, replacing invalid sequences.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    /// Build the std process command; stdin is closed so ffmpeg never waits on a prompt.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(std::process::Stdio::null());
        cmd
    }
}

impl fmt::Display for MediaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Builder for the commands this tool runs against one processor binary
#[derive(Debug, Clone)]
pub struct MediaCommandBuilder {
    program: PathBuf,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the time-range WAV extraction command.
    ///
    /// `start` and `end` are passed through as given so the processor sees
    /// the same text that ends up in the output filename.
    pub fn extract_audio_range<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        video_path: P,
        start: &str,
        end: &str,
        audio_path: Q,
    ) -> MediaCommand {
        MediaCommand::new(&self.program, "Audio extraction")
            .input(video_path)
            .seek_start(start)
            .seek_end(end)
            .no_video()
            .audio_codec(WAV_CODEC)
            .audio_sample_rate(WAV_SAMPLE_RATE)
            .audio_channels(WAV_CHANNELS)
            .overwrite()
            .output(audio_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.program, "Version check")
            .arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_audio_range_argument_order() {
        let cmd = MediaCommandBuilder::new("ffmpeg")
            .extract_audio_range("clip.mp4", "10", "20", "/out/birdsong_10_20.wav");

        assert_eq!(cmd.program, PathBuf::from("ffmpeg"));
        assert_eq!(
            cmd.arg_strings(),
            vec![
                "-i", "clip.mp4", "-ss", "10", "-to", "20", "-vn", "-acodec", "pcm_s16le",
                "-ar", "44100", "-ac", "2", "-y", "/out/birdsong_10_20.wav",
            ]
        );
    }

    #[test]
    fn test_display_joins_program_and_args() {
        let cmd = MediaCommandBuilder::new("/opt/app/ffmpeg/bin/ffmpeg").version_check();
        assert_eq!(cmd.to_string(), "/opt/app/ffmpeg/bin/ffmpeg -version");
        assert_eq!(cmd.description, "Version check");
    }

    #[test]
    fn test_time_text_is_not_reformatted() {
        let cmd = MediaCommandBuilder::new("ffmpeg").extract_audio_range("a.mkv", "1.50", "1e1", "o.wav");
        let args = cmd.arg_strings();
        assert_eq!(args[3], "1.50");
        assert_eq!(args[5], "1e1");
    }
}
