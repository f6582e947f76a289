#![cfg(unix)]

use assert_fs::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use vidcut::config::MediaConfig;
use vidcut::error::ExtractError;
use vidcut::handler::ExtractionHandler;
use vidcut::locator::{Locator, ProcessorHandle, version_info};
use vidcut::media::SystemRunner;
use vidcut::session::{ExtractionSession, ExtractionStatus};

// Echoes its arguments into the output file; fails for inputs named *broken*.
const FAKE_FFMPEG: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
    echo "ffmpeg version 0.0-fake"
    exit 0
fi
for last; do :; done
case "$2" in
    *broken*)
        echo "Invalid data found" >&2
        exit 1
        ;;
esac
echo "$@" > "$last"
"#;

#[test]
fn test_bundled_processor_end_to_end() {
    let install = assert_fs::TempDir::new().unwrap();
    let binary = install.child("ffmpeg/bin/ffmpeg");
    binary.write_str(FAKE_FFMPEG).unwrap();
    std::fs::set_permissions(binary.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

    let out = install.child("out");
    out.create_dir_all().unwrap();
    let out_dir = out.path().to_string_lossy().into_owned();

    let handle = Locator::new(install.path(), MediaConfig::default(), SystemRunner).locate();
    assert_eq!(handle, ProcessorHandle::Bundled(binary.path().to_path_buf()));
    assert_eq!(version_info(&handle, &SystemRunner).unwrap(), "ffmpeg version 0.0-fake");

    let mut session = ExtractionSession::new(ExtractionHandler::new(handle));
    session.load_source("{/videos/clip.mp4}");

    let status = session.request_extraction("10", "20", &out_dir, " birdsong ");
    let expected: PathBuf = out.path().join("birdsong_10_20.wav");
    assert_eq!(status, ExtractionStatus::Success(expected.clone()));

    let written = std::fs::read_to_string(&expected).unwrap();
    assert_eq!(
        written.trim_end(),
        format!(
            "-i /videos/clip.mp4 -ss 10 -to 20 -vn -acodec pcm_s16le -ar 44100 -ac 2 -y {}",
            expected.display()
        )
    );

    session.load_source("/videos/broken.mp4");
    let status = session.request_extraction("10", "20", &out_dir, "birdsong");
    assert_eq!(
        status,
        ExtractionStatus::Failed(ExtractError::ProcessingFailed("Invalid data found".to_string()))
    );
    assert_eq!(status.to_string(), "Error: Processing failed: Invalid data found");
}

#[test]
fn test_no_processor_disables_extraction() {
    let install = assert_fs::TempDir::new().unwrap();
    let config = MediaConfig {
        binary_name: "vidcut-missing-ffmpeg-3c9d".to_string(),
        ..MediaConfig::default()
    };

    let handle = Locator::new(install.path(), config, SystemRunner).locate();
    assert_eq!(handle, ProcessorHandle::Unavailable);

    let mut session = ExtractionSession::new(ExtractionHandler::new(handle));
    session.load_source("clip.mp4");

    let status = session.request_extraction("10", "20", "/out", "birdsong");
    assert_eq!(status, ExtractionStatus::Failed(ExtractError::ProcessorUnavailable));
    assert_eq!(
        status.to_string(),
        "Error: ffmpeg not found. Please install ffmpeg and add it to your PATH."
    );
}
