//! Test fixtures for encoding tests
//!
//! Generates short sine-wave audio files with ffmpeg. Tests that need real
//! audio call `ffmpeg_if_available` first and return early when it is `None`,
//! so the suite still passes on machines without ffmpeg. `write_minimal_wav`
//! and `PNG_1X1` need nothing external.

#![cfg(test)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use crate::conversion::{get_ffmpeg_path, verify_ffmpeg};
use crate::profiles::{EncodingProfile, TargetFormat};

static FFMPEG: OnceLock<Option<PathBuf>> = OnceLock::new();

/// A 1x1 transparent PNG
pub const PNG_1X1: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Write a tenth of a second of silent 16-bit mono PCM as an untagged WAV
pub fn write_minimal_wav(path: &Path) {
    const SAMPLE_RATE: u32 = 8000;
    const DATA_LEN: u32 = SAMPLE_RATE / 10 * 2;

    let mut wav = Vec::with_capacity(44 + DATA_LEN as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + DATA_LEN).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&DATA_LEN.to_le_bytes());
    wav.resize(44 + DATA_LEN as usize, 0);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, wav).expect("Failed to write WAV fixture");
}

/// The ffmpeg binary, if one runs on this machine
pub fn ffmpeg_if_available() -> Option<PathBuf> {
    FFMPEG
        .get_or_init(|| {
            let path = get_ffmpeg_path(None);
            verify_ffmpeg(&path).ok().map(|_| path)
        })
        .clone()
}

/// Generate a one-second sine file in `format` at `path`
///
/// Panics when ffmpeg is missing; callers check `ffmpeg_if_available` first.
pub fn generate_audio(path: &Path, format: TargetFormat) {
    run_ffmpeg(path, format, &[]);
}

/// Generate a sine file carrying title and artist tags
pub fn generate_tagged_audio(path: &Path, format: TargetFormat, title: &str, artist: &str) {
    let title = format!("title={}", title);
    let artist = format!("artist={}", artist);
    run_ffmpeg(
        path,
        format,
        &["-metadata", title.as_str(), "-metadata", artist.as_str()],
    );
}

fn run_ffmpeg(path: &Path, format: TargetFormat, extra: &[&str]) {
    let ffmpeg = ffmpeg_if_available().expect("ffmpeg not available");
    let codec = EncodingProfile::for_format(format).codec();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }

    let output = Command::new(&ffmpeg)
        .args(["-hide_banner", "-loglevel", "error", "-y"])
        .args(["-f", "lavfi", "-i", "sine=frequency=440:duration=1"])
        .args(["-codec:a", codec.ffmpeg_name()])
        .args(extra)
        .arg(path)
        .output()
        .expect("Failed to execute ffmpeg");

    if !output.status.success() {
        panic!("ffmpeg failed: {}", String::from_utf8_lossy(&output.stderr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::metadata::TagField;
    use crate::audio::read_tag_bag;
    use crate::conversion::{
        run_conversion, CancellationToken, ConversionEvent, FfmpegEncoder, Reporter, RunReport,
    };
    use crate::core::{ConversionJob, MetadataMode, RunState};
    use tempfile::TempDir;

    macro_rules! require_ffmpeg {
        () => {
            match ffmpeg_if_available() {
                Some(path) => path,
                None => {
                    eprintln!("ffmpeg not installed, skipping");
                    return;
                }
            }
        };
    }

    fn convert(job: &ConversionJob, profile: &EncodingProfile, ffmpeg: PathBuf) -> RunReport {
        let (reporter, _rx) = Reporter::channel();
        run_conversion(
            job,
            profile,
            &FfmpegEncoder::new(ffmpeg),
            &CancellationToken::new(),
            &reporter,
        )
    }

    #[test]
    fn test_minimal_wav_is_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("silence.wav");
        write_minimal_wav(&path);

        assert_eq!(fs::metadata(&path).unwrap().len(), 44 + 1600);
        assert!(read_tag_bag(&path).unwrap().is_empty());
    }

    #[test]
    fn test_generate_flac_file() {
        let _ffmpeg = require_ffmpeg!();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.flac");
        generate_audio(&path, TargetFormat::Flac);

        assert!(path.exists(), "Generated file should exist");
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_generated_tags_are_readable() {
        let _ffmpeg = require_ffmpeg!();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tagged.flac");
        generate_tagged_audio(&path, TargetFormat::Flac, "A", "B");

        let bag = read_tag_bag(&path).unwrap();
        assert_eq!(bag.get(TagField::Title), Some("A"));
        assert_eq!(bag.get(TagField::Artist), Some("B"));
    }

    #[test]
    fn test_retag_into_mp3_album() {
        let ffmpeg = require_ffmpeg!();
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        generate_tagged_audio(&input.join("Album/01.flac"), TargetFormat::Flac, "One", "Band");
        generate_tagged_audio(&input.join("Album/02.wav"), TargetFormat::Wav, "Two", "Band");

        let mut job = ConversionJob::new(&input);
        job.output = Some(dir.path().join("out"));
        let report = convert(&job, &EncodingProfile::for_format(TargetFormat::Mp3), ffmpeg);

        assert_eq!(report.state, RunState::Completed);
        assert_eq!(report.summary.succeeded, 2);
        let bag = read_tag_bag(&dir.path().join("out/Album/01.mp3")).unwrap();
        assert_eq!(bag.get(TagField::Title), Some("One"));
        assert_eq!(bag.get(TagField::Artist), Some("Band"));
    }

    #[test]
    fn test_passthrough_lets_encoder_copy_tags() {
        let ffmpeg = require_ffmpeg!();
        let dir = TempDir::new().unwrap();
        let song = dir.path().join("song.flac");
        generate_tagged_audio(&song, TargetFormat::Flac, "A", "B");

        let mut job = ConversionJob::new(&song);
        job.metadata_mode = MetadataMode::Passthrough;
        let report = convert(&job, &EncodingProfile::default(), ffmpeg);

        assert_eq!(report.summary.succeeded, 1);
        let bag = read_tag_bag(&dir.path().join("song.ogg")).unwrap();
        assert_eq!(bag.get(TagField::Title), Some("A"));
    }

    #[test]
    fn test_metadata_stripped_when_not_preserved() {
        let ffmpeg = require_ffmpeg!();
        let dir = TempDir::new().unwrap();
        let song = dir.path().join("song.flac");
        generate_tagged_audio(&song, TargetFormat::Flac, "A", "B");

        let mut job = ConversionJob::new(&song);
        job.preserve_metadata = false;
        let report = convert(&job, &EncodingProfile::for_format(TargetFormat::Flac), ffmpeg.clone());

        // Same format is skipped by default; the source keeps its tags
        assert_eq!(report.summary.skipped, 1);

        job.skip_same_format = false;
        job.output = Some(dir.path().join("stripped.flac"));
        let report = convert(&job, &EncodingProfile::for_format(TargetFormat::Flac), ffmpeg);

        assert_eq!(report.summary.succeeded, 1);
        let bag = read_tag_bag(&dir.path().join("stripped.flac")).unwrap();
        assert_eq!(bag.get(TagField::Title), None);
    }

    #[test]
    fn test_corrupt_source_fails_with_diagnostic() {
        let ffmpeg = require_ffmpeg!();
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("broken.flac");
        std::fs::write(&bad, b"this is not audio").unwrap();

        let mut job = ConversionJob::new(&bad);
        job.preserve_metadata = false;
        let (reporter, rx) = Reporter::channel();
        let report = run_conversion(
            &job,
            &EncodingProfile::default(),
            &FfmpegEncoder::new(ffmpeg),
            &CancellationToken::new(),
            &reporter,
        );
        drop(reporter);

        assert_eq!(report.summary.failed, 1);
        assert!(!dir.path().join("broken.ogg").exists());
        let failure = rx
            .iter()
            .find_map(|e| match e {
                ConversionEvent::Log { message, .. }
                    if message.starts_with("✗ Failed") =>
                {
                    Some(message)
                }
                _ => None,
            })
            .unwrap();
        assert!(failure.contains("Encoder exited with"));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".part"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
    }
}
