//! Audio conversion module
//!
//! Handles transcoding audio files using ffmpeg, one file at a time on a
//! background worker.

mod background;
mod ffmpeg;
mod pipeline;
mod progress;

pub use background::{ConversionController, StopHandle};
pub use ffmpeg::FfmpegEncoder;
pub use pipeline::RunReport;
pub use progress::{ConversionEvent, RUN_LOG_TARGET};

#[cfg(test)]
pub use background::CancellationToken;
#[cfg(test)]
pub use pipeline::run_conversion;
#[cfg(test)]
pub use progress::Reporter;

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::ConvertError;

/// Environment variable naming an explicit ffmpeg binary
pub const FFMPEG_ENV: &str = "AUDIO_CONVERTER_FFMPEG";

/// Platform file name of the ffmpeg binary
pub fn ffmpeg_binary_name() -> &'static str {
    if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" }
}

/// Find the ffmpeg binary to use
///
/// Order: explicit path, a binary next to the executable (or in its
/// resources/bin), then plain `ffmpeg` resolved through PATH.
pub fn get_ffmpeg_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let local_path = exe_dir.join(ffmpeg_binary_name());
            if local_path.is_file() {
                log::debug!("Found ffmpeg next to executable: {:?}", local_path);
                return local_path;
            }

            let bundled_path = exe_dir
                .join("resources")
                .join("bin")
                .join(ffmpeg_binary_name());
            if bundled_path.is_file() {
                log::debug!("Found bundled ffmpeg: {:?}", bundled_path);
                return bundled_path;
            }
        }
    }

    PathBuf::from(ffmpeg_binary_name())
}

/// Verify that ffmpeg runs, returning its version line
pub fn verify_ffmpeg(path: &Path) -> Result<String, ConvertError> {
    let mut cmd = Command::new(path);
    cmd.arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    ffmpeg::hide_console_window(&mut cmd);

    let output = cmd.output().map_err(|e| ConvertError::EncoderUnavailable {
        reason: format!("could not run {}: {}", path.display(), e),
    })?;

    if !output.status.success() {
        return Err(ConvertError::EncoderUnavailable {
            reason: format!("{} -version exited with {}", path.display(), output.status),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.lines().next().unwrap_or("ffmpeg").trim().to_string();
    log::debug!("ffmpeg verified at {:?}: {}", path, version);
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = get_ffmpeg_path(Some(Path::new("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
    }

    #[test]
    fn test_fallback_is_binary_name() {
        let path = get_ffmpeg_path(None);
        assert!(
            path.to_string_lossy().ends_with(ffmpeg_binary_name()),
            "unexpected ffmpeg path {:?}",
            path
        );
    }

    #[test]
    fn test_verify_missing_binary() {
        let result = verify_ffmpeg(Path::new("/nonexistent/bin/ffmpeg"));
        assert!(matches!(result, Err(ConvertError::EncoderUnavailable { .. })));
    }
}
