//! FFmpeg subprocess handling for audio conversion

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{truncate_diagnostic, ConvertError, EncodeError};
use crate::profiles::{Codec, EncodingProfile};

/// Longest encoder error excerpt kept on a failed task
pub const DIAGNOSTIC_MAX_CHARS: usize = 200;

/// One encoder invocation
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    /// Source audio file
    pub source: &'a Path,
    /// Where the encoder writes (the temporary sibling, not the final name)
    pub output: &'a Path,
    pub profile: &'a EncodingProfile,
    /// Allow the encoder to overwrite `output`
    pub overwrite: bool,
    /// Let the encoder copy source metadata instead of stripping it
    pub copy_metadata: bool,
}

/// Something that turns a source file into an encoded output file
pub trait Encoder: Send + Sync {
    /// Run one encode to completion. Never interrupted once started.
    fn encode(&self, request: &EncodeRequest<'_>) -> Result<(), EncodeError>;

    /// Check the encoder can run at all, before a run starts
    fn check_available(&self) -> Result<(), ConvertError> {
        Ok(())
    }
}

/// Encoder backed by an ffmpeg binary
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Build ffmpeg arguments for one request
    ///
    /// -y / -n           : overwrite or refuse to overwrite the output
    /// -i <input>        : source file
    /// -vn               : drop cover art streams (reattached from tags)
    /// -codec:a <codec>  : codec from the profile
    /// rate flags        : bitrate or quality, per format table
    /// codec extras      : opus complexity/vbr/application, aac cutoff
    /// -map_metadata     : -1 strips, 0 (plus chapters) copies
    pub fn build_args(request: &EncodeRequest<'_>) -> Vec<OsString> {
        let profile = request.profile;
        let codec = profile.codec();

        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            OsString::from(if request.overwrite { "-y" } else { "-n" }),
            "-i".into(),
            request.source.as_os_str().to_os_string(),
            "-vn".into(),
            "-codec:a".into(),
            codec.ffmpeg_name().into(),
        ];

        if let Some(bitrate) = profile.effective_bitrate() {
            args.push("-b:a".into());
            args.push(bitrate.into());
        }

        if let Some((flag, quality)) = profile.effective_quality() {
            args.push(flag.into());
            args.push(quality.to_string().into());
        }

        match codec {
            Codec::Opus => {
                if let Some(complexity) = profile.complexity {
                    args.push("-compression_level".into());
                    args.push(complexity.to_string().into());
                }
                args.push("-vbr".into());
                args.push("on".into());
                if let Some(application) = profile.application {
                    args.push("-application".into());
                    args.push(application.as_str().into());
                }
            }
            Codec::Aac => {
                if let Some(cutoff) = profile.cutoff_hz {
                    args.push("-cutoff".into());
                    args.push(cutoff.to_string().into());
                }
            }
            _ => {}
        }

        if request.copy_metadata {
            args.extend(["-map_metadata", "0", "-map_chapters", "0"].map(OsString::from));
        } else {
            args.extend(["-map_metadata", "-1"].map(OsString::from));
        }

        args.push(request.output.as_os_str().to_os_string());
        args
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, request: &EncodeRequest<'_>) -> Result<(), EncodeError> {
        let args = Self::build_args(request);

        log::debug!(
            "Running {} {}",
            self.ffmpeg_path.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_console_window(&mut cmd);

        let output = cmd.output().map_err(EncodeError::Spawn)?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(EncodeError::ExitStatus {
                status: output.status.to_string(),
                stderr: truncate_diagnostic(&stderr, DIAGNOSTIC_MAX_CHARS),
            })
        }
    }

    fn check_available(&self) -> Result<(), ConvertError> {
        super::verify_ffmpeg(&self.ffmpeg_path).map(|_| ())
    }
}

/// Keep ffmpeg from opening its own console window on Windows
#[cfg(windows)]
pub(crate) fn hide_console_window(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
pub(crate) fn hide_console_window(_cmd: &mut Command) {}
