//! Target format lookup table
//!
//! Every target format maps to the codecs it allows, the kind of rate
//! parameter it takes, and the defaults used when the user gives none.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Output container the user converts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormat {
    /// Ogg container (Opus or Vorbis)
    Ogg,
    /// Ogg Opus with the .opus extension
    Opus,
    /// MPEG Audio Layer III
    Mp3,
    /// MPEG-4 audio (AAC or ALAC)
    M4a,
    /// Free Lossless Audio Codec
    Flac,
    /// Uncompressed PCM in a RIFF/WAVE container
    Wav,
}

/// Audio codec passed to the encoder with `-codec:a`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    Opus,
    Vorbis,
    Mp3,
    Aac,
    Alac,
    Flac,
    Pcm16,
    Pcm24,
}

impl Codec {
    /// Encoder-side codec name
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            Self::Opus => "libopus",
            Self::Vorbis => "libvorbis",
            Self::Mp3 => "libmp3lame",
            Self::Aac => "aac",
            Self::Alac => "alac",
            Self::Flac => "flac",
            Self::Pcm16 => "pcm_s16le",
            Self::Pcm24 => "pcm_s24le",
        }
    }

    pub fn is_lossless(&self) -> bool {
        matches!(self, Self::Alac | Self::Flac | Self::Pcm16 | Self::Pcm24)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ffmpeg_name())
    }
}

/// How a format's rate is controlled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Bitrate string such as "128k", passed with `-b:a`
    Bitrate { default: &'static str },
    /// Integer quality passed with the given flag, inclusive range
    Quality {
        flag: &'static str,
        min: u8,
        max: u8,
        default: u8,
    },
    /// No rate parameter (uncompressed)
    None,
}

/// One row of the lookup table
#[derive(Debug, Clone, Copy)]
pub struct FormatSpec {
    pub format: TargetFormat,
    pub extension: &'static str,
    /// Extensions that already count as this format for skip-same-format
    pub family: &'static [&'static str],
    /// Allowed codecs; the first one is the default
    pub codecs: &'static [Codec],
    pub parameter: ParameterKind,
}

const FORMATS: &[FormatSpec] = &[
    FormatSpec {
        format: TargetFormat::Ogg,
        extension: "ogg",
        family: &["ogg", "oga", "opus"],
        codecs: &[Codec::Opus, Codec::Vorbis],
        parameter: ParameterKind::Bitrate { default: "128k" },
    },
    FormatSpec {
        format: TargetFormat::Opus,
        extension: "opus",
        family: &["opus", "ogg", "oga"],
        codecs: &[Codec::Opus],
        parameter: ParameterKind::Bitrate { default: "128k" },
    },
    FormatSpec {
        format: TargetFormat::Mp3,
        extension: "mp3",
        family: &["mp3"],
        codecs: &[Codec::Mp3],
        parameter: ParameterKind::Bitrate { default: "192k" },
    },
    FormatSpec {
        format: TargetFormat::M4a,
        extension: "m4a",
        family: &["m4a", "m4b", "aac"],
        codecs: &[Codec::Aac, Codec::Alac],
        parameter: ParameterKind::Bitrate { default: "256k" },
    },
    FormatSpec {
        format: TargetFormat::Flac,
        extension: "flac",
        family: &["flac"],
        codecs: &[Codec::Flac],
        parameter: ParameterKind::Quality {
            flag: "-compression_level",
            min: 0,
            max: 12,
            default: 5,
        },
    },
    FormatSpec {
        format: TargetFormat::Wav,
        extension: "wav",
        family: &["wav"],
        codecs: &[Codec::Pcm16, Codec::Pcm24],
        parameter: ParameterKind::None,
    },
];

impl TargetFormat {
    /// Look up this format's table row
    pub fn spec(&self) -> &'static FormatSpec {
        // Rows are in declaration order.
        let row = match self {
            Self::Ogg => 0,
            Self::Opus => 1,
            Self::Mp3 => 2,
            Self::M4a => 3,
            Self::Flac => 4,
            Self::Wav => 5,
        };
        debug_assert_eq!(FORMATS[row].format, *self);
        &FORMATS[row]
    }

    pub fn extension(&self) -> &'static str {
        self.spec().extension
    }

    pub fn default_codec(&self) -> Codec {
        self.spec().codecs[0]
    }

    pub fn allows(&self, codec: Codec) -> bool {
        self.spec().codecs.contains(&codec)
    }

    /// Whether `path` already has an extension from this format's family
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.spec().family.contains(&ext.as_str()))
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
