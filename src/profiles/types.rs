//! Encoding profile types
//!
//! An `EncodingProfile` is chosen once before a run and never changes while
//! the run is in progress.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::formats::{Codec, ParameterKind, TargetFormat};

/// Opus `-application` hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OpusApplication {
    Audio,
    Voip,
    Lowdelay,
}

impl OpusApplication {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Voip => "voip",
            Self::Lowdelay => "lowdelay",
        }
    }
}

/// Errors from building, validating or loading a profile
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Codec {codec} cannot be used with the {format} format")]
    CodecNotAllowed { format: TargetFormat, codec: Codec },

    #[error("Invalid bitrate '{0}' (expected a number followed by 'k', e.g. 128k)")]
    InvalidBitrate(String),

    #[error("Quality {value} out of range {min}-{max} for {format}")]
    QualityOutOfRange {
        format: TargetFormat,
        value: u8,
        min: u8,
        max: u8,
    },

    #[error("Complexity {0} out of range 0-10")]
    ComplexityOutOfRange(u8),

    #[error("Failed to read profile file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse profile file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Output format plus the codec parameters for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingProfile {
    /// Output container
    pub format: TargetFormat,

    /// Codec; defaults to the format's first allowed codec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<Codec>,

    /// Bitrate such as "128k" (bitrate formats only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,

    /// Integer quality (quality formats only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,

    /// Opus encoder complexity, 0-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u8>,

    /// Opus application hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<OpusApplication>,

    /// Lowpass cutoff in Hz (AAC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_hz: Option<u32>,
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self {
            format: TargetFormat::Ogg,
            codec: Some(Codec::Opus),
            bitrate: Some("128k".to_string()),
            quality: None,
            complexity: Some(10),
            application: Some(OpusApplication::Audio),
            cutoff_hz: None,
        }
    }
}

impl EncodingProfile {
    /// Profile for `format` with every parameter at its table default
    pub fn for_format(format: TargetFormat) -> Self {
        let codec = format.default_codec();
        let (complexity, application) = if codec == Codec::Opus {
            (Some(10), Some(OpusApplication::Audio))
        } else {
            (None, None)
        };
        Self {
            format,
            codec: Some(codec),
            bitrate: None,
            quality: None,
            complexity,
            application,
            cutoff_hz: None,
        }
    }

    /// Codec actually used for encoding
    pub fn codec(&self) -> Codec {
        self.codec.unwrap_or_else(|| self.format.default_codec())
    }

    /// Effective bitrate, falling back to the table default.
    ///
    /// Lossless codecs never get a bitrate even inside a bitrate format
    /// (ALAC in M4A).
    pub fn effective_bitrate(&self) -> Option<String> {
        if self.codec().is_lossless() {
            return None;
        }
        match self.format.spec().parameter {
            ParameterKind::Bitrate { default } => Some(
                self.bitrate
                    .clone()
                    .unwrap_or_else(|| default.to_string()),
            ),
            _ => None,
        }
    }

    /// Effective quality value and its flag, falling back to the table default
    pub fn effective_quality(&self) -> Option<(&'static str, u8)> {
        match self.format.spec().parameter {
            ParameterKind::Quality { flag, default, .. } => {
                Some((flag, self.quality.unwrap_or(default)))
            }
            _ => None,
        }
    }

    /// Check the profile against the format table
    pub fn validate(&self) -> Result<(), ProfileError> {
        let codec = self.codec();
        if !self.format.allows(codec) {
            return Err(ProfileError::CodecNotAllowed {
                format: self.format,
                codec,
            });
        }

        if let Some(bitrate) = &self.bitrate {
            if !is_valid_bitrate(bitrate) {
                return Err(ProfileError::InvalidBitrate(bitrate.clone()));
            }
        }

        if let (Some(value), ParameterKind::Quality { min, max, .. }) =
            (self.quality, self.format.spec().parameter)
        {
            if value < min || value > max {
                return Err(ProfileError::QualityOutOfRange {
                    format: self.format,
                    value,
                    min,
                    max,
                });
            }
        }

        if let Some(complexity) = self.complexity {
            if complexity > 10 {
                return Err(ProfileError::ComplexityOutOfRange(complexity));
            }
        }

        Ok(())
    }

    /// One-line description for the run log
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("{} ({})", self.format.extension(), self.codec())];
        if let Some(bitrate) = self.effective_bitrate() {
            parts.push(bitrate);
        }
        if let Some((_, quality)) = self.effective_quality() {
            parts.push(format!("quality {}", quality));
        }
        if self.codec() == Codec::Opus {
            if let Some(complexity) = self.complexity {
                parts.push(format!("complexity {}", complexity));
            }
        }
        parts.join(", ")
    }
}

/// Bitrates look like "128k": ASCII digits then a lowercase or uppercase k
fn is_valid_bitrate(bitrate: &str) -> bool {
    let Some(digits) = bitrate
        .strip_suffix('k')
        .or_else(|| bitrate.strip_suffix('K'))
    else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) && digits != "0"
}
