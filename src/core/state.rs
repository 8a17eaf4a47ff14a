//! Run-level state types
//!
//! Contains:
//! - ConversionJob: what to convert and how to treat existing files
//! - LayoutPolicy / MetadataMode: per-job choices
//! - RunState: the lifecycle of one conversion run

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How destination paths are laid out for directory input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPolicy {
    /// Recreate the source tree under the output root
    #[default]
    Mirror,
    /// Put every file directly in the output root
    Flatten,
}

/// Who carries tags over when metadata is preserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MetadataMode {
    /// Encoder strips everything; tags and cover are reapplied with lofty
    #[default]
    Retag,
    /// Encoder copies metadata and chapters itself
    Passthrough,
}

/// One conversion request. Immutable once a run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    /// Source file or directory
    pub input: PathBuf,
    /// Output file or directory; None means next to the input
    pub output: Option<PathBuf>,
    pub recursive: bool,
    /// Skip sources whose extension already belongs to the target format
    pub skip_same_format: bool,
    pub overwrite: bool,
    pub preserve_metadata: bool,
    pub layout: LayoutPolicy,
    pub metadata_mode: MetadataMode,
}

impl ConversionJob {
    /// Job with the defaults of the original tool: recursive, skip files
    /// already in the target format, never overwrite, keep tags.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            recursive: true,
            skip_same_format: true,
            overwrite: false,
            preserve_metadata: true,
            layout: LayoutPolicy::Mirror,
            metadata_mode: MetadataMode::Retag,
        }
    }

    /// Output root, defaulting to the input root
    pub fn output_root(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.input)
    }

    /// Tags are read and rewritten by the tag library
    pub fn retags(&self) -> bool {
        self.preserve_metadata && self.metadata_mode == MetadataMode::Retag
    }

    /// The encoder is allowed to copy source metadata
    pub fn encoder_copies_metadata(&self) -> bool {
        self.preserve_metadata && self.metadata_mode == MetadataMode::Passthrough
    }
}

/// Lifecycle of a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    /// Every candidate file was processed
    Completed,
    /// Stop was requested and honored between files
    Stopped,
    /// The run ended before converting anything (bad input, missing encoder)
    FailedToStart,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// A new run may start from any state except Running
    pub fn can_start(&self) -> bool {
        !self.is_running()
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::FailedToStart => "failed to start",
        };
        f.write_str(s)
    }
}
