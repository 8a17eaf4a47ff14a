//! Per-file task tracking
//!
//! A `FileTask` is created for each enumerated source, moves from Pending to
//! a final outcome, and is dropped once it has been reported.

use std::fmt;
use std::path::PathBuf;

use crate::audio::TagBag;

/// Why a file was not encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Source already has the target format's extension
    AlreadyTargetFormat,
    /// Destination exists and overwrite is off
    DestinationExists,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyTargetFormat => f.write_str("already in target format"),
            Self::DestinationExists => f.write_str("exists"),
        }
    }
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskOutcome {
    #[default]
    Pending,
    Succeeded,
    Skipped(SkipReason),
    /// Failed with a short diagnostic
    Failed(String),
}

/// One source file moving through the pipeline
#[derive(Debug, Clone)]
pub struct FileTask {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub outcome: TaskOutcome,
    /// Tags read from the source, held until the encode finishes
    pub tags: Option<TagBag>,
}

impl FileTask {
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            outcome: TaskOutcome::Pending,
            tags: None,
        }
    }

    /// Source file name for log lines
    pub fn source_name(&self) -> String {
        display_name(&self.source)
    }

    /// Destination file name for log lines
    pub fn destination_name(&self) -> String {
        display_name(&self.destination)
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Running counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Candidate files found by the enumerator
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Count a finished task
    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Succeeded => self.succeeded += 1,
            TaskOutcome::Skipped(_) => self.skipped += 1,
            TaskOutcome::Failed(_) => self.failed += 1,
            TaskOutcome::Pending => {}
        }
    }

    /// Files with a final outcome so far
    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// Completion percentage, 0.0 to 100.0
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.processed() as f64 / self.total as f64 * 100.0).min(100.0)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} skipped, {} failed",
            self.succeeded, self.skipped, self.failed
        )
    }
}
