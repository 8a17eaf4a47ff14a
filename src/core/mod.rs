//! Core conversion model
//!
//! This module contains:
//! - The immutable job description and run lifecycle state
//! - Per-file tasks and run counters
//! - Source file discovery (File Enumerator)
//! - Destination path mapping (Path Mapper)

mod paths;
mod scanning;
mod state;
mod task;

pub use paths::{destination_for, temp_path_for};
pub use scanning::{enumerate_sources, SourceFile};
pub use state::{ConversionJob, LayoutPolicy, MetadataMode, RunState};
pub use task::{FileTask, RunSummary, SkipReason, TaskOutcome};
