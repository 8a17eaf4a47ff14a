//! The per-run conversion pipeline
//!
//! Enumerate → map destination → (read tags) → encode → (write tags) →
//! report, one file at a time in enumeration order. Per-file failures are
//! recorded and the loop moves on; only enumeration errors end a run early.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};

use super::background::CancellationToken;
use super::ffmpeg::{EncodeRequest, Encoder};
use super::progress::Reporter;
use crate::audio::{read_tag_bag, write_tag_bag};
use crate::core::{
    destination_for, enumerate_sources, temp_path_for, ConversionJob, FileTask, RunState,
    RunSummary, SkipReason, SourceFile, TaskOutcome,
};
use crate::error::EncodeError;
use crate::profiles::EncodingProfile;

/// Final state and counters of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub state: RunState,
    pub summary: RunSummary,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RunReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Run one conversion job to completion (or until stopped)
///
/// The cancellation token is checked once per file, before the file starts.
/// An encode that has started always runs to the end.
pub fn run_conversion(
    job: &ConversionJob,
    profile: &EncodingProfile,
    encoder: &dyn Encoder,
    cancel: &CancellationToken,
    reporter: &Reporter,
) -> RunReport {
    let started_at = Local::now();
    let finish = |state: RunState, summary: RunSummary| RunReport {
        state,
        summary,
        started_at,
        finished_at: Local::now(),
    };

    let enumeration = match enumerate_sources(job, profile.format) {
        Ok(enumeration) => enumeration,
        Err(e) => {
            reporter.error(format!("Error: {}", e));
            return finish(RunState::FailedToStart, RunSummary::default());
        }
    };

    if enumeration.is_empty() {
        reporter.info("No supported audio files found");
        let summary = RunSummary::default();
        reporter.progress(&summary);
        return finish(RunState::Completed, summary);
    }

    let total = enumeration.len();
    reporter.info(format!("Found {} files to convert", total));
    reporter.info(format!("Target: {}", profile.describe()));

    let extension = profile.format.extension();
    let mut summary = RunSummary::with_total(total);
    let mut destinations = HashSet::new();
    let mut state = RunState::Completed;

    for source in &enumeration.files {
        if cancel.is_cancelled() {
            reporter.info(format!(
                "Conversion stopped after {} of {} files",
                summary.processed(),
                total
            ));
            state = RunState::Stopped;
            break;
        }

        let destination = destination_for(job, enumeration.kind, &source.path, extension);
        if !destinations.insert(destination.clone()) {
            reporter.warn(format!(
                "Warning: {} maps to {}, which an earlier file in this run also produced",
                source.path.display(),
                destination.display()
            ));
        }

        let mut task = FileTask::new(source.path.clone(), destination);
        process_file(&mut task, source, job, profile, encoder, reporter);

        summary.record(&task.outcome);
        reporter.progress(&summary);
        log::debug!("Processing: {}/{}", summary.processed(), total);
    }

    match state {
        RunState::Stopped => reporter.info(format!("Conversion stopped: {}", summary)),
        _ => reporter.info(format!("Conversion completed: {}", summary)),
    }

    finish(state, summary)
}

/// Take one file from Pending to a final outcome
fn process_file(
    task: &mut FileTask,
    source: &SourceFile,
    job: &ConversionJob,
    profile: &EncodingProfile,
    encoder: &dyn Encoder,
    reporter: &Reporter,
) {
    if job.skip_same_format && source.already_target_format {
        reporter.info(format!(
            "Skipped (already {}): {}",
            profile.format.extension(),
            task.source_name()
        ));
        task.outcome = TaskOutcome::Skipped(SkipReason::AlreadyTargetFormat);
        return;
    }

    // Checked once; the rename below does not look again.
    if task.destination.exists() && !job.overwrite {
        reporter.info(format!("Skipped (exists): {}", task.destination_name()));
        task.outcome = TaskOutcome::Skipped(SkipReason::DestinationExists);
        return;
    }

    if job.retags() {
        match read_tag_bag(&task.source) {
            Ok(bag) => {
                log::debug!("Read tags from {}: {}", task.source_name(), bag.summary());
                task.tags = Some(bag);
            }
            Err(e) => reporter.warn(format!("Metadata not read: {}", e)),
        }
    }

    reporter.info(format!("Converting: {}", task.source_name()));

    match encode_to_destination(task, job, profile, encoder) {
        Ok(()) => {
            if let Some(bag) = task.tags.take() {
                if !bag.is_empty() {
                    match write_tag_bag(&task.destination, &bag) {
                        Ok(count) => log::debug!(
                            "Wrote {} tag fields to {}",
                            count,
                            task.destination_name()
                        ),
                        Err(e) => reporter.warn(format!("Metadata not applied: {}", e)),
                    }
                }
            }
            reporter.info(format!("✓ Completed: {}", task.destination_name()));
            task.outcome = TaskOutcome::Succeeded;
        }
        Err(e) => {
            reporter.error(format!("✗ Failed: {} - {}", task.source_name(), e));
            task.outcome = TaskOutcome::Failed(e.to_string());
        }
    }
}

/// Encode into a temporary sibling and rename it onto the destination
///
/// On any failure the temporary file is removed and the destination is left
/// exactly as it was.
fn encode_to_destination(
    task: &FileTask,
    job: &ConversionJob,
    profile: &EncodingProfile,
    encoder: &dyn Encoder,
) -> Result<(), EncodeError> {
    if let Some(parent) = task.destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| EncodeError::OutputDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let temp = temp_path_for(&task.destination);
    let request = EncodeRequest {
        source: &task.source,
        output: &temp,
        profile,
        overwrite: job.overwrite,
        copy_metadata: job.encoder_copies_metadata(),
    };

    let encoded = encoder.encode(&request).and_then(|()| {
        if temp.is_file() {
            Ok(())
        } else {
            Err(EncodeError::MissingOutput)
        }
    });
    if let Err(e) = encoded {
        remove_temp(&temp);
        return Err(e);
    }

    fs::rename(&temp, &task.destination).map_err(|source| {
        remove_temp(&temp);
        EncodeError::Rename {
            from: temp.clone(),
            source,
        }
    })
}

fn remove_temp(temp: &Path) {
    if temp.exists() {
        if let Err(e) = fs::remove_file(temp) {
            log::warn!("Failed to remove temporary file {}: {}", temp.display(), e);
        }
    }
}
