//! Source file discovery
//!
//! Turns the job's input path into the ordered list of files a run will
//! process. Directory walks are sorted by file name so the order is the same
//! on every platform.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::audio::is_audio_file;
use crate::core::paths::is_temp_path;
use crate::core::state::ConversionJob;
use crate::error::ConvertError;
use crate::profiles::TargetFormat;

/// Whether the job input was a single file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    File,
    Directory,
}

/// A candidate source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Extension already belongs to the target format's family
    pub already_target_format: bool,
}

/// Result of enumerating a job's input
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub kind: InputKind,
    pub files: Vec<SourceFile>,
}

impl Enumeration {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// Enumerate the candidate source files for a job
///
/// A single file short-circuits to a one-element list once its extension is
/// validated. Directories are walked recursively or only one level deep
/// depending on `job.recursive`. Entries that can't be read below the root
/// are logged and left out.
pub fn enumerate_sources(
    job: &ConversionJob,
    target: TargetFormat,
) -> Result<Enumeration, ConvertError> {
    let root = job.input.as_path();

    if !root.exists() {
        return Err(ConvertError::InputNotFound {
            path: root.to_path_buf(),
        });
    }

    if root.is_file() {
        if !is_audio_file(root) {
            return Err(ConvertError::UnsupportedFormat {
                path: root.to_path_buf(),
            });
        }
        return Ok(Enumeration {
            kind: InputKind::File,
            files: vec![source_file(root, target)],
        });
    }

    let files = walk_audio_files(root, job.recursive)?
        .into_iter()
        .map(|path| source_file(&path, target))
        .collect();

    Ok(Enumeration {
        kind: InputKind::Directory,
        files,
    })
}

fn source_file(path: &Path, target: TargetFormat) -> SourceFile {
    SourceFile {
        path: path.to_path_buf(),
        already_target_format: target.matches_path(path),
    }
}

/// Collect supported audio files under `root` in walk order
pub fn walk_audio_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, ConvertError> {
    let mut walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ConvertError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        // Leftover temps from an interrupted run
        if is_temp_path(entry.path()) {
            continue;
        }
        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
