//! Destination path mapping
//!
//! Destinations depend only on the source path, the job's roots, the target
//! extension and the layout policy. Nothing here touches the filesystem
//! except `is_dir` on the output root for single-file jobs.

use std::path::{Path, PathBuf};

use crate::core::scanning::InputKind;
use crate::core::state::{ConversionJob, LayoutPolicy};

/// Compute the destination for one source file
pub fn destination_for(
    job: &ConversionJob,
    kind: InputKind,
    source: &Path,
    extension: &str,
) -> PathBuf {
    let output_root = job.output_root();

    match kind {
        InputKind::File => {
            if output_root.is_dir() {
                output_root.join(file_name_with_extension(source, extension))
            } else {
                output_root.with_extension(extension)
            }
        }
        InputKind::Directory => match job.layout {
            LayoutPolicy::Mirror => {
                let relative = source.strip_prefix(&job.input).unwrap_or(source);
                match relative.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => output_root
                        .join(parent)
                        .join(file_name_with_extension(source, extension)),
                    _ => output_root.join(file_name_with_extension(source, extension)),
                }
            }
            LayoutPolicy::Flatten => {
                output_root.join(file_name_with_extension(source, extension))
            }
        },
    }
}

/// `<stem>.<extension>` for a source file
fn file_name_with_extension(source: &Path, extension: &str) -> PathBuf {
    // Append rather than set_extension, which would eat "01. Intro" down to "01"
    let mut name = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Sibling path the encoder writes to before the final rename
///
/// Keeps the target extension so the encoder picks the right muxer, and is
/// hidden on Unix so half-written output never shows up under a normal name.
pub fn temp_path_for(destination: &Path) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let extension = destination
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    let id = uuid::Uuid::new_v4().simple().to_string();

    let name = if extension.is_empty() {
        format!(".{}.{}.part", stem, &id[..8])
    } else {
        format!(".{}.{}.part.{}", stem, &id[..8], extension)
    };
    destination.with_file_name(name)
}

/// Whether `path` has the shape of a `temp_path_for` name
pub fn is_temp_path(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| {
            name.starts_with('.') && (name.ends_with(".part") || name.contains(".part."))
        })
}
