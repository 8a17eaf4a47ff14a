//! Metadata writing for converted files
//!
//! Applies a `TagBag` captured from the source onto the freshly encoded
//! destination. Only fields present in the bag are written.

use std::path::Path;

use lofty::{Picture, PictureType, Probe, Tag, TagExt, TaggedFileExt};

use super::metadata::TagBag;
use crate::error::MetadataError;

/// Write a tag bag to an audio file
///
/// Updates the primary tag of the file, creating it when missing. Returns
/// the number of text fields written. A cover that lofty can't decode as an
/// image is skipped with a warning rather than failing the whole write.
pub fn write_tag_bag(path: &Path, bag: &TagBag) -> Result<usize, MetadataError> {
    let mut tagged_file = Probe::open(path)
        // Sniff the content: an .ogg file may hold Opus or Vorbis
        .and_then(|probe| Ok(probe.guess_file_type()?))
        .and_then(|probe| probe.read())
        .map_err(|source| MetadataError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    // Get or create the primary tag
    let tag = match tagged_file.primary_tag_mut() {
        Some(tag) => tag,
        None => {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
            tagged_file
                .primary_tag_mut()
                .ok_or_else(|| MetadataError::NoTag {
                    path: path.to_path_buf(),
                })?
        }
    };

    let mut written = 0;
    for (field, value) in &bag.fields {
        if tag.insert_text(field.item_key(), value.clone()) {
            written += 1;
        } else {
            log::debug!(
                "Tag format of {} has no slot for {}",
                path.display(),
                field.name()
            );
        }
    }

    if let Some(cover) = &bag.cover {
        match Picture::from_reader(&mut cover.data.as_slice()) {
            Ok(mut picture) => {
                picture.set_pic_type(PictureType::CoverFront);
                tag.push_picture(picture);
            }
            Err(e) => {
                log::warn!(
                    "Skipping unreadable cover art ({}) for {}: {}",
                    cover.mime_type,
                    path.display(),
                    e
                );
            }
        }
    }

    tag.save_to_path(path)
        .map_err(|source| MetadataError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(written)
}
