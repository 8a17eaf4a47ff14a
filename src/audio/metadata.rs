//! Tag extraction
//!
//! Reads the common tag fields and the first embedded picture from a source
//! file into a `TagBag`, which is held in memory until the converted file
//! exists and then written back by `metadata_writer`.

use std::collections::BTreeMap;
use std::path::Path;

use lofty::{ItemKey, Probe, Tag, TaggedFileExt};

use crate::error::MetadataError;

/// MIME type recorded for pictures that don't declare one
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// Tag fields carried from source to destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagField {
    Title,
    Artist,
    Album,
    TrackNumber,
    Date,
    Genre,
    AlbumArtist,
    DiscNumber,
    Composer,
}

impl TagField {
    pub const ALL: [TagField; 9] = [
        TagField::Title,
        TagField::Artist,
        TagField::Album,
        TagField::TrackNumber,
        TagField::Date,
        TagField::Genre,
        TagField::AlbumArtist,
        TagField::DiscNumber,
        TagField::Composer,
    ];

    /// Field name as shown in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::TrackNumber => "track",
            Self::Date => "date",
            Self::Genre => "genre",
            Self::AlbumArtist => "album_artist",
            Self::DiscNumber => "disc",
            Self::Composer => "composer",
        }
    }

    /// Format-independent tag key
    pub fn item_key(&self) -> ItemKey {
        match self {
            Self::Title => ItemKey::TrackTitle,
            Self::Artist => ItemKey::TrackArtist,
            Self::Album => ItemKey::AlbumTitle,
            Self::TrackNumber => ItemKey::TrackNumber,
            Self::Date => ItemKey::RecordingDate,
            Self::Genre => ItemKey::Genre,
            Self::AlbumArtist => ItemKey::AlbumArtist,
            Self::DiscNumber => ItemKey::DiscNumber,
            Self::Composer => ItemKey::Composer,
        }
    }
}

/// Embedded cover image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Tag fields and cover art read from one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBag {
    pub fields: BTreeMap<TagField, String>,
    pub cover: Option<CoverArt>,
}

impl TagBag {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.cover.is_none()
    }

    pub fn get(&self, field: TagField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: TagField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// Short summary for the run log, e.g. "title, artist + cover"
    pub fn summary(&self) -> String {
        let names: Vec<&str> = self.fields.keys().map(|f| f.name()).collect();
        let mut summary = if names.is_empty() {
            "no fields".to_string()
        } else {
            names.join(", ")
        };
        if let Some(cover) = &self.cover {
            summary.push_str(&format!(" + cover ({})", cover.mime_type));
        }
        summary
    }

    /// Collect the known fields and first picture from a lofty tag
    pub fn from_tag(tag: &Tag) -> Self {
        let mut bag = TagBag::default();
        for field in TagField::ALL {
            if let Some(value) = tag.get_string(&field.item_key()) {
                let value = value.trim();
                if !value.is_empty() {
                    bag.set(field, value);
                }
            }
        }
        bag.cover = tag.pictures().first().map(|picture| CoverArt {
            data: picture.data().to_vec(),
            mime_type: picture
                .mime_type()
                .map(|mime| mime.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN_MIME_TYPE.to_string()),
        });
        bag
    }
}

/// Read the tag bag from an audio file
///
/// Uses the primary tag when the file has one, otherwise the first tag
/// found. A file with no tags yields an empty bag.
pub fn read_tag_bag(path: &Path) -> Result<TagBag, MetadataError> {
    let tagged_file = Probe::open(path)
        // Sniff the content: an .ogg file may hold Opus or Vorbis
        .and_then(|probe| Ok(probe.guess_file_type()?))
        .and_then(|probe| probe.read())
        .map_err(|source| MetadataError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    Ok(tag.map(TagBag::from_tag).unwrap_or_default())
}
