// Audio module - source detection and tag carry-over

pub mod detection;
pub mod metadata;
pub mod metadata_writer;

pub use detection::is_audio_file;
pub use metadata::{read_tag_bag, TagBag};
pub use metadata_writer::write_tag_bag;
