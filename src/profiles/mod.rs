// Profiles module - target formats, encoding profiles and profile files

pub mod formats;
pub mod storage;
pub mod types;

pub use formats::{Codec, TargetFormat};
pub use storage::{load_profile, profile_to_json};
pub use types::{EncodingProfile, OpusApplication, ProfileError};
