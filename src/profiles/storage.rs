//! Reading encoding profiles from JSON files
//!
//! Profiles are read-only input. Nothing here writes to disk; the CLI can
//! print the effective profile so users can keep it themselves.

use std::fs;
use std::path::Path;

use super::types::{EncodingProfile, ProfileError};

/// Load an encoding profile from a JSON file
pub fn load_profile(path: &Path) -> Result<EncodingProfile, ProfileError> {
    let contents = fs::read_to_string(path)?;
    let profile = parse_profile(&contents)?;
    log::debug!("Loaded encoding profile from {}", path.display());
    Ok(profile)
}

/// Parse and validate a profile from JSON text
pub fn parse_profile(json: &str) -> Result<EncodingProfile, ProfileError> {
    let profile: EncodingProfile = serde_json::from_str(json)?;
    profile.validate()?;
    Ok(profile)
}

/// Render a profile as pretty JSON (the format `load_profile` reads)
pub fn profile_to_json(profile: &EncodingProfile) -> Result<String, ProfileError> {
    Ok(serde_json::to_string_pretty(profile)?)
}
