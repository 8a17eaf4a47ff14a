use std::path::Path;

/// Source extensions the converter accepts (lowercase)
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "wav", "m4a", "aac", "ogg", "opus", "wma", "ape", "alac", "aiff", "aif", "dsf",
    "dff", "tta", "tak", "dts", "ac3", "amr", "m4b", "oga", "mkv", "avi", "mp4", "mov", "flv",
    "webm",
];

/// Check if a file is a convertible audio source based on its extension
pub fn is_audio_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext = ext.to_string_lossy().to_lowercase();
        SUPPORTED_EXTENSIONS.contains(&ext.as_str())
    } else {
        false
    }
}
