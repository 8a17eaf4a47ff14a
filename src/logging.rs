//! Logging configuration for the audio converter
//!
//! Logs go to the terminal and to a file at:
//! `~/Library/Logs/Audio-Converter/audio-converter.log` on macOS, or
//! `<data_local_dir>/Audio-Converter/logs/audio-converter.log` elsewhere.

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, OpenOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::conversion::RUN_LOG_TARGET;

const APP_DIR_NAME: &str = "Audio-Converter";
const LOG_FILE_NAME: &str = "audio-converter.log";

/// Rotate the log once it grows past this size
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Get the log directory path
pub fn get_log_directory() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Logs").join(APP_DIR_NAME))
    } else {
        dirs::data_local_dir().map(|d| d.join(APP_DIR_NAME).join("logs"))
    }
}

/// Move an oversized log aside so the next session starts fresh
fn rotate_if_needed(log_path: &Path) {
    if let Ok(metadata) = fs::metadata(log_path) {
        if metadata.len() > MAX_LOG_BYTES {
            let _ = fs::rename(log_path, log_path.with_extension("log.old"));
        }
    }
}

fn log_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build()
}

/// No escape codes when stderr is redirected to a file or pipe
fn color_choice(stderr_is_terminal: bool) -> ColorChoice {
    if stderr_is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn term_logger(term_level: LevelFilter) -> Box<dyn SharedLogger> {
    TermLogger::new(
        term_level,
        term_config(),
        TerminalMode::Stderr,
        color_choice(std::io::stderr().is_terminal()),
    )
}

/// Run lines reach the terminal through the progress display instead
fn term_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .add_filter_ignore_str(RUN_LOG_TARGET)
        .build()
}

/// Initialize the logging system
///
/// The terminal shows `term_level` and above; the file always captures
/// debug. Returns the path to the log file on success.
pub fn init_logging(term_level: LevelFilter) -> Option<PathBuf> {
    let log_dir = match get_log_directory() {
        Some(d) => d,
        None => {
            eprintln!("Warning: Could not determine log directory");
            init_terminal_only(term_level);
            return None;
        }
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_terminal_only(term_level);
        return None;
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_needed(&log_path);

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_terminal_only(term_level);
            return None;
        }
    };

    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        term_logger(term_level),
        WriteLogger::new(LevelFilter::Debug, log_config(), log_file),
    ];

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::debug!("=== Audio converter session started ===");
    log::debug!("Log file: {}", log_path.display());

    Some(log_path)
}

/// Terminal-only logging, used when the log file is unavailable
fn init_terminal_only(term_level: LevelFilter) {
    let _ = CombinedLogger::init(vec![term_logger(term_level)]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_log_directory_returns_path() {
        let dir = get_log_directory();
        assert!(dir.is_some(), "Should return a log directory path");

        let path = dir.unwrap();
        assert!(
            path.to_string_lossy().contains(APP_DIR_NAME),
            "Path should contain app name"
        );
    }

    #[test]
    fn test_redirected_stderr_gets_no_color() {
        assert_eq!(color_choice(false), ColorChoice::Never);
        assert_eq!(color_choice(true), ColorChoice::Auto);
    }

    #[test]
    fn test_rotation_moves_large_log() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join(LOG_FILE_NAME);
        let file = fs::File::create(&log_path).unwrap();
        file.set_len(MAX_LOG_BYTES + 1).unwrap();

        rotate_if_needed(&log_path);

        assert!(!log_path.exists());
        assert!(dir.path().join("audio-converter.log.old").exists());
    }

    #[test]
    fn test_rotation_keeps_small_log() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join(LOG_FILE_NAME);
        fs::write(&log_path, b"short").unwrap();

        rotate_if_needed(&log_path);

        assert!(log_path.exists());
    }
}
