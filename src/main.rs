//! Audio Converter
//!
//! Batch-converts audio files between formats with ffmpeg, carrying tags and
//! cover art across, from the terminal.

mod audio;
mod cli;
mod conversion;
mod core;
mod error;
mod logging;
mod profiles;
#[cfg(test)]
mod test_fixtures;

use std::io::{IsTerminal, Read, Write};
use std::process::ExitCode;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter};

use crate::cli::Args;
use crate::conversion::{
    get_ffmpeg_path, ConversionController, ConversionEvent, FfmpegEncoder, RunReport, StopHandle,
};
use crate::core::{RunState, RunSummary};

/// Exit status for a run stopped by the user (128 + SIGINT)
const EXIT_STOPPED: u8 = 130;

/// How often the main thread wakes to drain worker events
const EVENT_TICK: Duration = Duration::from_millis(100);

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let profile = args.encoding_profile().context("Invalid encoding profile")?;

    if args.print_profile {
        println!("{}", profiles::profile_to_json(&profile)?);
        return Ok(ExitCode::SUCCESS);
    }

    let log_path = logging::init_logging(args.log_level());

    let ffmpeg = get_ffmpeg_path(args.ffmpeg.as_deref());
    let encoder = Arc::new(FfmpegEncoder::new(ffmpeg));

    let mut controller = ConversionController::new();
    let events = controller
        .start(args.job(), profile, encoder)
        .context("Conversion not started")?;

    if let Some(handle) = controller.stop_handle() {
        if std::io::stdin().is_terminal() && !args.quiet {
            spawn_control_thread(handle);
        }
    }

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        new_progress_bar()
    };
    let mut console = Console::new(pb.clone(), std::io::stderr(), args.log_level());

    let mut report: Option<RunReport> = None;
    loop {
        let event = match events.recv_timeout(EVENT_TICK) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        match event {
            ConversionEvent::Log { level, message } => console.line(level, &message),
            ConversionEvent::Progress {
                completed, total, ..
            } => {
                pb.set_length(total as u64);
                pb.set_position(completed as u64);
            }
            ConversionEvent::Finished(finished) => {
                console.line(
                    Level::Info,
                    &format!(
                        "Run {} after {}s",
                        finished.state,
                        finished.elapsed().num_seconds()
                    ),
                );
                report = Some(finished);
            }
        }
    }
    pb.finish_and_clear();

    let joined = controller.wait();
    let report = report
        .or(joined)
        .context("Conversion worker exited without a report")?;

    if report.summary.failed > 0 {
        if let Some(log_path) = &log_path {
            eprintln!("Details in {}", log_path.display());
        }
    }

    Ok(ExitCode::from(exit_status(controller.state(), &report.summary)))
}

/// Where run lines go: above the bar while it draws, else straight to `fallback`
///
/// A hidden bar drops `println`, which is the case under `--quiet` and when
/// stderr is not a terminal.
struct Console<W: Write> {
    pb: ProgressBar,
    fallback: W,
    level: LevelFilter,
}

impl<W: Write> Console<W> {
    fn new(pb: ProgressBar, fallback: W, level: LevelFilter) -> Self {
        Self {
            pb,
            fallback,
            level,
        }
    }

    fn line(&mut self, level: Level, message: &str) {
        if level > self.level {
            return;
        }
        if self.pb.is_hidden() {
            let _ = writeln!(self.fallback, "{}", message);
        } else {
            self.pb.println(message);
        }
    }
}

fn new_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%)")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Watch stdin for 'q' and request a stop between files
fn spawn_control_thread(handle: StopHandle) {
    eprintln!("Press 'q' then Enter to stop after the current file");

    let spawned = thread::Builder::new()
        .name("stdin-control".to_string())
        .spawn(move || {
            let mut buffer = [0u8; 1];
            let mut stdin = std::io::stdin();
            while let Ok(1) = stdin.read(&mut buffer) {
                if buffer[0] == b'q' || buffer[0] == b'Q' {
                    handle.request_stop();
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        log::warn!("Stop control unavailable: {}", e);
    }
}

fn exit_status(state: RunState, summary: &RunSummary) -> u8 {
    match state {
        RunState::Stopped => EXIT_STOPPED,
        RunState::Completed if summary.failed == 0 => 0,
        _ => 1,
    }
}
