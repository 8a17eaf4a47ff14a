//! Background conversion worker
//!
//! A run executes on its own thread so the interactive surface stays
//! responsive. The controller owns the run state; the worker reports through
//! the event channel and sets the final state before its last event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use super::ffmpeg::Encoder;
use super::pipeline::{run_conversion, RunReport};
use super::progress::{ConversionEvent, Reporter};
use crate::core::{ConversionJob, RunState};
use crate::error::ConvertError;
use crate::profiles::EncodingProfile;

/// Cooperative stop signal, checked between files
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Stop requests for a run, usable from another thread
///
/// Shares the controller's state, so a stop only reaches a running worker.
#[derive(Debug, Clone)]
pub struct StopHandle {
    state: Arc<Mutex<RunState>>,
    token: CancellationToken,
}

impl StopHandle {
    /// Ask the worker to stop before its next file
    ///
    /// Has no effect once the run has ended.
    pub fn request_stop(&self) {
        let state = *self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.is_running() {
            return;
        }
        log::info!("Stop requested");
        self.token.cancel();
    }
}

/// Starts runs, tracks their state, and relays stop requests
pub struct ConversionController {
    state: Arc<Mutex<RunState>>,
    cancel: Option<CancellationToken>,
    worker: Option<JoinHandle<RunReport>>,
}

impl Default for ConversionController {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionController {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RunState::Idle)),
            cancel: None,
            worker: None,
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Start a run on the worker thread
    ///
    /// Preconditions are checked here so a bad job fails before any thread
    /// exists. Returns the receiving end of the run's event channel.
    pub fn start(
        &mut self,
        job: ConversionJob,
        profile: EncodingProfile,
        encoder: Arc<dyn Encoder>,
    ) -> Result<Receiver<ConversionEvent>, ConvertError> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if !state.can_start() {
                log::warn!("Start requested while a conversion is running");
                return Err(ConvertError::AlreadyRunning);
            }
            *state = RunState::Running;
        }

        // Reap the previous worker, which has already finished.
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        if let Err(e) = Self::check_preconditions(&job, &profile, encoder.as_ref()) {
            log::error!("Conversion not started: {}", e);
            self.set_state(RunState::FailedToStart);
            return Err(e);
        }

        let token = CancellationToken::new();
        let (reporter, rx) = Reporter::channel();
        let state = Arc::clone(&self.state);
        let worker_token = token.clone();

        let spawned = thread::Builder::new()
            .name("conversion-worker".to_string())
            .spawn(move || {
                log::info!("Conversion worker started for {}", job.input.display());
                let report =
                    run_conversion(&job, &profile, encoder.as_ref(), &worker_token, &reporter);
                *state.lock().unwrap_or_else(PoisonError::into_inner) = report.state;
                log::info!(
                    "Conversion worker finished ({}) in {}s",
                    report.state,
                    report.elapsed().num_seconds()
                );
                reporter.finished(report.clone());
                report
            });

        match spawned {
            Ok(handle) => {
                self.cancel = Some(token);
                self.worker = Some(handle);
                Ok(rx)
            }
            Err(e) => {
                self.set_state(RunState::FailedToStart);
                Err(ConvertError::Io(e))
            }
        }
    }

    fn check_preconditions(
        job: &ConversionJob,
        profile: &EncodingProfile,
        encoder: &dyn Encoder,
    ) -> Result<(), ConvertError> {
        if job.input.as_os_str().is_empty() {
            return Err(ConvertError::NoInput);
        }
        profile.validate()?;
        encoder.check_available()
    }

    /// Stop handle for the current run; `None` before the first start
    pub fn stop_handle(&self) -> Option<StopHandle> {
        self.cancel.as_ref().map(|token| StopHandle {
            state: Arc::clone(&self.state),
            token: token.clone(),
        })
    }

    /// Block until the current worker exits
    pub fn wait(&mut self) -> Option<RunReport> {
        let handle = self.worker.take()?;
        match handle.join() {
            Ok(report) => Some(report),
            Err(_) => {
                log::error!("Conversion worker panicked");
                self.set_state(RunState::Stopped);
                None
            }
        }
    }
}
