//! Progress and log events sent from the worker to the interactive surface
//!
//! The worker never touches UI state directly; everything it has to say goes
//! through this ordered channel.

use std::sync::mpsc;

use log::Level;

use super::pipeline::RunReport;
use crate::core::RunSummary;

/// Log target for run lines; the terminal shows these from the event stream
pub const RUN_LOG_TARGET: &str = "conversion_run";

/// Events emitted by the conversion worker
#[derive(Debug, Clone)]
pub enum ConversionEvent {
    /// Human-readable log line
    Log { level: Level, message: String },
    /// Completion after each file
    Progress {
        completed: usize,
        total: usize,
        percent: f64,
    },
    /// The run left the Running state; always the last event of a run
    Finished(RunReport),
}

/// Worker-side sender that mirrors every line into the `log` facade
#[derive(Debug, Clone)]
pub struct Reporter {
    tx: mpsc::Sender<ConversionEvent>,
}

impl Reporter {
    pub fn new(tx: mpsc::Sender<ConversionEvent>) -> Self {
        Self { tx }
    }

    /// Reporter plus the receiving end, for callers that drain events
    pub fn channel() -> (Self, mpsc::Receiver<ConversionEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.line(Level::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.line(Level::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.line(Level::Error, message.into());
    }

    fn line(&self, level: Level, message: String) {
        log::log!(target: RUN_LOG_TARGET, level, "{}", message);
        // Receiver gone means nobody is watching; the run still finishes.
        let _ = self.tx.send(ConversionEvent::Log { level, message });
    }

    pub fn progress(&self, summary: &RunSummary) {
        let _ = self.tx.send(ConversionEvent::Progress {
            completed: summary.processed(),
            total: summary.total,
            percent: summary.percent(),
        });
    }

    pub fn finished(&self, report: RunReport) {
        let _ = self.tx.send(ConversionEvent::Finished(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaskOutcome;

    #[test]
    fn test_lines_arrive_in_order() {
        let (reporter, rx) = Reporter::channel();
        reporter.info("first");
        reporter.warn("second");
        reporter.error("third");
        drop(reporter);

        let lines: Vec<(Level, String)> = rx
            .iter()
            .filter_map(|e| match e {
                ConversionEvent::Log { level, message } => Some((level, message)),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                (Level::Info, "first".to_string()),
                (Level::Warn, "second".to_string()),
                (Level::Error, "third".to_string()),
            ]
        );
    }

    #[test]
    fn test_progress_event() {
        let (reporter, rx) = Reporter::channel();
        let mut summary = RunSummary::with_total(4);
        summary.record(&TaskOutcome::Succeeded);
        reporter.progress(&summary);

        match rx.recv().unwrap() {
            ConversionEvent::Progress {
                completed,
                total,
                percent,
            } => {
                assert_eq!((completed, total), (1, 4));
                assert_eq!(percent, 25.0);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_send_after_receiver_dropped_is_harmless() {
        let (reporter, rx) = Reporter::channel();
        drop(rx);
        reporter.info("nobody listening");
    }
}
