//! Status events emitted by the folder monitor
//!
//! The monitor runs on its own task; instead of calling back into the
//! caller's thread it sends [`MonitorEvent`] values over an unbounded
//! channel. The presentation layer (CLI, a future UI) subscribes to the
//! receiver and renders events however it likes, fully decoupled from
//! the monitor's execution context.

use tokio::sync::mpsc;

/// A status message from the monitoring loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Monitoring has started; the baseline snapshot has been taken
    Started,
    /// A file appeared that was not in the previous snapshot
    NewFile {
        /// File name within the monitored folder
        name: String,
    },
    /// A new file was uploaded successfully
    Uploaded {
        /// File name within the monitored folder
        name: String,
        /// Remote identifier of the created file
        id: String,
    },
    /// A new file was skipped by upload validation (missing or
    /// extension outside the allow-list)
    Skipped {
        /// File name within the monitored folder
        name: String,
    },
    /// Uploading a new file failed; the file will not be retried
    UploadFailed {
        /// File name within the monitored folder
        name: String,
        /// Rendered error chain
        error: String,
    },
    /// A whole poll cycle failed (e.g., the folder became unreadable);
    /// the monitor pauses for its error cooldown and tries again
    CycleError {
        /// Rendered error chain
        error: String,
    },
    /// Monitoring stopped after the cancellation signal was observed
    Stopped,
}

/// Sender half for monitor status events
pub type EventSender = mpsc::UnboundedSender<MonitorEvent>;

/// Receiver half for monitor status events
pub type EventReceiver = mpsc::UnboundedReceiver<MonitorEvent>;

/// Creates the status event channel
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
