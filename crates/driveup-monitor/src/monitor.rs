//! Folder monitor - polls a local folder and uploads new files
//!
//! The [`FolderMonitor`] owns the long-lived polling loop:
//!
//! ```text
//! baseline snapshot
//!   └─► loop: snapshot ─► diff ─► upload each new file ─► replace known
//!             └─► wait(poll_interval) or exit on cancellation
//! ```
//!
//! Files already present when monitoring starts form the baseline and
//! are never uploaded. A failure uploading one file neither aborts the
//! cycle nor the loop; the name is still folded into the known set and
//! is not retried in later cycles. Cycle-level errors (for example the
//! folder being deleted) trigger a fixed cooldown and a fresh attempt
//! rather than loop termination.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use driveup_core::ports::IRemoteStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::{EventSender, MonitorEvent};
use crate::snapshot;

/// Pause after a failed poll cycle before trying again.
///
/// Deliberately longer than typical poll intervals, and deliberately a
/// plain sleep: cancellation is not observed during the cooldown, only
/// at the regular wait checkpoint. Callers that need hard cancellation
/// bound their join with a timeout.
const ERROR_COOLDOWN: Duration = Duration::from_secs(5);

/// Polls a local folder and uploads newly appeared files
///
/// Generic over the remote store port so tests (and future providers)
/// can substitute the upload target. Intended to run on its own task via
/// [`run`](FolderMonitor::run) so the caller stays responsive; the only
/// supported way to stop it is cancelling the token passed to `run`.
pub struct FolderMonitor<S> {
    /// Upload target
    store: Arc<S>,
    /// Local folder being monitored
    folder_path: PathBuf,
    /// Remote folder receiving the uploads
    target_folder_id: String,
    /// Pause between poll cycles
    poll_interval: Duration,
    /// Optional status event sink
    events: Option<EventSender>,
}

impl<S: IRemoteStore> FolderMonitor<S> {
    /// Creates a new monitor
    ///
    /// # Arguments
    /// * `store` - Remote store the new files are uploaded to
    /// * `folder_path` - Local folder to watch
    /// * `target_folder_id` - Remote folder id receiving uploads
    /// * `poll_interval` - Pause between directory polls
    pub fn new(
        store: Arc<S>,
        folder_path: impl Into<PathBuf>,
        target_folder_id: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            folder_path: folder_path.into(),
            target_folder_id: target_folder_id.into(),
            poll_interval,
            events: None,
        }
    }

    /// Attaches a status event sender
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Sends a status event; a dropped receiver never stops the loop
    fn emit(&self, event: MonitorEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// Runs the monitoring loop until `cancel` is triggered
    ///
    /// Takes the baseline snapshot first: files present at start-up are
    /// never uploaded. A baseline read failure is the only error this
    /// method returns; once the loop is running, all errors are
    /// contained per-file or per-cycle.
    pub async fn run(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let mut known = snapshot::read_names(&self.folder_path).await.with_context(|| {
            format!(
                "Failed to take baseline listing of {}",
                self.folder_path.display()
            )
        })?;

        info!(
            folder = %self.folder_path.display(),
            target = %self.target_folder_id,
            interval_s = self.poll_interval.as_secs_f64(),
            "Starting folder monitoring"
        );
        self.emit(MonitorEvent::Started);

        loop {
            if let Err(e) = self.cycle(&mut known).await {
                warn!("Error while monitoring the folder: {e:#}");
                self.emit(MonitorEvent::CycleError {
                    error: format!("{e:#}"),
                });
                tokio::time::sleep(ERROR_COOLDOWN).await;
                continue;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Stopping folder monitoring");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        self.emit(MonitorEvent::Stopped);
        info!("Folder monitoring stopped");
        Ok(())
    }

    /// One poll cycle: snapshot, diff, dispatch uploads, replace snapshot
    ///
    /// The known set is replaced wholesale regardless of upload outcomes,
    /// so a file whose upload failed is not attempted again.
    async fn cycle(&self, known: &mut HashSet<String>) -> anyhow::Result<()> {
        let current = snapshot::read_names(&self.folder_path)
            .await
            .with_context(|| format!("Failed to list {}", self.folder_path.display()))?;

        for name in snapshot::new_entries(&current, known) {
            let file_path = self.folder_path.join(&name);
            info!("Detected new file: {name}. Attempting upload");
            self.emit(MonitorEvent::NewFile { name: name.clone() });

            match self
                .store
                .upload_file(&self.target_folder_id, &file_path)
                .await
            {
                Ok(Some(uploaded)) => {
                    info!("File {name} uploaded successfully");
                    self.emit(MonitorEvent::Uploaded {
                        name,
                        id: uploaded.id,
                    });
                }
                Ok(None) => {
                    debug!("File {name} skipped by upload validation");
                    self.emit(MonitorEvent::Skipped { name });
                }
                Err(e) => {
                    warn!("Failed to upload {name}: {e:#}");
                    self.emit(MonitorEvent::UploadFailed {
                        name,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        *known = current;
        Ok(())
    }
}
