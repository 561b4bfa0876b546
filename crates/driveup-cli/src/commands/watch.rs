//! Watch command - monitors a local folder and uploads new files
//!
//! Authenticates, wraps the Drive client in the refreshing store so
//! long sessions survive access-token expiry, and runs the
//! [`FolderMonitor`] on a background task while the foreground prints
//! status events. Ctrl-C triggers the cancellation token; the event
//! drain watches that token too, so a monitor stuck in its error
//! cooldown cannot keep the drain alive. The monitor task is then
//! joined with a bounded wait and aborted on timeout.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use driveup_core::config::Config;
use driveup_drive::provider::RefreshingDriveStore;
use driveup_monitor::events::{self, EventReceiver};
use driveup_monitor::{FolderMonitor, MonitorEvent};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::authenticator;

/// Upper bound on waiting for the monitor task after cancellation.
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Local folder to monitor for new files
    folder: PathBuf,

    /// Drive folder id receiving the uploads
    #[arg(long = "folder-id")]
    folder_id: String,

    /// Override the configured poll interval (seconds)
    #[arg(long)]
    interval: Option<u64>,

    /// Path to the OAuth client secrets JSON file
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Path for the reusable token cache
    #[arg(long)]
    token_cache: Option<PathBuf>,
}

impl WatchCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let auth = authenticator(config, self.secrets.as_ref(), self.token_cache.as_ref());
        let tokens = auth.authenticate().await.context("Authentication failed")?;

        let store = Arc::new(RefreshingDriveStore::new(
            auth,
            tokens,
            config.monitor.file_types_to_monitor.clone(),
        ));

        let poll_interval = self
            .interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.monitor.poll_interval());

        let (tx, mut rx) = events::channel();
        let monitor =
            FolderMonitor::new(store, &self.folder, self.folder_id.clone(), poll_interval)
                .with_events(tx);

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let mut handle = tokio::spawn(async move { monitor.run(token).await });

        // Ctrl-C requests cooperative cancellation; the monitor observes
        // it at its next wait checkpoint.
        let ctrl = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\nStopping...");
                ctrl.cancel();
            }
        });

        // The drain watches the token as well: a monitor stuck in its
        // error cooldown never drops the sender, and the stop request
        // must not wait on it.
        let print = |event: &MonitorEvent| self.print_event(event, poll_interval);
        drain_until_cancelled(&mut rx, &cancel, &print).await;

        let result = join_with_timeout(&mut handle, JOIN_TIMEOUT).await;

        // Deliver whatever the monitor managed to send before stopping
        while let Ok(event) = rx.try_recv() {
            print(&event);
        }
        result
    }

    fn print_event(&self, event: &MonitorEvent, poll_interval: Duration) {
        match event {
            MonitorEvent::Started => {
                println!(
                    "Watching {} (interval {}s). Press Ctrl-C to stop.",
                    self.folder.display(),
                    poll_interval.as_secs()
                );
            }
            MonitorEvent::NewFile { name } => println!("New file detected: {name}"),
            MonitorEvent::Uploaded { name, id } => println!("Uploaded {name} (id: {id})"),
            MonitorEvent::Skipped { name } => println!("Skipped {name} (not monitored)"),
            MonitorEvent::UploadFailed { name, error } => {
                println!("Upload failed for {name}: {error}")
            }
            MonitorEvent::CycleError { error } => {
                println!("Monitoring error (will retry): {error}")
            }
            MonitorEvent::Stopped => println!("Monitoring stopped."),
        }
    }
}

/// Prints events until the monitor drops its sender or cancellation fires
async fn drain_until_cancelled(
    rx: &mut EventReceiver,
    cancel: &CancellationToken,
    print: &impl Fn(&MonitorEvent),
) {
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => print(&event),
                None => break,
            },
            _ = cancel.cancelled() => break,
        }
    }
}

/// Joins the monitor task within `wait`, aborting it on timeout so a
/// loop that never reaches its cancellation checkpoint cannot hang
/// shutdown.
async fn join_with_timeout(handle: &mut JoinHandle<Result<()>>, wait: Duration) -> Result<()> {
    match tokio::time::timeout(wait, &mut *handle).await {
        Ok(joined) => joined.context("Monitor task panicked")?,
        Err(_) => {
            warn!("Monitor task did not stop within {wait:?}, aborting it");
            handle.abort();
            Ok(())
        }
    }
}
