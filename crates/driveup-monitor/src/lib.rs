//! Driveup Monitor - polling folder monitor
//!
//! Watches a local folder by periodically snapshotting its directory
//! listing and uploads every newly appeared file through the
//! [`IRemoteStore`](driveup_core::ports::IRemoteStore) port.
//!
//! ## Modules
//!
//! - [`monitor`] - The [`FolderMonitor`](monitor::FolderMonitor) polling loop
//! - [`snapshot`] - Directory listing and set-difference helpers
//! - [`events`] - Status events emitted back to the caller

pub mod events;
pub mod monitor;
pub mod snapshot;

pub use events::MonitorEvent;
pub use monitor::FolderMonitor;
