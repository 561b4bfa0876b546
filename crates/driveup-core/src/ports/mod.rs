//! Port definitions (ports & adapters interfaces)
//!
//! Ports are the trait boundaries the core depends on, implemented by
//! adapter crates.
//!
//! - [`IRemoteStore`] - Remote storage operations (Google Drive today)

pub mod remote_store;

pub use remote_store::{IRemoteStore, RemoteItem, Tokens, UploadedFile};
