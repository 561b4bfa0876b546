//! Driveup Core - Configuration and port definitions
//!
//! This crate contains the provider-agnostic pieces of driveup:
//! - **Configuration** - typed config loaded from a YAML file
//! - **Port definitions** - the [`ports::IRemoteStore`] trait that the
//!   cloud adapter crate implements and the folder monitor consumes
//!
//! # Architecture
//!
//! Driveup follows a small ports & adapters layout. This crate defines
//! the interfaces; `driveup-drive` implements the remote side against
//! the Google Drive API, and `driveup-monitor` drives the polling loop
//! against the port without knowing which provider sits behind it.

pub mod config;
pub mod ports;
