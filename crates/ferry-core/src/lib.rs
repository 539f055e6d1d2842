//! # ferry-core
//!
//! Object storage semantics (put/get/delete by name) over a single
//! file-transfer session, plus locator URLs for stored files under a
//! separate public HTTP address.
//!
//! ## Architecture
//!
//! The main abstractions are:
//! - [`ConnectionGate`]: owns the one outbound session of an adapter and
//!   exposes a one-shot readiness signal every operation waits on
//! - [`StorageAdapter`]: the file operation facade (`create_file`,
//!   `get_file_data`, `delete_file`, `get_file_location`)
//! - [`TransferClient`]: the boundary to the actual transfer-protocol
//!   client; [`MemoryTransfer`] is an in-process implementation
//!
//! The connection attempt runs on an internal Tokio runtime, so an adapter
//! can be constructed from synchronous code and starts connecting at once.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod adapter;
mod buffer;
pub mod config;
pub mod diagnostics;
mod error;
pub mod gate;
pub mod locator;
pub mod path;
mod runtime;
pub mod transfer;

pub use adapter::StorageAdapter;
pub use buffer::accumulate;
pub use config::{AdapterConfig, AdapterOptions, FtpSettings, HttpSettings};
pub use diagnostics::{DiagnosticSink, Diagnostics, SessionEvent, TracingSink};
pub use error::{Error, Result, TransferError};
pub use gate::ConnectionGate;
pub use transfer::{memory::MemoryTransfer, ByteStream, TransferClient};
