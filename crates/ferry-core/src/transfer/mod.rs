//! Transfer-protocol client boundary
//!
//! The adapter never speaks the wire protocol itself. It drives a
//! [`TransferClient`], which provides connect, store, retrieve and delete by
//! path. Implementations include the FTP client in `ferry-ftp` (production)
//! and [`memory::MemoryTransfer`] (in-process).

use crate::config::FtpSettings;
use crate::TransferError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::fmt;

pub mod memory;

/// Finite, non-restartable stream of downloaded chunks
pub type ByteStream = BoxStream<'static, Result<Bytes, TransferError>>;

/// Client for a single transfer session
///
/// Implementations must be thread-safe: many adapter operations may be in
/// flight at once and all of them go through the same client. A client that
/// cannot pipeline commands must serialise them internally.
#[async_trait]
pub trait TransferClient: Send + Sync + fmt::Debug {
    /// Establish the session
    ///
    /// Returns the server greeting, if the protocol has one.
    ///
    /// # Errors
    ///
    /// Returns error if the server is unreachable or rejects the login
    async fn connect(&self, settings: &FtpSettings) -> Result<Option<String>, TransferError>;

    /// Store `data` as the full contents of `path`, replacing what was there
    async fn put(&self, data: Bytes, path: &str) -> Result<(), TransferError>;

    /// Open a download of `path`
    ///
    /// # Errors
    ///
    /// Returns error if the download cannot be started, e.g. the file does
    /// not exist. Failures after that are reported through the stream.
    async fn get(&self, path: &str) -> Result<ByteStream, TransferError>;

    /// Delete `path`
    ///
    /// # Errors
    ///
    /// Returns error if the file does not exist or cannot be removed
    async fn delete(&self, path: &str) -> Result<(), TransferError>;

    /// End the session
    async fn end(&self) -> Result<(), TransferError>;
}
