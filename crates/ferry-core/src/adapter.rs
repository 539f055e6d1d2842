//! File operation facade
//!
//! [`StorageAdapter`] maps named file operations onto the remote session and
//! renders public locators. Every remote operation first joins the filename
//! onto the configured base path, then waits for the connection gate, and
//! only then calls the client.

use crate::buffer::accumulate;
use crate::config::{AdapterConfig, AdapterOptions};
use crate::diagnostics::{DiagnosticSink, Diagnostics, SessionEvent, TracingSink};
use crate::gate::ConnectionGate;
use crate::locator::file_location;
use crate::path::remote_path;
use crate::transfer::TransferClient;
use crate::Result;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

/// Object storage over a single transfer session
///
/// Constructing an adapter starts connecting right away. Operations may be
/// issued immediately; they wait for the session on their own.
#[derive(Debug)]
pub struct StorageAdapter {
    config: AdapterConfig,
    client: Arc<dyn TransferClient>,
    gate: ConnectionGate,
    diagnostics: Diagnostics,
}

impl StorageAdapter {
    /// Resolve `options` and start connecting `client`
    ///
    /// # Errors
    /// Returns [`Error::MissingOption`](crate::Error::MissingOption) if
    /// `ftp.host` or `http.host` is absent; no connection is attempted then.
    pub fn new(options: AdapterOptions, client: Arc<dyn TransferClient>) -> Result<Self> {
        let config = AdapterConfig::from_options(options)?;
        Ok(Self::with_config(config, client))
    }

    /// Start connecting `client` with an already resolved configuration
    ///
    /// Diagnostics, when enabled, go to [`TracingSink`].
    pub fn with_config(config: AdapterConfig, client: Arc<dyn TransferClient>) -> Self {
        Self::with_sink(config, client, Arc::new(TracingSink))
    }

    /// Like [`StorageAdapter::with_config`], reporting diagnostics to `sink`
    pub fn with_sink(
        config: AdapterConfig,
        client: Arc<dyn TransferClient>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let diagnostics = Diagnostics::new(config.debug, sink);
        let gate = ConnectionGate::open(
            client.clone(),
            config.ftp.clone(),
            diagnostics.clone(),
            config.connect_timeout(),
        );

        Self {
            config,
            client,
            gate,
            diagnostics,
        }
    }

    /// The resolved configuration
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Wait until the session is ready
    pub async fn wait_ready(&self) -> Result<()> {
        self.gate.wait_ready().await
    }

    /// Store `data` as the full contents of `filename`
    ///
    /// Existing contents are replaced, not appended to. Text is stored as its
    /// UTF-8 bytes; borrowed data is copied before the upload.
    ///
    /// # Errors
    /// Returns [`Error::Transfer`](crate::Error::Transfer) if the upload fails
    pub async fn create_file(&self, filename: &str, data: impl AsRef<[u8]>) -> Result<()> {
        let data = Bytes::copy_from_slice(data.as_ref());
        let path = remote_path(&self.config.ftp.path, filename)?;
        self.gate.wait_ready().await?;

        debug!("Uploading {} bytes to {}", data.len(), path);
        self.client.put(data, &path).await?;
        Ok(())
    }

    /// Download the full contents of `filename`
    ///
    /// # Errors
    /// Returns [`Error::Transfer`](crate::Error::Transfer) if the download
    /// cannot be started or fails part way; partial data is never returned.
    pub async fn get_file_data(&self, filename: &str) -> Result<Bytes> {
        let path = remote_path(&self.config.ftp.path, filename)?;
        self.gate.wait_ready().await?;

        debug!("Downloading {}", path);
        let stream = self.client.get(&path).await?;
        let data = accumulate(stream).await?;
        debug!("Downloaded {} bytes from {}", data.len(), path);
        Ok(data)
    }

    /// Delete `filename`
    ///
    /// # Errors
    /// Returns [`Error::Transfer`](crate::Error::Transfer) if the file does
    /// not exist or cannot be removed
    pub async fn delete_file(&self, filename: &str) -> Result<()> {
        let path = remote_path(&self.config.ftp.path, filename)?;
        self.gate.wait_ready().await?;

        debug!("Deleting {}", path);
        self.client.delete(&path).await?;
        Ok(())
    }

    /// Public URL of `filename`
    ///
    /// Pure: does not wait for or touch the session.
    pub fn get_file_location(&self, filename: &str) -> String {
        file_location(&self.config.http, filename)
    }

    /// End the session
    ///
    /// A connection attempt that has not finished yet is abandoned. If the
    /// attempt already failed, the close is reported with `had_error` set.
    pub async fn close(&self) -> Result<()> {
        if !self.gate.is_ready() {
            self.gate.abort();
            self.diagnostics.emit(SessionEvent::Close {
                had_error: self.gate.has_failed(),
            });
            return Ok(());
        }

        let ended = self.client.end().await;
        if let Err(err) = &ended {
            warn!("Failed to end session cleanly: {}", err);
            self.diagnostics.emit(SessionEvent::Error(err.to_string()));
        }
        self.diagnostics.emit(SessionEvent::End);
        self.diagnostics.emit(SessionEvent::Close {
            had_error: ended.is_err(),
        });

        ended.map_err(Into::into)
    }
}
