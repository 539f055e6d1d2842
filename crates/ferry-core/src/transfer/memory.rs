//! In-process transfer client

use super::{ByteStream, TransferClient};
use crate::config::FtpSettings;
use crate::TransferError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Transfer client that keeps files in memory
///
/// Clones share the same files, so one instance can be handed to an adapter
/// while another inspects what was stored. Calls made before `connect` fail
/// the way a real client without a session would.
#[derive(Debug, Clone)]
pub struct MemoryTransfer {
    files: Arc<Mutex<HashMap<String, Bytes>>>,
    connected: Arc<AtomicBool>,
    chunk_size: usize,
    greeting: Option<String>,
}

impl Default for MemoryTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransfer {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            connected: Arc::new(AtomicBool::new(false)),
            chunk_size: DEFAULT_CHUNK_SIZE,
            greeting: Some("220 ferry in-memory transfer ready".to_string()),
        }
    }

    /// Split downloads into chunks of at most `chunk_size` bytes
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Greeting returned from `connect`
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    /// Contents of `path`, if stored
    pub fn file(&self, path: &str) -> Option<Bytes> {
        self.files().get(path).cloned()
    }

    /// Seed `path` directly, bypassing the session
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.files().insert(path.into(), data.into());
    }

    /// Stored paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Whether a session is open
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn files(&self) -> MutexGuard<'_, HashMap<String, Bytes>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_connected(&self) -> Result<(), TransferError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(TransferError::Connection("session not established".to_string()))
        }
    }
}

#[async_trait]
impl TransferClient for MemoryTransfer {
    async fn connect(&self, settings: &FtpSettings) -> Result<Option<String>, TransferError> {
        debug!("Opening in-memory session for {}:{}", settings.host, settings.port);
        self.connected.store(true, Ordering::SeqCst);
        Ok(self.greeting.clone())
    }

    async fn put(&self, data: Bytes, path: &str) -> Result<(), TransferError> {
        self.ensure_connected()?;
        self.files().insert(path.to_string(), data);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<ByteStream, TransferError> {
        self.ensure_connected()?;
        let data = self
            .file(path)
            .ok_or_else(|| TransferError::NotFound(path.to_string()))?;

        let chunks: Vec<Result<Bytes, TransferError>> = (0..data.len())
            .step_by(self.chunk_size)
            .map(|start| Ok(data.slice(start..(start + self.chunk_size).min(data.len()))))
            .collect();

        Ok(stream::iter(chunks).boxed())
    }

    async fn delete(&self, path: &str) -> Result<(), TransferError> {
        self.ensure_connected()?;
        self.files()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| TransferError::NotFound(path.to_string()))
    }

    async fn end(&self) -> Result<(), TransferError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}
