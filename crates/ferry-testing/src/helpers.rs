//! Helper utilities for ferry testing

use async_trait::async_trait;
use bytes::Bytes;
use ferry_core::{
    ByteStream, DiagnosticSink, FtpSettings, MemoryTransfer, SessionEvent, TransferClient,
    TransferError,
};
use futures_util::{stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once per process
///
/// The filter comes from `RUST_LOG` and defaults to `warn`.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// Diagnostic sink that keeps every event it sees
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingSink {
    /// Creates an empty sink
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Events seen so far, in order
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// A call received by [`ScriptedTransfer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `connect` was entered
    Connect,
    /// `put` for a path
    Put(String),
    /// `get` for a path
    Get(String),
    /// `delete` for a path
    Delete(String),
    /// `end`
    End,
}

/// Transfer client with scriptable connect and stream behaviour
///
/// Storage is delegated to a [`MemoryTransfer`]; on top of that the script
/// can hold the connection until released, refuse it, cut downloads short
/// with a stream error, or slow uploads down. Every call is recorded.
#[derive(Debug, Clone)]
pub struct ScriptedTransfer {
    inner: MemoryTransfer,
    released: Arc<watch::Sender<bool>>,
    refuse_connect: Arc<AtomicBool>,
    stream_error_after: Arc<Mutex<Option<usize>>>,
    put_delay: Arc<Mutex<Option<Duration>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedTransfer {
    /// Client that connects as soon as asked
    pub fn new() -> Self {
        Self::with_inner(MemoryTransfer::new(), true)
    }

    /// Client whose connect blocks until [`ScriptedTransfer::release`]
    pub fn held() -> Self {
        Self::with_inner(MemoryTransfer::new(), false)
    }

    /// Client whose connect always fails
    pub fn refusing() -> Self {
        let client = Self::new();
        client.refuse_connect.store(true, Ordering::SeqCst);
        client
    }

    /// Wrap an existing in-memory store
    pub fn with_inner(inner: MemoryTransfer, released: bool) -> Self {
        let (tx, _) = watch::channel(released);
        Self {
            inner,
            released: Arc::new(tx),
            refuse_connect: Arc::new(AtomicBool::new(false)),
            stream_error_after: Arc::new(Mutex::new(None)),
            put_delay: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Let a held connect complete
    pub fn release(&self) {
        self.released.send_replace(true);
    }

    /// Fail every download with a stream error after `chunks` chunks
    pub fn fail_stream_after(&self, chunks: usize) {
        *self.stream_error_after.lock().unwrap() = Some(chunks);
    }

    /// Sleep before every upload
    pub fn delay_puts(&self, delay: Duration) {
        *self.put_delay.lock().unwrap() = Some(delay);
    }

    /// The backing store
    pub fn store(&self) -> &MemoryTransfer {
        &self.inner
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than `connect`
    pub fn operation_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| *call != Call::Connect)
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for ScriptedTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferClient for ScriptedTransfer {
    async fn connect(&self, settings: &FtpSettings) -> Result<Option<String>, TransferError> {
        self.record(Call::Connect);

        let mut released = self.released.subscribe();
        let _ = released.wait_for(|released| *released).await;

        if self.refuse_connect.load(Ordering::SeqCst) {
            return Err(TransferError::Connection(format!(
                "connection to {}:{} refused",
                settings.host, settings.port
            )));
        }
        self.inner.connect(settings).await
    }

    async fn put(&self, data: Bytes, path: &str) -> Result<(), TransferError> {
        self.record(Call::Put(path.to_string()));

        let delay = *self.put_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.put(data, path).await
    }

    async fn get(&self, path: &str) -> Result<ByteStream, TransferError> {
        self.record(Call::Get(path.to_string()));

        let stream = self.inner.get(path).await?;
        let cut = *self.stream_error_after.lock().unwrap();
        match cut {
            Some(chunks) => {
                let error = stream::once(async {
                    Err(TransferError::Stream("connection reset by peer".to_string()))
                });
                Ok(stream.take(chunks).chain(error).boxed())
            }
            None => Ok(stream),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), TransferError> {
        self.record(Call::Delete(path.to_string()));
        self.inner.delete(path).await
    }

    async fn end(&self) -> Result<(), TransferError> {
        self.record(Call::End);
        self.inner.end().await
    }
}
