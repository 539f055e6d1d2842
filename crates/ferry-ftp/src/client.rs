//! FtpClient - `TransferClient` over a blocking FTP session

use async_trait::async_trait;
use bytes::Bytes;
use ferry_core::{ByteStream, FtpSettings, TransferClient, TransferError};
use futures_util::{stream, StreamExt};
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinError;
use tracing::{debug, trace, warn};

/// Default size of download chunks (64KB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Chunks buffered between the blocking reader and the consumer
const STREAM_BACKLOG: usize = 4;

type Session = Arc<Mutex<Option<FtpStream>>>;

/// Transfer client speaking FTP through `suppaftp`
///
/// The control connection carries one command at a time, so every call
/// takes the session lock for its whole duration, downloads included.
pub struct FtpClient {
    session: Session,
    chunk_size: usize,
}

impl FtpClient {
    /// Create a client with no session yet
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create a client that reads downloads in chunks of `chunk_size` bytes
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            session: Arc::new(Mutex::new(None)),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Whether a session is open
    pub fn is_connected(&self) -> bool {
        lock(&self.session).is_some()
    }

    /// Run `op` against the session slot on the blocking pool
    async fn with_session<T, F>(&self, op: F) -> Result<T, TransferError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Option<FtpStream>) -> Result<T, TransferError> + Send + 'static,
    {
        let session = self.session.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&session);
            op(&mut guard)
        })
        .await
        .map_err(join_error)?
    }
}

impl Default for FtpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FtpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpClient")
            .field("connected", &self.is_connected())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

#[async_trait]
impl TransferClient for FtpClient {
    async fn connect(&self, settings: &FtpSettings) -> Result<Option<String>, TransferError> {
        let settings = settings.clone();
        let session = self.session.clone();

        tokio::task::spawn_blocking(move || {
            debug!("Opening FTP session to {}:{}", settings.host, settings.port);
            let mut ftp =
                FtpStream::connect((settings.host.as_str(), settings.port)).map_err(ftp_error)?;
            ftp.login(settings.user.as_str(), settings.password.as_str())
                .map_err(ftp_error)?;
            ftp.transfer_type(FileType::Binary).map_err(ftp_error)?;

            let greeting = ftp.get_welcome_msg().map(str::to_string);
            *lock(&session) = Some(ftp);
            Ok(greeting)
        })
        .await
        .map_err(join_error)?
    }

    async fn put(&self, data: Bytes, path: &str) -> Result<(), TransferError> {
        let path = path.to_string();
        self.with_session(move |session| {
            let ftp = session.as_mut().ok_or_else(not_connected)?;
            let size = data.len();
            let mut reader = Cursor::new(data);
            match ftp.put_file(&path, &mut reader) {
                Ok(_) => {
                    debug!("Stored {} bytes at {}", size, path);
                    Ok(())
                }
                Err(err) => Err(command_error(session, err)),
            }
        })
        .await
    }

    async fn get(&self, path: &str) -> Result<ByteStream, TransferError> {
        let path = path.to_string();
        let session = self.session.clone();
        let chunk_size = self.chunk_size;
        let (opened_tx, opened_rx) = oneshot::channel();
        let (chunk_tx, chunk_rx) = mpsc::channel(STREAM_BACKLOG);

        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&session);
            let ftp = match guard.as_mut() {
                Some(ftp) => ftp,
                None => {
                    let _ = opened_tx.send(Err(not_connected()));
                    return;
                }
            };

            let mut data = match ftp.retr_as_stream(&path) {
                Ok(data) => data,
                Err(err) => {
                    let _ = opened_tx.send(Err(lookup_error(&mut guard, err, &path)));
                    return;
                }
            };
            let _ = opened_tx.send(Ok(()));

            let mut buf = vec![0u8; chunk_size];
            loop {
                match data.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        trace!("Read {} bytes from {}", n, path);
                        let chunk = Bytes::copy_from_slice(&buf[..n]);
                        if chunk_tx.blocking_send(Ok(chunk)).is_err() {
                            debug!("Download of {} dropped by reader", path);
                            break;
                        }
                    }
                    Err(err) => {
                        let _ = chunk_tx.blocking_send(Err(TransferError::Stream(err.to_string())));
                        break;
                    }
                }
            }

            if let Err(err) = ftp.finalize_retr_stream(data) {
                warn!("Failed to finalize download of {}: {}", path, err);
                let _ = chunk_tx.blocking_send(Err(command_error(&mut guard, err)));
            }
        });

        opened_rx
            .await
            .map_err(|_| TransferError::Connection("download task ended unexpectedly".to_string()))??;

        let chunks = stream::unfold(chunk_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(chunks.boxed())
    }

    async fn delete(&self, path: &str) -> Result<(), TransferError> {
        let path = path.to_string();
        self.with_session(move |session| {
            let ftp = session.as_mut().ok_or_else(not_connected)?;
            match ftp.rm(&path) {
                Ok(()) => Ok(()),
                Err(err) => Err(lookup_error(session, err, &path)),
            }
        })
        .await
    }

    async fn end(&self) -> Result<(), TransferError> {
        let session = self.session.clone();
        tokio::task::spawn_blocking(move || {
            let ftp = lock(&session).take();
            match ftp {
                Some(mut ftp) => ftp.quit().map_err(ftp_error),
                None => Ok(()),
            }
        })
        .await
        .map_err(join_error)?
    }
}

fn lock(session: &Session) -> MutexGuard<'_, Option<FtpStream>> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn not_connected() -> TransferError {
    TransferError::Connection("FTP session not established".to_string())
}

fn ftp_error(err: FtpError) -> TransferError {
    TransferError::client(err)
}

/// Map a failed command on an open session
///
/// A broken data or control connection leaves a reply unread on the control
/// channel, so the session is dropped rather than reused out of step.
fn command_error(session: &mut Option<FtpStream>, err: FtpError) -> TransferError {
    if let FtpError::ConnectionError(_) = &err {
        warn!("Dropping FTP session after connection error: {}", err);
        session.take();
    }
    ftp_error(err)
}

/// Like [`command_error`], reporting a `550` reply as a missing file
fn lookup_error(session: &mut Option<FtpStream>, err: FtpError, path: &str) -> TransferError {
    match &err {
        FtpError::UnexpectedResponse(response)
            if matches!(response.status, Status::FileUnavailable) =>
        {
            debug!("Server reports {} unavailable: {}", path, err);
            TransferError::NotFound(path.to_string())
        }
        _ => command_error(session, err),
    }
}

fn join_error(err: JoinError) -> TransferError {
    TransferError::Io(err.into())
}
