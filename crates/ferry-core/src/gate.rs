//! Connection gate
//!
//! The gate starts the session as soon as it is opened and publishes a
//! one-shot readiness signal. Any number of operations can wait on it; once
//! the session is ready every wait returns immediately.
//!
//! Readiness never turns into an error on its own. If the connection
//! attempt fails, the failure is reported to diagnostics and waiters keep
//! waiting, unless a connect timeout is configured.

use crate::config::FtpSettings;
use crate::diagnostics::{Diagnostics, SessionEvent};
use crate::runtime::get_runtime;
use crate::transfer::TransferClient;
use crate::{Error, Result};
use std::future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Connecting,
    Ready,
    Failed,
}

/// Owner of the session's readiness signal
#[derive(Debug)]
pub struct ConnectionGate {
    state: watch::Receiver<SessionState>,
    timeout: Option<Duration>,
    connect: JoinHandle<()>,
}

impl ConnectionGate {
    /// Start connecting `client` and return the gate guarding it
    ///
    /// The connection attempt is spawned before this returns; no operation
    /// has to be issued for it to begin.
    pub fn open(
        client: Arc<dyn TransferClient>,
        settings: FtpSettings,
        diagnostics: Diagnostics,
        timeout: Option<Duration>,
    ) -> Self {
        let (tx, rx) = watch::channel(SessionState::Connecting);

        let connect = get_runtime().spawn(async move {
            debug!("Connecting to {}:{}", settings.host, settings.port);
            match client.connect(&settings).await {
                Ok(greeting) => {
                    if let Some(greeting) = greeting {
                        diagnostics.emit(SessionEvent::Greeting(greeting));
                    }
                    debug!("Session to {} ready", settings.host);
                    let _ = tx.send(SessionState::Ready);
                }
                Err(err) => {
                    warn!("Connection to {}:{} failed: {}", settings.host, settings.port, err);
                    diagnostics.emit(SessionEvent::Error(err.to_string()));
                    let _ = tx.send(SessionState::Failed);
                }
            }
        });

        Self {
            state: rx,
            timeout,
            connect,
        }
    }

    /// Wait until the session is ready
    ///
    /// # Errors
    /// Returns [`Error::ConnectionTimeout`] if a timeout is configured and
    /// elapses first. Without a timeout this never fails, and it never
    /// completes if the session cannot be established.
    pub async fn wait_ready(&self) -> Result<()> {
        let mut state = self.state.clone();
        let ready = async move {
            let reached = state.wait_for(|s| *s == SessionState::Ready).await.is_ok();
            // A failed attempt drops the sender; park like a session that never answers.
            if !reached {
                future::pending::<()>().await;
            }
        };

        match self.timeout {
            None => {
                ready.await;
                Ok(())
            }
            Some(limit) => tokio::time::timeout(limit, ready)
                .await
                .map_err(|_| Error::ConnectionTimeout(limit)),
        }
    }

    /// Whether the session has become ready
    pub fn is_ready(&self) -> bool {
        *self.state.borrow() == SessionState::Ready
    }

    /// Whether the connection attempt has failed
    pub fn has_failed(&self) -> bool {
        *self.state.borrow() == SessionState::Failed
    }

    /// Stop a connection attempt that is still running
    pub(crate) fn abort(&self) {
        self.connect.abort();
    }
}

impl Drop for ConnectionGate {
    fn drop(&mut self) {
        self.connect.abort();
    }
}
