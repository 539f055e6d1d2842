//! Session lifecycle diagnostics
//!
//! When `debug` is enabled the adapter reports session events to a
//! [`DiagnosticSink`]. Events are advisory only; nothing reads them back.

use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Lifecycle event of the transfer session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Server greeting received on connect
    Greeting(String),
    /// Session closed
    Close {
        /// Whether the session ended because of an error
        had_error: bool,
    },
    /// Session ended from our side
    End,
    /// Session-level error
    Error(String),
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Greeting(greeting) => write!(f, "greeting: {}", greeting),
            SessionEvent::Close { had_error } => write!(f, "close (had_error: {})", had_error),
            SessionEvent::End => write!(f, "end"),
            SessionEvent::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Receiver of session events
pub trait DiagnosticSink: Send + Sync + fmt::Debug {
    /// Observe one event
    fn emit(&self, event: &SessionEvent);
}

/// Sink that forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Error(message) => error!(target: "ferry::session", "{}", message),
            other => info!(target: "ferry::session", "{}", other),
        }
    }
}

/// Optional sink shared by the gate and the facade
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl Diagnostics {
    /// Diagnostics that emit nothing
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Diagnostics routed to `sink` when `enabled`
    pub fn new(enabled: bool, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            sink: enabled.then_some(sink),
        }
    }

    /// Whether events reach a sink
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Report an event if enabled
    pub fn emit(&self, event: SessionEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(&event);
        }
    }
}
