//! Destinations for call logs.

use http::HeaderMap;
use serde_json::Value;
use thiserror::Error;
use tracing::{Level, debug};
use uuid::Uuid;

use crate::classify::ErrorKind;
use crate::types::MethodPath;

/// One observation made by the [`LoggerInterceptor`](super::LoggerInterceptor).
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Correlates the entries of one call. Never sent to the server.
    pub call_id: Uuid,
    pub method: MethodPath,
    pub event: LogEvent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    /// The outgoing request. Only header names are kept, never values.
    Request {
        headers: Vec<String>,
        payload: Payload,
    },
    /// The reply to a unary call.
    Response { payload: Payload },
    /// One streamed message; `index` counts from zero.
    Message { index: usize, payload: Payload },
    /// A stream finished after `messages` messages.
    StreamEnd { messages: usize },
    /// The caller dropped a stream after `messages` messages.
    StreamCancelled { messages: usize },
    /// The call, or a stream item, failed.
    Failed { kind: ErrorKind, message: String },
}

/// A logged message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    /// The call carries secrets.
    Redacted,
}

impl Payload {
    pub(crate) fn capture(message: &Value, sensitive: bool) -> Self {
        if sensitive {
            Payload::Redacted
        } else {
            Payload::Json(message.clone())
        }
    }

    fn render(&self) -> Result<String, SinkError> {
        match self {
            Payload::Json(value) => {
                serde_json::to_string(value).map_err(|e| SinkError::new(e.to_string()))
            }
            Payload::Redacted => Ok("[REDACTED]".to_string()),
        }
    }
}

pub(crate) fn header_names(headers: &HeaderMap) -> Vec<String> {
    headers.keys().map(|name| name.as_str().to_string()).collect()
}

/// A sink failure. The logger swallows these.
#[derive(Debug, Error)]
#[error("log sink failed: {message}")]
pub struct SinkError {
    message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Where the logger writes its entries.
pub trait LogSink: Send + Sync {
    fn record(&self, entry: &LogEntry) -> Result<(), SinkError>;
}

/// Sink emitting every entry as a `tracing` event on target `tether::rpc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, entry: &LogEntry) -> Result<(), SinkError> {
        if !tracing::enabled!(target: "tether::rpc", Level::DEBUG) {
            return Ok(());
        }

        let call_id = entry.call_id;
        let method = &entry.method;

        match &entry.event {
            LogEvent::Request { headers, payload } => {
                let payload = payload.render()?;
                debug!(target: "tether::rpc", %call_id, %method, ?headers, %payload, "request");
            }
            LogEvent::Response { payload } => {
                let payload = payload.render()?;
                debug!(target: "tether::rpc", %call_id, %method, %payload, "response");
            }
            LogEvent::Message { index, payload } => {
                let payload = payload.render()?;
                debug!(target: "tether::rpc", %call_id, %method, index, %payload, "stream message");
            }
            LogEvent::StreamEnd { messages } => {
                debug!(target: "tether::rpc", %call_id, %method, messages, "stream end");
            }
            LogEvent::StreamCancelled { messages } => {
                debug!(target: "tether::rpc", %call_id, %method, messages, "stream cancelled");
            }
            LogEvent::Failed { kind, message } => {
                debug!(target: "tether::rpc", %call_id, %method, %kind, %message, "call failed");
            }
        }

        Ok(())
    }
}
