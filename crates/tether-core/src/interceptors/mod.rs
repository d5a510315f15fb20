//! Interceptors installed by the dial protocol.
//!
//! - [`AuthInterceptor`] stamps `Authorization: Bearer <token>` on every call.
//! - [`LoggerInterceptor`] records requests, replies and streamed messages to
//!   a [`LogSink`] without altering them.

mod auth;
mod logger;
mod sink;

pub use auth::AuthInterceptor;
pub use logger::LoggerInterceptor;
pub use sink::{LogEntry, LogEvent, LogSink, Payload, SinkError, TracingSink};
