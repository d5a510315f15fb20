//! Request and reply types that flow through interceptors and channels.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use http::HeaderMap;
use serde_json::Value;

use crate::Result;
use crate::types::MethodPath;

/// A boxed stream of JSON messages.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Value>> + Send>>;

/// The shape of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Single request, single response.
    Unary,
    /// Single request, sequence of responses.
    ServerStream,
}

/// An outgoing call.
#[derive(Debug, Clone)]
pub struct Request {
    method: MethodPath,
    kind: CallKind,
    headers: HeaderMap,
    message: Value,
    sensitive: bool,
}

impl Request {
    /// Create a unary request.
    pub fn unary(method: MethodPath, message: Value) -> Self {
        Self::new(method, CallKind::Unary, message)
    }

    /// Create a server-streaming request.
    pub fn server_stream(method: MethodPath, message: Value) -> Self {
        Self::new(method, CallKind::ServerStream, message)
    }

    fn new(method: MethodPath, kind: CallKind, message: Value) -> Self {
        Self {
            method,
            kind,
            headers: HeaderMap::new(),
            message,
            sensitive: false,
        }
    }

    /// Mark the request and its reply as carrying secrets.
    ///
    /// Loggers record the payloads of sensitive calls as redacted.
    pub fn into_sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn method(&self) -> &MethodPath {
        &self.method
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn message(&self) -> &Value {
        &self.message
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }
}

/// The reply to a unary call.
#[derive(Debug, Clone)]
pub struct Response {
    headers: HeaderMap,
    message: Value,
}

impl Response {
    pub fn new(headers: HeaderMap, message: Value) -> Self {
        Self { headers, message }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn message(&self) -> &Value {
        &self.message
    }

    pub fn into_message(self) -> Value {
        self.message
    }
}

/// The reply to a server-streaming call.
///
/// Dropping the reply, or its message stream, cancels the call.
pub struct StreamResponse {
    headers: HeaderMap,
    messages: MessageStream,
}

impl StreamResponse {
    pub fn new<S>(headers: HeaderMap, messages: S) -> Self
    where
        S: Stream<Item = Result<Value>> + Send + 'static,
    {
        Self {
            headers,
            messages: Box::pin(messages),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Replace the message stream, keeping the headers.
    pub fn map_messages<F>(self, f: F) -> Self
    where
        F: FnOnce(MessageStream) -> MessageStream,
    {
        Self {
            headers: self.headers,
            messages: f(self.messages),
        }
    }

    pub fn into_messages(self) -> MessageStream {
        self.messages
    }
}

impl fmt::Debug for StreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamResponse")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// What a call produced, matching its [`CallKind`].
#[derive(Debug)]
pub enum Reply {
    Unary(Response),
    Stream(StreamResponse),
}

/// A typed stream of decoded messages.
///
/// Items that fail to decode surface as serialization errors; the stream
/// keeps going afterwards.
pub struct Streaming<T> {
    inner: Pin<Box<dyn Stream<Item = Result<T>> + Send>>,
}

impl<T> Streaming<T> {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl<T> Stream for Streaming<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<T> fmt::Debug for Streaming<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Streaming").finish_non_exhaustive()
    }
}
