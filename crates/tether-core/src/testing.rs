//! In-memory channel and sink used by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use http::HeaderMap;
use serde_json::Value;

use crate::Result;
use crate::call::{Request, Response, StreamResponse};
use crate::error::{Error, Status};
use crate::interceptors::{LogEntry, LogSink, SinkError};
use crate::traits::{Channel, ChannelFactory};
use crate::types::{Endpoint, MethodPath};

pub(crate) fn method(path: &str) -> MethodPath {
    MethodPath::parse(path).unwrap()
}

/// A channel answering from canned replies and recording every request.
#[derive(Default)]
pub(crate) struct StubChannel {
    unary: Mutex<Vec<(String, std::result::Result<Value, Status>)>>,
    fallback: Option<std::result::Result<Value, Status>>,
    stream: Vec<std::result::Result<Value, Status>>,
    endless: bool,
    requests: Mutex<Vec<Request>>,
}

impl StubChannel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reply to every unary call with `message`.
    pub(crate) fn with_unary(mut self, message: Value) -> Self {
        self.fallback = Some(Ok(message));
        self
    }

    /// Reply to unary calls of `method` with `reply`.
    pub(crate) fn route(
        self,
        method: &str,
        reply: std::result::Result<Value, Status>,
    ) -> Self {
        self.unary.lock().unwrap().push((method.to_string(), reply));
        self
    }

    /// Reply to every streaming call with `messages`, then end.
    pub(crate) fn with_stream(mut self, messages: Vec<Value>) -> Self {
        self.stream = messages.into_iter().map(Ok).collect();
        self
    }

    /// Reply to every streaming call with `items`, then end.
    pub(crate) fn with_stream_items(
        mut self,
        items: Vec<std::result::Result<Value, Status>>,
    ) -> Self {
        self.stream = items;
        self
    }

    /// Keep streams open after the canned messages.
    pub(crate) fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for StubChannel {
    async fn unary(&self, request: Request) -> Result<Response> {
        let path = request.method().to_string();
        self.requests.lock().unwrap().push(request);

        let routed = self
            .unary
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| *m == path)
            .map(|(_, reply)| reply.clone());

        match routed.or_else(|| self.fallback.clone()) {
            Some(Ok(message)) => Ok(Response::new(HeaderMap::new(), message)),
            Some(Err(status)) => Err(Error::Status(status)),
            None => Err(Status::new(crate::Code::Unimplemented, path).into()),
        }
    }

    async fn server_stream(&self, request: Request) -> Result<StreamResponse> {
        self.requests.lock().unwrap().push(request);

        let items: Vec<Result<Value>> = self
            .stream
            .iter()
            .cloned()
            .map(|item| item.map_err(Error::Status))
            .collect();
        let messages = stream::iter(items);

        if self.endless {
            Ok(StreamResponse::new(
                HeaderMap::new(),
                messages.chain(stream::pending()),
            ))
        } else {
            Ok(StreamResponse::new(HeaderMap::new(), messages))
        }
    }
}

/// A factory handing out the same stub channel and counting opens.
pub(crate) struct StubFactory {
    pub(crate) channel: Arc<StubChannel>,
    pub(crate) opened: Mutex<Vec<Endpoint>>,
}

impl StubFactory {
    pub(crate) fn new(channel: StubChannel) -> Self {
        Self {
            channel: Arc::new(channel),
            opened: Mutex::new(Vec::new()),
        }
    }
}

impl ChannelFactory for StubFactory {
    fn open(&self, endpoint: &Endpoint) -> Result<Arc<dyn Channel>> {
        self.opened.lock().unwrap().push(endpoint.clone());
        Ok(self.channel.clone())
    }
}

/// A sink keeping every entry in memory.
#[derive(Default)]
pub(crate) struct RecordingSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingSink {
    pub(crate) fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Wait until `done` holds for the recorded entries.
    pub(crate) async fn wait_for(&self, done: impl Fn(&[LogEntry]) -> bool) -> Vec<LogEntry> {
        for _ in 0..200 {
            let entries = self.entries();
            if done(&entries) {
                return entries;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("sink never reached the expected state: {:?}", self.entries());
    }
}

impl LogSink for RecordingSink {
    fn record(&self, entry: &LogEntry) -> std::result::Result<(), SinkError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// A sink that always fails.
pub(crate) struct FailingSink;

impl LogSink for FailingSink {
    fn record(&self, _entry: &LogEntry) -> std::result::Result<(), SinkError> {
        Err(SinkError::new("disk full"))
    }
}

/// A sink that panics on every entry.
pub(crate) struct PanickingSink;

impl LogSink for PanickingSink {
    fn record(&self, _entry: &LogEntry) -> std::result::Result<(), SinkError> {
        panic!("sink exploded");
    }
}
