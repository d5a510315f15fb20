//! Stream fan-out for observing messages without consuming them twice.
//!
//! [`tee`] splits one message stream into a caller-facing stream and an
//! [`Observer`]. The caller side is the only consumer of the upstream; every
//! item it pulls is forwarded to the observer, in order, before being
//! yielded. The two sides are independently cancellable:
//!
//! - dropping the caller side closes the observer, which then ends without
//!   an [`StreamEvent::End`];
//! - dropping the observer never affects the caller side.

use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures_util::Stream;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::Result;
use crate::call::MessageStream;
use crate::classify::ErrorKind;

/// What the observer side of a [`tee`] sees.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A message, as delivered to the caller.
    Message(Value),
    /// An error item, as delivered to the caller.
    Failed { kind: ErrorKind, message: String },
    /// The upstream finished.
    End,
}

/// Split `upstream` into a caller stream and an observer.
pub fn tee(upstream: MessageStream) -> (MessageStream, Observer) {
    let (tx, rx) = mpsc::unbounded_channel();
    let forward = Forward {
        upstream,
        tx: Some(tx),
    };
    let observer = Observer {
        inner: UnboundedReceiverStream::new(rx),
    };
    (Box::pin(forward), observer)
}

struct Forward {
    upstream: MessageStream,
    tx: Option<mpsc::UnboundedSender<StreamEvent>>,
}

impl Stream for Forward {
    type Item = Result<Value>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let item = ready!(self.upstream.as_mut().poll_next(cx));

        let observer_gone = match &self.tx {
            Some(tx) => {
                let event = match &item {
                    Some(Ok(message)) => StreamEvent::Message(message.clone()),
                    Some(Err(err)) => StreamEvent::Failed {
                        kind: err.kind(),
                        message: err.to_string(),
                    },
                    None => StreamEvent::End,
                };
                tx.send(event).is_err()
            }
            None => false,
        };

        if observer_gone || item.is_none() {
            self.tx = None;
        }

        Poll::Ready(item)
    }
}

/// The observing side of a [`tee`].
pub struct Observer {
    inner: UnboundedReceiverStream<StreamEvent>,
}

impl Stream for Observer {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
