use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::trace;
use uuid::Uuid;

use crate::Result;
use crate::call::{Reply, Request};
use crate::stream::{Observer, StreamEvent, tee};
use crate::traits::{Interceptor, Next};
use crate::types::MethodPath;

use super::sink::{LogEntry, LogEvent, LogSink, Payload, TracingSink, header_names};

/// Interceptor recording every call to a [`LogSink`].
///
/// Unary calls are logged before and after the call. For streaming calls
/// the message stream is tee'd: the caller keeps driving the only upstream
/// consumer while a background task logs each message in delivery order.
/// The background task ends when the stream ends or the caller drops it.
///
/// Requests and replies pass through unchanged. Sink errors and panics are
/// swallowed.
#[derive(Clone)]
pub struct LoggerInterceptor {
    sink: Arc<dyn LogSink>,
}

impl LoggerInterceptor {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl Default for LoggerInterceptor {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl fmt::Debug for LoggerInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerInterceptor").finish_non_exhaustive()
    }
}

#[async_trait]
impl Interceptor for LoggerInterceptor {
    async fn intercept(&self, request: Request, next: Next<'_>) -> Result<Reply> {
        let call = CallLog {
            sink: self.sink.clone(),
            call_id: Uuid::new_v4(),
            method: request.method().clone(),
            sensitive: request.is_sensitive(),
        };

        call.emit(LogEvent::Request {
            headers: header_names(request.headers()),
            payload: Payload::capture(request.message(), call.sensitive),
        });

        match next.run(request).await {
            Ok(Reply::Unary(response)) => {
                call.emit(LogEvent::Response {
                    payload: Payload::capture(response.message(), call.sensitive),
                });
                Ok(Reply::Unary(response))
            }
            Ok(Reply::Stream(response)) => {
                if tokio::runtime::Handle::try_current().is_err() {
                    trace!(method = %call.method, "no async runtime, skipping per-message logging");
                    return Ok(Reply::Stream(response));
                }

                let response = response.map_messages(|messages| {
                    let (forward, observer) = tee(messages);
                    tokio::spawn(call.observe(observer));
                    forward
                });
                Ok(Reply::Stream(response))
            }
            Err(err) => {
                call.emit(LogEvent::Failed {
                    kind: err.kind(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }
}

struct CallLog {
    sink: Arc<dyn LogSink>,
    call_id: Uuid,
    method: MethodPath,
    sensitive: bool,
}

impl CallLog {
    fn emit(&self, event: LogEvent) {
        let entry = LogEntry {
            call_id: self.call_id,
            method: self.method.clone(),
            event,
        };

        match catch_unwind(AssertUnwindSafe(|| self.sink.record(&entry))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => trace!(error = %err, "dropping log entry"),
            Err(_) => trace!("log sink panicked, dropping log entry"),
        }
    }

    async fn observe(self, mut observer: Observer) {
        let mut messages = 0;

        while let Some(event) = observer.next().await {
            match event {
                StreamEvent::Message(message) => {
                    self.emit(LogEvent::Message {
                        index: messages,
                        payload: Payload::capture(&message, self.sensitive),
                    });
                    messages += 1;
                }
                StreamEvent::Failed { kind, message } => {
                    self.emit(LogEvent::Failed { kind, message });
                }
                StreamEvent::End => {
                    self.emit(LogEvent::StreamEnd { messages });
                    return;
                }
            }
        }

        self.emit(LogEvent::StreamCancelled { messages });
    }
}
