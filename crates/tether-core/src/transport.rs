//! Transports: a channel plus an ordered interceptor chain.

use std::fmt;
use std::sync::Arc;

use futures_util::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::Result;
use crate::call::{Reply, Request, Streaming};
use crate::error::{Error, Status};
use crate::traits::{Channel, Interceptor, Next};
use crate::types::{Endpoint, MethodPath};

/// A channel wrapped in an interceptor chain.
///
/// Transports are cheap to clone and safe to share across tasks; clones
/// share the channel and the chain.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    endpoint: Endpoint,
    channel: Arc<dyn Channel>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Transport {
    /// Start building a transport over `channel`.
    pub fn builder(endpoint: Endpoint, channel: Arc<dyn Channel>) -> TransportBuilder {
        TransportBuilder {
            endpoint,
            channel,
            interceptors: Vec::new(),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    /// Run `request` through the interceptor chain and the channel.
    pub async fn call(&self, request: Request) -> Result<Reply> {
        Next::new(&self.inner.interceptors, self.inner.channel.as_ref())
            .run(request)
            .await
    }

    /// Make a unary call with typed messages.
    #[instrument(skip(self, message), fields(endpoint = %self.inner.endpoint))]
    pub async fn unary<Req, Res>(&self, method: &str, message: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let request = Request::unary(MethodPath::parse(method)?, serde_json::to_value(message)?);

        match self.call(request).await? {
            Reply::Unary(response) => Ok(serde_json::from_value(response.into_message())?),
            Reply::Stream(_) => Err(mismatched_reply(method)),
        }
    }

    /// Make a server-streaming call with typed messages.
    ///
    /// Dropping the returned stream cancels the call.
    #[instrument(skip(self, message), fields(endpoint = %self.inner.endpoint))]
    pub async fn server_stream<Req, Res>(&self, method: &str, message: &Req) -> Result<Streaming<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned + Send + 'static,
    {
        let request =
            Request::server_stream(MethodPath::parse(method)?, serde_json::to_value(message)?);

        match self.call(request).await? {
            Reply::Stream(response) => {
                let messages = response.into_messages().map(|item| {
                    item.and_then(|message| serde_json::from_value(message).map_err(Error::from))
                });
                Ok(Streaming::new(messages))
            }
            Reply::Unary(_) => Err(mismatched_reply(method)),
        }
    }
}

fn mismatched_reply(method: &str) -> Error {
    Status::internal(format!("{method}: reply does not match the call kind")).into()
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("endpoint", &self.inner.endpoint)
            .field("interceptors", &self.inner.interceptors.len())
            .finish()
    }
}

/// Builder for [`Transport`].
///
/// Interceptors run in the order they are added: the first one added sees
/// the request first and the reply last.
pub struct TransportBuilder {
    endpoint: Endpoint,
    channel: Arc<dyn Channel>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl TransportBuilder {
    /// Append an interceptor to the chain.
    pub fn interceptor(self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptor_arc(Arc::new(interceptor))
    }

    /// Append a shared interceptor to the chain.
    pub fn interceptor_arc(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> Transport {
        Transport {
            inner: Arc::new(TransportInner {
                endpoint: self.endpoint,
                channel: self.channel,
                interceptors: self.interceptors,
            }),
        }
    }
}

/// A transport whose every call carries the access token obtained at dial
/// time.
///
/// Obtained from [`dial`](crate::dial()). The chain is fixed: the auth
/// interceptor runs first, then the logger.
#[derive(Debug, Clone)]
pub struct AuthenticatedTransport {
    transport: Transport,
    entity: String,
}

impl AuthenticatedTransport {
    pub(crate) fn new(transport: Transport, entity: String) -> Self {
        Self { transport, entity }
    }

    /// The entity the transport authenticated as.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.transport.endpoint()
    }

    pub async fn call(&self, request: Request) -> Result<Reply> {
        self.transport.call(request).await
    }

    pub async fn unary<Req, Res>(&self, method: &str, message: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.transport.unary(method, message).await
    }

    pub async fn server_stream<Req, Res>(&self, method: &str, message: &Req) -> Result<Streaming<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned + Send + 'static,
    {
        self.transport.server_stream(method, message).await
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn into_transport(self) -> Transport {
        self.transport
    }
}
