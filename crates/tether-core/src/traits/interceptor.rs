//! Interceptor trait and the chain walker.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::call::{CallKind, Reply, Request};

use super::Channel;

/// Middleware wrapping every call made through a transport.
///
/// An interceptor receives the request and the rest of the chain. It may
/// modify the request, observe the reply, or both, and must hand back a
/// reply of the same [`CallKind`] as the request.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use tether_core::{Interceptor, Next, Reply, Request, Result};
///
/// struct UserAgent;
///
/// #[async_trait]
/// impl Interceptor for UserAgent {
///     async fn intercept(&self, mut request: Request, next: Next<'_>) -> Result<Reply> {
///         request
///             .headers_mut()
///             .insert("x-client", http::HeaderValue::from_static("tether"));
///         next.run(request).await
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Wrap one call.
    async fn intercept(&self, request: Request, next: Next<'_>) -> Result<Reply>;
}

/// The remainder of an interceptor chain.
///
/// Index 0 of the chain is the outermost interceptor. Once the chain is
/// exhausted, the request is dispatched to the channel according to its
/// [`CallKind`].
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Interceptor>],
    channel: &'a dyn Channel,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn Interceptor>], channel: &'a dyn Channel) -> Self {
        Self { chain, channel }
    }

    /// Forward the request to the next interceptor, or to the channel.
    pub async fn run(self, request: Request) -> Result<Reply> {
        match self.chain.split_first() {
            Some((first, rest)) => first.intercept(request, Next::new(rest, self.channel)).await,
            None => match request.kind() {
                CallKind::Unary => self.channel.unary(request).await.map(Reply::Unary),
                CallKind::ServerStream => {
                    self.channel.server_stream(request).await.map(Reply::Stream)
                }
            },
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.chain.len())
            .finish_non_exhaustive()
    }
}
