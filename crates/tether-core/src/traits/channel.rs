//! Channel traits.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::call::{Request, Response, StreamResponse};
use crate::types::Endpoint;

/// A bare connection to a remote service, with no interceptors.
///
/// Implementations must be safe for concurrent use; each call is
/// independent.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Perform a unary call.
    async fn unary(&self, request: Request) -> Result<Response>;

    /// Perform a server-streaming call.
    async fn server_stream(&self, request: Request) -> Result<StreamResponse>;
}

/// Opens channels to endpoints.
///
/// A factory is passed to [`dial`](crate::dial()) explicitly through
/// [`DialOptions`](crate::DialOptions).
pub trait ChannelFactory: Send + Sync {
    /// Open a channel to `endpoint`.
    ///
    /// # Errors
    ///
    /// Fails synchronously, before any network activity, if the endpoint
    /// cannot be served by this factory.
    fn open(&self, endpoint: &Endpoint) -> Result<Arc<dyn Channel>>;
}
