//! tether-core - Authenticated RPC transports built from interceptor chains.
//!
//! A [`Transport`] is a [`Channel`] wrapped in an ordered list of
//! [`Interceptor`]s. [`dial`] exchanges a [`Credential`] for an access token
//! and returns an [`AuthenticatedTransport`] whose chain stamps that token
//! on every call and logs every call through a [`LogSink`].
//!
//! Every error can be classified as retryable or fatal with [`classify`];
//! nothing in this crate retries on its own.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tether_core::{Credential, CredentialKind, DialOptions, dial};
//!
//! # async fn example(factory: Arc<dyn tether_core::ChannelFactory>) -> anyhow::Result<()> {
//! let credential = Credential::new(CredentialKind::ApiKey, "key1", "secret")?;
//! let transport = dial(&DialOptions::new(factory), "robot.example", credential).await?;
//!
//! let status: serde_json::Value = transport
//!     .unary("robot.v1.RobotService/GetStatus", &serde_json::json!({}))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod call;
pub mod classify;
pub mod credentials;
pub mod dial;
pub mod error;
pub mod interceptors;
pub mod stream;
pub mod tokens;
pub mod traits;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use call::{CallKind, MessageStream, Reply, Request, Response, StreamResponse, Streaming};
pub use classify::{Classification, ClassifiedError, ErrorKind, classify};
pub use credentials::{Credential, CredentialKind};
pub use dial::{AUTHENTICATE, DialOptions, dial};
pub use error::{Code, ConfigurationError, Error, Status, TransportError};
pub use interceptors::{
    AuthInterceptor, LogEntry, LogEvent, LogSink, LoggerInterceptor, Payload, SinkError,
    TracingSink,
};
pub use stream::{Observer, StreamEvent, tee};
pub use tokens::AccessToken;
pub use traits::{Channel, ChannelFactory, Interceptor, Next};
pub use transport::{AuthenticatedTransport, Transport, TransportBuilder};
pub use types::{Endpoint, MethodPath};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
