//! tether-connect - Connect protocol channels for tether transports.
//!
//! [`dial`] authenticates against a Connect server and returns an
//! [`AuthenticatedTransport`] ready for unary and server-streaming calls.
//!
//! # Example
//!
//! ```no_run
//! use tether_connect::dial;
//! use tether_core::{Credential, CredentialKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = Credential::new(CredentialKind::ApiKey, "key1", "secret")?;
//! let transport = dial("robot.example", credential).await?;
//!
//! let status: serde_json::Value = transport
//!     .unary("robot.v1.RobotService/GetStatus", &serde_json::json!({}))
//!     .await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

mod channel;
mod config;
mod envelope;
mod wire;

use std::sync::Arc;

use tether_core::{AuthenticatedTransport, ClassifiedError, Credential, DialOptions};

pub use channel::{ConnectChannel, ConnectChannelFactory};
pub use config::ConnectConfig;

/// Dial `host` with the default [`ConnectConfig`].
pub async fn dial(
    host: &str,
    credential: Credential,
) -> Result<AuthenticatedTransport, ClassifiedError> {
    dial_with_config(host, credential, &ConnectConfig::default()).await
}

/// Dial `host` with explicit client settings.
pub async fn dial_with_config(
    host: &str,
    credential: Credential,
    config: &ConnectConfig,
) -> Result<AuthenticatedTransport, ClassifiedError> {
    tether_core::dial(&dial_options(config)?, host, credential).await
}

/// [`DialOptions`] backed by a [`ConnectChannelFactory`], for callers that
/// want to customise them further, e.g. with their own log sink.
pub fn dial_options(config: &ConnectConfig) -> Result<DialOptions, ClassifiedError> {
    let factory = ConnectChannelFactory::new(config.clone())?;
    Ok(DialOptions::new(Arc::new(factory)).with_insecure(config.allow_insecure))
}
