//! Command implementations.

pub mod call;
pub mod stream;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tether_connect::{ConnectConfig, dial_with_config};
use tether_core::{AuthenticatedTransport, Credential};
use tracing::debug;

/// Where to connect and how to authenticate.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Host or URL of the service (e.g. robot.example:443)
    #[arg(long, env = "TETHER_HOST")]
    pub host: String,

    /// Credential kind: api-key, access-token or robot-location-secret
    #[arg(long, env = "TETHER_CREDENTIAL_KIND", default_value = "api-key")]
    pub kind: String,

    /// Entity the credential is presented on behalf of
    #[arg(long, env = "TETHER_ENTITY", default_value = "")]
    pub entity: String,

    /// Credential secret
    #[arg(long, env = "TETHER_PAYLOAD", hide_env_values = true)]
    pub payload: String,

    /// Allow plain HTTP to hosts other than localhost
    #[arg(long)]
    pub insecure: bool,

    /// Deadline for unary calls, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

impl ConnectArgs {
    /// Dial the host and authenticate.
    pub async fn connect(&self) -> Result<AuthenticatedTransport> {
        let credential = Credential::parse(&self.kind, self.entity.as_str(), self.payload.as_str())
            .context("Invalid credential")?;

        let config = ConnectConfig::new()
            .with_request_timeout(Duration::from_secs(self.timeout))
            .with_insecure(self.insecure);

        debug!(host = %self.host, kind = %credential.kind(), "dialing");
        dial_with_config(&self.host, credential, &config)
            .await
            .with_context(|| format!("Failed to dial {}", self.host))
    }
}

/// Parse the request body given on the command line.
pub fn parse_body(body: Option<&str>) -> Result<Value> {
    match body {
        Some(body) => serde_json::from_str(body).context("Request body is not valid JSON"),
        None => Ok(Value::Object(Default::default())),
    }
}
