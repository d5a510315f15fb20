//! The authenticated dial protocol.
//!
//! Dialing is a two-phase handshake:
//!
//! 1. open a bare transport carrying only the logger and exchange the
//!    credential for an access token with one unary `Authenticate` call;
//! 2. open a fresh transport whose chain is `[auth, logger]` and hand it to
//!    the caller.
//!
//! The bare transport is dropped before `dial` returns, so the caller can
//! never issue an unauthenticated call through what it holds.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::call::{Reply, Request};
use crate::classify::ClassifiedError;
use crate::credentials::Credential;
use crate::error::{Error, Status};
use crate::interceptors::{AuthInterceptor, LogSink, LoggerInterceptor, TracingSink};
use crate::tokens::AccessToken;
use crate::traits::ChannelFactory;
use crate::transport::{AuthenticatedTransport, Transport};
use crate::types::{Endpoint, MethodPath};

/// The method exchanging a credential for an access token.
pub const AUTHENTICATE: &str = "proto.rpc.v1.AuthService/Authenticate";

#[derive(Serialize)]
struct AuthenticateRequest<'a> {
    entity: &'a str,
    credentials: CredentialsBody<'a>,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    payload: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateResponse {
    #[serde(default)]
    access_token: String,
}

/// Everything [`dial`] needs besides the host and the credential.
///
/// # Example
///
/// ```ignore
/// let options = DialOptions::new(Arc::new(my_factory))
///     .with_log_sink(Arc::new(TracingSink));
/// let transport = dial(&options, "robot.example", credential).await?;
/// ```
#[derive(Clone)]
pub struct DialOptions {
    factory: Arc<dyn ChannelFactory>,
    sink: Arc<dyn LogSink>,
    allow_insecure: bool,
}

impl DialOptions {
    pub fn new(factory: Arc<dyn ChannelFactory>) -> Self {
        Self {
            factory,
            sink: Arc::new(TracingSink),
            allow_insecure: false,
        }
    }

    /// Send call logs to `sink` instead of `tracing`.
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Accept plain `http` endpoints for non-loopback hosts.
    pub fn with_insecure(mut self, allow_insecure: bool) -> Self {
        self.allow_insecure = allow_insecure;
        self
    }

    fn endpoint(&self, host: &str) -> Result<Endpoint, Error> {
        if self.allow_insecure {
            Endpoint::new_insecure(host)
        } else {
            Endpoint::new(host)
        }
    }

    fn logger(&self) -> LoggerInterceptor {
        LoggerInterceptor::new(self.sink.clone())
    }
}

impl fmt::Debug for DialOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialOptions")
            .field("allow_insecure", &self.allow_insecure)
            .finish_non_exhaustive()
    }
}

/// Authenticate against `host` and return a transport that stamps the
/// obtained token on every call.
///
/// Configuration problems (empty or malformed host, a target the factory
/// cannot dial) fail before any network activity. Errors from the
/// authenticate call keep their code and message. Nothing is retried here;
/// use [`ClassifiedError::retryable`] to decide.
#[instrument(skip(options, credential), fields(entity = %credential.entity(), kind = %credential.kind()))]
pub async fn dial(
    options: &DialOptions,
    host: &str,
    credential: Credential,
) -> Result<AuthenticatedTransport, ClassifiedError> {
    let endpoint = options.endpoint(host)?;
    info!(%endpoint, "dialing");

    let token = {
        let bare = Transport::builder(endpoint.clone(), options.factory.open(&endpoint)?)
            .interceptor(options.logger())
            .build();
        authenticate(&bare, &credential).await.inspect_err(|err| {
            warn!(error = %err, retryable = err.is_retryable(), "authentication failed");
        })?
    };

    let auth = AuthInterceptor::new(token)?;
    let transport = Transport::builder(endpoint.clone(), options.factory.open(&endpoint)?)
        .interceptor(auth)
        .interceptor(options.logger())
        .build();

    debug!(%endpoint, "authenticated transport ready");
    Ok(AuthenticatedTransport::new(
        transport,
        credential.entity().to_string(),
    ))
}

async fn authenticate(transport: &Transport, credential: &Credential) -> Result<AccessToken, Error> {
    let body = AuthenticateRequest {
        entity: credential.entity(),
        credentials: CredentialsBody {
            kind: credential.kind().as_str(),
            payload: credential.payload(),
        },
    };
    let request = Request::unary(MethodPath::parse(AUTHENTICATE)?, serde_json::to_value(&body)?)
        .into_sensitive();

    let response = match transport.call(request).await? {
        Reply::Unary(response) => response,
        Reply::Stream(_) => {
            return Err(Status::internal("authenticate replied with a stream").into());
        }
    };

    let reply: AuthenticateResponse = serde_json::from_value(response.into_message())?;
    if reply.access_token.is_empty() {
        return Err(Status::unauthenticated("server returned an empty access token").into());
    }

    Ok(AccessToken::new(reply.access_token))
}
