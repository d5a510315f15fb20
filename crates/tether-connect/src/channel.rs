//! Connect protocol channel over HTTP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use serde_json::Value;
use tether_core::{
    Channel, ChannelFactory, ConfigurationError, Endpoint, Error, Request, Response, Result,
    Status, StreamResponse, TransportError,
};
use tracing::{debug, instrument, trace};

use crate::config::ConnectConfig;
use crate::envelope::{self, Decoder};
use crate::wire::{end_stream, transport_error, unary_error};

const PROTOCOL_VERSION: &str = "connect-protocol-version";
const TIMEOUT_MS: &str = "connect-timeout-ms";
const UNARY_CONTENT_TYPE: &str = "application/json";
const STREAM_CONTENT_TYPE: &str = "application/connect+json";

/// A [`Channel`] speaking the Connect protocol with JSON messages.
///
/// Unary calls are plain POSTs; server-streaming calls use enveloped
/// bodies. Calls are independent and may run concurrently.
#[derive(Debug, Clone)]
pub struct ConnectChannel {
    client: reqwest::Client,
    endpoint: Endpoint,
    request_timeout: Duration,
}

impl ConnectChannel {
    /// Start a POST for `request`. Protocol headers replace any the caller
    /// set under the same names.
    fn post(
        &self,
        request: &Request,
        content_type: &'static str,
        timeout: Option<Duration>,
    ) -> reqwest::RequestBuilder {
        let url = self.endpoint.method_url(request.method());
        trace!(%url, "connect request");

        let mut headers = request.headers().clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(PROTOCOL_VERSION, HeaderValue::from_static("1"));

        let builder = self.client.post(url);
        match timeout {
            Some(timeout) => {
                let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                headers.insert(TIMEOUT_MS, HeaderValue::from(millis));
                builder.headers(headers).timeout(timeout)
            }
            None => builder.headers(headers),
        }
    }
}

#[async_trait]
impl Channel for ConnectChannel {
    #[instrument(skip(self, request), fields(method = %request.method()))]
    async fn unary(&self, request: Request) -> Result<Response> {
        let body = serde_json::to_vec(request.message())?;

        let response = self
            .post(&request, UNARY_CONTENT_TYPE, Some(self.request_timeout))
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(transport_error)?;
        debug!(%status, len = bytes.len(), "unary reply");

        if !status.is_success() {
            return Err(unary_error(status, &bytes).into());
        }

        let message = if bytes.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(Response::new(headers, message))
    }

    #[instrument(skip(self, request), fields(method = %request.method()))]
    async fn server_stream(&self, request: Request) -> Result<StreamResponse> {
        let body = envelope::encode(0, &serde_json::to_vec(request.message())?)?;

        let response = self
            .post(&request, STREAM_CONTENT_TYPE, None)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.map_err(transport_error)?;
            return Err(unary_error(status, &bytes).into());
        }
        debug!(%status, "stream opened");

        let headers: HeaderMap = response.headers().clone();
        let mut body = response.bytes_stream();

        let messages = async_stream::stream! {
            let mut decoder = Decoder::new();

            'read: loop {
                loop {
                    match decoder.next_frame() {
                        Ok(Some(frame)) if frame.is_end_stream() => {
                            if let Err(err) = end_stream(&frame.payload) {
                                yield Err(err);
                            }
                            break 'read;
                        }
                        Ok(Some(frame)) => {
                            yield serde_json::from_slice::<Value>(&frame.payload).map_err(Error::from);
                        }
                        Ok(None) => break,
                        Err(err) => {
                            yield Err(err);
                            break 'read;
                        }
                    }
                }

                match body.next().await {
                    Some(Ok(chunk)) => decoder.push(&chunk),
                    Some(Err(err)) => {
                        yield Err(transport_error(err));
                        break 'read;
                    }
                    None => {
                        yield Err(Error::from(Status::internal("stream closed without an end-stream frame")));
                        break 'read;
                    }
                }
            }
        };

        Ok(StreamResponse::new(headers, messages))
    }
}

/// Opens [`ConnectChannel`]s that share one HTTP client.
#[derive(Debug, Clone)]
pub struct ConnectChannelFactory {
    client: reqwest::Client,
    config: ConnectConfig,
}

impl ConnectChannelFactory {
    /// Build the HTTP client described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client cannot be built.
    pub fn new(config: ConnectConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ConfigurationError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ConnectConfig {
        &self.config
    }
}

impl ChannelFactory for ConnectChannelFactory {
    fn open(&self, endpoint: &Endpoint) -> Result<Arc<dyn Channel>> {
        if !endpoint.is_http() {
            return Err(TransportError::CannotDialDirectly {
                target: endpoint.to_string(),
                reason: format!("the '{}' scheme needs a relay", endpoint.scheme()),
            }
            .into());
        }

        Ok(Arc::new(ConnectChannel {
            client: self.client.clone(),
            endpoint: endpoint.clone(),
            request_timeout: self.config.request_timeout,
        }))
    }
}
