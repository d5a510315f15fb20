use std::fmt;

use async_trait::async_trait;
use http::HeaderValue;
use http::header::AUTHORIZATION;

use crate::Result;
use crate::call::{Reply, Request};
use crate::error::Status;
use crate::tokens::AccessToken;
use crate::traits::{Interceptor, Next};

/// Interceptor stamping a fixed bearer token on every outgoing call.
///
/// The header is replaced rather than appended, so each call carries it
/// exactly once. One instance is bound to one token for its whole lifetime;
/// it never re-authenticates.
///
/// # Example
/// ```
/// use tether_core::AuthInterceptor;
///
/// let auth = AuthInterceptor::bearer("tok-abc").unwrap();
/// assert!(!format!("{auth:?}").contains("tok-abc"));
/// ```
#[derive(Clone)]
pub struct AuthInterceptor {
    header_value: HeaderValue,
}

impl AuthInterceptor {
    /// Create an interceptor from a token obtained by the dial protocol.
    ///
    /// # Errors
    ///
    /// An empty token, or one that is not a valid header value, is
    /// `unauthenticated`.
    pub(crate) fn new(token: AccessToken) -> Result<Self> {
        if token.is_empty() {
            return Err(Status::unauthenticated("access token is empty").into());
        }

        let mut header_value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|_| Status::unauthenticated("access token is not a valid header value"))?;
        header_value.set_sensitive(true);

        Ok(Self { header_value })
    }

    /// Create an interceptor from a bearer token the caller already holds.
    pub fn bearer(token: impl Into<String>) -> Result<Self> {
        Self::new(AccessToken::new(token))
    }
}

#[async_trait]
impl Interceptor for AuthInterceptor {
    async fn intercept(&self, mut request: Request, next: Next<'_>) -> Result<Reply> {
        request
            .headers_mut()
            .insert(AUTHORIZATION, self.header_value.clone());
        next.run(request).await
    }
}

impl fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInterceptor")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Code;
    use crate::error::Error;
    use crate::testing::{StubChannel, method};
    use crate::traits::Interceptor;
    use futures_util::StreamExt;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn stamps_unary_and_streaming_calls() {
        let chain: Vec<Arc<dyn Interceptor>> =
            vec![Arc::new(AuthInterceptor::bearer("test-token").unwrap())];
        let channel = StubChannel::new()
            .with_unary(json!({}))
            .with_stream(vec![json!(1)]);

        Next::new(&chain, &channel)
            .run(Request::unary(method("pkg.Svc/Get"), json!({})))
            .await
            .unwrap();
        let reply = Next::new(&chain, &channel)
            .run(Request::server_stream(method("pkg.Svc/Watch"), json!({})))
            .await
            .unwrap();
        let Reply::Stream(stream) = reply else {
            panic!("expected a stream");
        };
        assert_eq!(stream.into_messages().count().await, 1);

        for request in channel.requests() {
            let values: Vec<_> = request.headers().get_all(AUTHORIZATION).iter().collect();
            assert_eq!(values, vec!["Bearer test-token"]);
        }
    }

    #[tokio::test]
    async fn replaces_an_existing_authorization_header() {
        let chain: Vec<Arc<dyn Interceptor>> =
            vec![Arc::new(AuthInterceptor::bearer("fresh").unwrap())];
        let channel = StubChannel::new().with_unary(json!({}));

        let mut request = Request::unary(method("pkg.Svc/Get"), json!({}));
        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer stale"));
        Next::new(&chain, &channel).run(request).await.unwrap();

        let seen = channel.requests();
        assert_eq!(seen[0].headers().get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(seen[0].headers()[AUTHORIZATION], "Bearer fresh");
    }

    #[test]
    fn rejects_empty_token() {
        let err = AuthInterceptor::bearer("").unwrap_err();
        assert!(matches!(err, Error::Status(ref s) if s.code() == Code::Unauthenticated));
    }

    #[test]
    fn rejects_token_with_control_characters() {
        let err = AuthInterceptor::bearer("tok\nen").unwrap_err();
        assert!(matches!(err, Error::Status(ref s) if s.code() == Code::Unauthenticated));
        assert!(!err.is_retryable());
    }
}
