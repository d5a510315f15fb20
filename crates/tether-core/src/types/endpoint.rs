//! Endpoint type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{ConfigurationError, Error};
use crate::types::MethodPath;

/// A validated address of a remote service.
///
/// A bare authority such as `robot.example:8080` defaults to `https`.
/// Plain `http` is only accepted for loopback hosts unless the endpoint is
/// built with [`Endpoint::new_insecure`]. Other schemes (for example
/// `webrtc://`) parse, but a channel factory may refuse to dial them.
///
/// # Example
///
/// ```
/// use tether_core::{Endpoint, MethodPath};
///
/// let endpoint = Endpoint::new("host.example").unwrap();
/// let method = MethodPath::parse("proto.rpc.v1.AuthService/Authenticate").unwrap();
/// assert_eq!(endpoint.method_url(&method),
///            "https://host.example/proto.rpc.v1.AuthService/Authenticate");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint(Url);

impl Endpoint {
    /// Create a new endpoint from a host or URL, validating the format.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the input is empty, unparseable,
    /// has no host, or uses plain HTTP for a non-loopback host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        Self::parse(s.as_ref(), false)
    }

    /// Like [`Endpoint::new`], but accepts plain HTTP for any host.
    pub fn new_insecure(s: impl AsRef<str>) -> Result<Self, Error> {
        Self::parse(s.as_ref(), true)
    }

    fn parse(s: &str, allow_insecure: bool) -> Result<Self, Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConfigurationError::EmptyHost.into());
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&candidate).map_err(|e| ConfigurationError::InvalidEndpoint {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s, allow_insecure)?;

        Ok(Self(url))
    }

    /// Returns the URL for a method on this endpoint.
    pub fn method_url(&self, method: &MethodPath) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}/{}", base, method.service(), method.method())
    }

    /// Returns the endpoint as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the URL scheme (e.g., "https", "http").
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Returns true if the endpoint speaks HTTP or HTTPS.
    pub fn is_http(&self) -> bool {
        matches!(self.0.scheme(), "http" | "https")
    }

    fn validate(url: &Url, original: &str, allow_insecure: bool) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(ConfigurationError::InvalidEndpoint {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let Some(host) = url.host_str().filter(|h| !h.is_empty()) else {
            return Err(ConfigurationError::InvalidEndpoint {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        };

        let is_loopback = host == "localhost" || host == "127.0.0.1" || host == "[::1]";
        if url.scheme() == "http" && !is_loopback && !allow_insecure {
            return Err(ConfigurationError::InvalidEndpoint {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Endpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Endpoint::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
