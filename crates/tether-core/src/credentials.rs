//! Credential type.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigurationError, Error};

/// The format a credential payload is presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CredentialKind {
    /// An API key; the entity is the key id.
    ApiKey,
    /// A previously issued access token.
    AccessToken,
    /// A robot location secret; the entity is the robot address.
    RobotLocationSecret,
}

impl CredentialKind {
    /// Returns the name sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::ApiKey => "api-key",
            CredentialKind::AccessToken => "access-token",
            CredentialKind::RobotLocationSecret => "robot-location-secret",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api-key" => Ok(CredentialKind::ApiKey),
            "access-token" => Ok(CredentialKind::AccessToken),
            "robot-location-secret" => Ok(CredentialKind::RobotLocationSecret),
            other => Err(ConfigurationError::UnknownCredentialKind {
                value: other.to_string(),
            }
            .into()),
        }
    }
}

/// A caller's proof of identity, exchanged once for an access token.
///
/// # Security
///
/// The payload is never exposed in Debug output, is not serializable, and
/// is only readable inside this crate while building the authenticate
/// request.
///
/// # Example
///
/// ```
/// use tether_core::{Credential, CredentialKind};
///
/// let credential = Credential::new(CredentialKind::ApiKey, "key1", "secret").unwrap();
/// assert_eq!(credential.entity(), "key1");
/// assert!(!format!("{credential:?}").contains("secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    kind: CredentialKind,
    entity: String,
    payload: String,
}

impl Credential {
    /// Create a new credential.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if `payload` is empty.
    pub fn new(
        kind: CredentialKind,
        entity: impl Into<String>,
        payload: impl Into<String>,
    ) -> Result<Self, Error> {
        let payload = payload.into();
        if payload.is_empty() {
            return Err(ConfigurationError::EmptyPayload.into());
        }

        Ok(Self {
            kind,
            entity: entity.into(),
            payload,
        })
    }

    /// Create a credential from a kind name such as `"api-key"`.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if the kind is not recognised or
    /// the payload is empty.
    pub fn parse(
        kind: &str,
        entity: impl Into<String>,
        payload: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::new(kind.parse()?, entity, payload)
    }

    /// Returns the credential kind.
    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// Returns the entity this credential is presented on behalf of.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Returns the secret payload.
    ///
    /// # Security
    ///
    /// Use this only when constructing the authenticate request.
    pub(crate) fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("entity", &self.entity)
            .field("payload", &"[REDACTED]")
            .finish()
    }
}
