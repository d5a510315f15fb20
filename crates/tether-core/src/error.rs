//! Error types for tether.
//!
//! This module provides a unified error type with explicit variants for
//! transport, RPC status, configuration and serialization failures. Every
//! variant maps onto exactly one [`ErrorKind`](crate::classify::ErrorKind),
//! see [`crate::classify`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The unified error type for tether operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, undialable target).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Status returned by the remote service.
    #[error("rpc error: {0}")]
    Status(#[from] Status),

    /// Invalid configuration detected before any network activity.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A message could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The network layer failed (DNS, TLS, connection reset, broken body).
    #[error("network failure: {message}")]
    Network { message: String },

    /// The call did not complete in time.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The target cannot be reached over a direct connection.
    #[error("cannot dial {target} directly: {reason}")]
    CannotDialDirectly { target: String, reason: String },
}

/// Configuration errors raised synchronously, before any I/O.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No host was given.
    #[error("host must not be empty")]
    EmptyHost,

    /// The host could not be turned into an endpoint.
    #[error("invalid endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },

    /// The credential kind is not one of the supported kinds.
    #[error("unknown credential kind '{value}'")]
    UnknownCredentialKind { value: String },

    /// The credential payload is empty.
    #[error("credential payload must not be empty")]
    EmptyPayload,

    /// A method path is not of the form `package.Service/Method`.
    #[error("invalid method '{value}': {reason}")]
    InvalidMethod { value: String, reason: String },

    /// The HTTP client could not be built from the given settings.
    #[error("http client: {message}")]
    HttpClient { message: String },
}

/// An RPC status: a [`Code`] plus the server's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: Code,
    message: String,
}

impl Status {
    /// Create a new status.
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for an `unauthenticated` status.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(Code::Unauthenticated, message)
    }

    /// Shorthand for an `internal` status.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    /// Shorthand for an `unavailable` status.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Code::Unavailable, message)
    }

    /// Returns the status code.
    pub fn code(&self) -> Code {
        self.code
    }

    /// Returns the status message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code)?;
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for Status {}

/// RPC status codes, shared by gRPC, gRPC-Web and Connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Canceled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl Code {
    /// Every code, in numeric order.
    pub const ALL: [Code; 16] = [
        Code::Canceled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
        Code::Unauthenticated,
    ];

    /// Returns the Connect wire name (e.g. `permission_denied`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Canceled => "canceled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data_loss",
            Code::Unauthenticated => "unauthenticated",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Code {
    type Err = ();

    /// Parses a Connect wire name. `cancelled` is accepted as an alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "cancelled" {
            return Ok(Code::Canceled);
        }
        Code::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or(())
    }
}
