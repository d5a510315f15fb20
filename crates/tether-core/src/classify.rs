//! Retryable / fatal classification of errors.
//!
//! Classification is a pure function of an error's kind. It never looks at
//! call history or retry counts, and it is total: kinds that are not listed
//! as retryable are fatal.

use std::fmt;

use crate::error::{Code, Error, TransportError};

/// The kind of an [`Error`], the only input to classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A status code returned by the remote service.
    Rpc(Code),
    /// The network layer failed.
    NetworkFailure,
    /// The call timed out on the client side.
    Timeout,
    /// Invalid host, credential or client settings.
    ConfigurationInvalid,
    /// The target needs something other than a direct connection.
    CannotDialTargetDirectly,
    /// A message could not be encoded or decoded.
    Serialization,
}

impl ErrorKind {
    /// Whether a caller may re-attempt an operation that failed this way.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Rpc(code) => matches!(
                code,
                Code::Unavailable
                    | Code::DeadlineExceeded
                    | Code::Aborted
                    | Code::Internal
                    | Code::Unknown
            ),
            ErrorKind::NetworkFailure | ErrorKind::Timeout => true,
            ErrorKind::ConfigurationInvalid
            | ErrorKind::CannotDialTargetDirectly
            | ErrorKind::Serialization => false,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Rpc(code) => write!(f, "{code}"),
            ErrorKind::NetworkFailure => f.write_str("network_failure"),
            ErrorKind::Timeout => f.write_str("timeout"),
            ErrorKind::ConfigurationInvalid => f.write_str("configuration_invalid"),
            ErrorKind::CannotDialTargetDirectly => f.write_str("cannot_dial_target_directly"),
            ErrorKind::Serialization => f.write_str("serialization"),
        }
    }
}

/// The verdict for one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: ErrorKind,
    pub retryable: bool,
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Status(status) => ErrorKind::Rpc(status.code()),
            Error::Transport(TransportError::Network { .. }) => ErrorKind::NetworkFailure,
            Error::Transport(TransportError::Timeout { .. }) => ErrorKind::Timeout,
            Error::Transport(TransportError::CannotDialDirectly { .. }) => {
                ErrorKind::CannotDialTargetDirectly
            }
            Error::Configuration(_) => ErrorKind::ConfigurationInvalid,
            Error::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Returns true if the caller may retry after this error.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Classify an error as retryable or fatal.
pub fn classify(error: &Error) -> Classification {
    let kind = error.kind();
    Classification {
        kind,
        retryable: kind.is_retryable(),
    }
}

/// An error tagged with its classification.
///
/// The original error is kept intact as the source; `message` is its
/// display text.
#[derive(Debug)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub retryable: bool,
    pub message: String,
    pub source: Error,
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.retryable { "retryable" } else { "fatal" };
        write!(f, "{} ({})", self.message, verdict)
    }
}

impl std::error::Error for ClassifiedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl ClassifiedError {
    /// Returns the wrapped error.
    pub fn into_inner(self) -> Error {
        self.source
    }
}

impl From<Error> for ClassifiedError {
    fn from(source: Error) -> Self {
        let Classification { kind, retryable } = classify(&source);
        Self {
            kind,
            retryable,
            message: source.to_string(),
            source,
        }
    }
}
