//! Connect error bodies and status mapping.

use reqwest::StatusCode;
use serde::Deserialize;
use tether_core::{Code, Error, Status, TransportError};

/// Error body of a failed unary call, and of an end-stream trailer.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn into_status(self, fallback: Code) -> Status {
        let code = self
            .code
            .as_deref()
            .map(|code| code.parse().unwrap_or(Code::Unknown))
            .unwrap_or(fallback);
        Status::new(code, self.message.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct EndStream {
    #[serde(default)]
    error: Option<ErrorBody>,
}

/// The code implied by an HTTP status when the body carries none.
pub(crate) fn code_for_http(status: StatusCode) -> Code {
    match status.as_u16() {
        400 => Code::Internal,
        401 => Code::Unauthenticated,
        403 => Code::PermissionDenied,
        404 => Code::Unimplemented,
        408 => Code::DeadlineExceeded,
        409 => Code::Aborted,
        412 => Code::FailedPrecondition,
        413 => Code::ResourceExhausted,
        415 => Code::Internal,
        429 | 502 | 503 | 504 => Code::Unavailable,
        _ => Code::Unknown,
    }
}

/// Build the status of a failed unary call from its HTTP status and body.
pub(crate) fn unary_error(status: StatusCode, body: &[u8]) -> Status {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(error) if error.code.is_some() => error.into_status(code_for_http(status)),
        _ => {
            let message = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            Status::new(code_for_http(status), message)
        }
    }
}

/// Interpret an end-stream trailer. `Ok` means the stream ended cleanly.
pub(crate) fn end_stream(payload: &[u8]) -> Result<(), Error> {
    if payload.is_empty() {
        return Ok(());
    }

    let trailer: EndStream = serde_json::from_slice(payload)
        .map_err(|e| Status::internal(format!("malformed end-stream trailer: {e}")))?;

    match trailer.error {
        Some(error) => Err(error.into_status(Code::Unknown).into()),
        None => Ok(()),
    }
}

/// Map a client error onto the transport taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    if err.is_timeout() {
        TransportError::Timeout { message }.into()
    } else {
        TransportError::Network { message }.into()
    }
}
