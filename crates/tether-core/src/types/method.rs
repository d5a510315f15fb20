//! Method identity type.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigurationError, Error};

/// A fully qualified RPC method, `package.Service/Method`.
///
/// # Example
///
/// ```
/// use tether_core::MethodPath;
///
/// let method = MethodPath::parse("robot.v1.RobotService/GetStatus").unwrap();
/// assert_eq!(method.service(), "robot.v1.RobotService");
/// assert_eq!(method.method(), "GetStatus");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodPath {
    service: String,
    method: String,
}

impl MethodPath {
    /// Parse a method path, tolerating one leading `/`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless the input is exactly one
    /// non-empty service name and one non-empty method name separated by `/`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| ConfigurationError::InvalidMethod {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let path = s.strip_prefix('/').unwrap_or(s);
        let (service, method) = path
            .split_once('/')
            .ok_or_else(|| invalid("expected 'package.Service/Method'"))?;

        if service.is_empty() || method.is_empty() {
            return Err(invalid("service and method must not be empty").into());
        }
        if method.contains('/') {
            return Err(invalid("method must not contain '/'").into());
        }

        Ok(Self {
            service: service.to_string(),
            method: method.to_string(),
        })
    }

    /// Returns the service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the method name.
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for MethodPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.method)
    }
}

impl FromStr for MethodPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
