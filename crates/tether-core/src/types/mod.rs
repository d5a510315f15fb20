//! Endpoint and method identity types.
//!
//! These types are validated at construction time, so a transport can
//! never be built for a malformed target or issue a call to a malformed
//! method.

mod endpoint;
mod method;

pub use endpoint::Endpoint;
pub use method::MethodPath;
