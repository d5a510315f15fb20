//! Core traits for channels and interceptors.

mod channel;
mod interceptor;

pub use channel::{Channel, ChannelFactory};
pub use interceptor::{Interceptor, Next};
