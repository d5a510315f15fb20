use std::time::Duration;

/// Settings for the Connect HTTP client.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tether_connect::ConnectConfig;
///
/// let config = ConnectConfig::new()
///     .with_request_timeout(Duration::from_secs(5))
///     .with_insecure(true);
/// assert!(config.allow_insecure);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Deadline for a whole unary call. Streams are not bounded by it.
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Accept plain `http` for hosts other than loopback.
    pub allow_insecure: bool,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("tether/", env!("CARGO_PKG_VERSION")).to_string(),
            allow_insecure: false,
        }
    }
}

impl ConnectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the deadline for unary calls.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_insecure(mut self, allow_insecure: bool) -> Self {
        self.allow_insecure = allow_insecure;
        self
    }
}
