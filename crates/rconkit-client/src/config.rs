use std::fmt;
use std::time::Duration;

/// Timeout for TCP establishment and the authentication exchange.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-request response deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between automatic reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Automatic reconnect attempts before giving up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Capacity of the lifecycle event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration for an [`crate::RconClient`] connection.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server hostname or IP address.
    pub host: String,
    /// Server RCON port.
    pub port: u16,
    /// RCON password, sent during the authentication handshake.
    /// Treated as credential material and redacted in debug output.
    pub password: String,
    /// Timeout for TCP establishment and the authentication exchange.
    pub connect_timeout: Duration,
    /// Per-request response deadline.
    pub request_timeout: Duration,
    /// Pause between automatic reconnect attempts.
    pub reconnect_delay: Duration,
    /// Automatic reconnect attempts before giving up.
    pub max_reconnect_attempts: u32,
    /// Whether a rejected password feeds the same retry loop as transport
    /// failures. Disable to fail fast instead of spinning on credentials
    /// that will never be accepted.
    pub retry_on_auth_failure: bool,
    /// Capacity of the lifecycle event channel.
    pub event_capacity: usize,
}

impl ClientConfig {
    /// Create a configuration with default timeouts and retry policy.
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            retry_on_auth_failure: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// `host:port` as a connect address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "password",
                &format_args!("<redacted:{} bytes>", self.password.len()),
            )
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("max_reconnect_attempts", &self.max_reconnect_attempts)
            .field("retry_on_auth_failure", &self.retry_on_auth_failure)
            .finish()
    }
}
