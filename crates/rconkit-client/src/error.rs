use std::time::Duration;

use rconkit_frame::FrameError;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// TCP establishment failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// I/O failure on the live socket.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame-level failure.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The server rejected the authentication handshake.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A request was issued while the connection is not ready.
    #[error("not connected")]
    NotConnected,

    /// No matching response arrived within the per-request deadline.
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// The connection dropped with the request in flight.
    #[error("connection lost with the request in flight")]
    ConnectionLost,

    /// Automatic reconnection gave up after the configured attempt budget.
    #[error("gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    /// The client handle was used after shutdown.
    #[error("client closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ClientError>;
