use std::fmt;

/// Connection lifecycle state, published on a watch channel by the
/// connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and none in progress.
    Disconnected,
    /// TCP establishment in progress.
    Connecting,
    /// TCP established, waiting for the authentication acknowledgment.
    Authenticating,
    /// Authenticated; requests may be issued.
    Ready,
    /// Connection lost; a retry is scheduled.
    ReconnectWaiting,
    /// Automatic recovery abandoned; an explicit reconnect is required.
    Failed,
}

impl ConnectionState {
    /// Whether new requests may be issued.
    pub fn is_ready(self) -> bool {
        matches!(self, ConnectionState::Ready)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Authenticating => "authenticating",
            ConnectionState::Ready => "ready",
            ConnectionState::ReconnectWaiting => "reconnect-waiting",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ready_admits_requests() {
        assert!(ConnectionState::Ready.is_ready());
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Authenticating,
            ConnectionState::ReconnectWaiting,
            ConnectionState::Failed,
        ] {
            assert!(!state.is_ready(), "{state} must not admit requests");
        }
    }
}
