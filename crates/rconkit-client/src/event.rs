use std::time::Duration;

/// Lifecycle notifications emitted on the event channel returned from
/// [`crate::RconClient::connect`].
///
/// Events carry what a supervising layer needs to surface operator-visible
/// status; they are advisory and may be dropped if the receiver lags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// TCP plus authentication completed; requests may be issued.
    Connected,
    /// The connection dropped or errored.
    Disconnected { reason: String },
    /// A reconnect attempt has been scheduled.
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// The server rejected the password during a reconnect cycle.
    AuthRejected { reason: String },
    /// Automatic recovery has been abandoned; an explicit reconnect is
    /// required. Emitted once per exhaustion.
    ReconnectExhausted { attempts: u32 },
}
