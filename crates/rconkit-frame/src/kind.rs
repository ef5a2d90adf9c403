//! Packet kind tags.
//!
//! The protocol reuses kind 2 both as the execute-command request tag and
//! as the generic response tag, including the authentication acknowledgment.

/// Execute a command; also the server's generic response tag.
pub const EXEC: i32 = 2;

/// Authenticate with the server password.
pub const AUTH: i32 = 3;

/// Returns a human-readable name for a packet kind.
pub fn kind_name(kind: i32) -> &'static str {
    match kind {
        EXEC => "EXEC",
        AUTH => "AUTH",
        _ => "UNKNOWN",
    }
}
