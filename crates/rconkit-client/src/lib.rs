//! Async RCON client: connection management, request correlation, and the
//! typed telemetry façade.
//!
//! [`RconClient`] is a thin handle. The socket, the pending-request table
//! and the reconnect state machine all live in a background task that the
//! handle talks to over channels; no other component touches the
//! connection directly. Multiple requests may be in flight at once over
//! the single connection; responses are correlated strictly by id, never
//! by arrival order.

pub mod client;
pub mod config;
mod conn;
pub mod error;
pub mod event;
pub mod state;

pub use client::{query, RconClient};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use event::ClientEvent;
pub use state::ConnectionState;

// Entity types returned by the telemetry façade.
pub use rconkit_telemetry::{GameState, MapInfo, Player, Position, Team};
