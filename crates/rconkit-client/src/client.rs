use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::warn;

use rconkit_frame::{kind, Frame};
use rconkit_telemetry::{maps, parse_game_state, parse_player_info, GameState, MapInfo, Player};

use crate::config::ClientConfig;
use crate::conn::{Command, Connection};
use crate::error::{ClientError, Result};
use crate::event::ClientEvent;
use crate::state::ConnectionState;

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Queries understood by the game server.
pub mod query {
    /// Player list, one colon-delimited entry per line.
    pub const PLAYER_INFO: &str = "get playerinfo";
    /// Active map identifier.
    pub const MAP: &str = "get map";
    /// Score and timer state.
    pub const GAME_STATE: &str = "get gamestate";
}

/// Handle to a live RCON connection.
///
/// All methods take `&self` except [`RconClient::disconnect`]; requests
/// issued concurrently are pipelined over the single connection. The
/// socket and all mutable connection state live in a background task;
/// the handle only exchanges messages with it.
pub struct RconClient {
    cmd_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
    task: Option<JoinHandle<()>>,
}

impl RconClient {
    /// Connect and authenticate.
    ///
    /// Returns the handle together with the lifecycle event receiver. The
    /// initial connect and handshake run inline so reachability and
    /// credential problems surface here; later recovery is automatic.
    pub async fn connect(cfg: ClientConfig) -> Result<(Self, mpsc::Receiver<ClientEvent>)> {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let mut next_id = 0i32;

        let transport = match Connection::establish(&cfg, &mut next_id, &state_tx).await {
            Ok(transport) => transport,
            Err(err) => {
                let _ = state_tx.send(ConnectionState::Disconnected);
                return Err(err);
            }
        };

        // Publish readiness before the task spawns so a request issued
        // right after connect() returns is admitted.
        let _ = state_tx.send(ConnectionState::Ready);

        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(cfg.event_capacity.max(1));
        let _ = event_tx.try_send(ClientEvent::Connected);

        let conn = Connection::new(cfg, cmd_rx, event_tx, state_tx, next_id);
        let task = tokio::spawn(conn.run(transport));

        Ok((
            Self {
                cmd_tx,
                state_rx,
                task: Some(task),
            },
            event_rx,
        ))
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Watch receiver for observing state transitions.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Send a raw command and return the response body.
    ///
    /// Requires the connection to be ready; fails with
    /// [`ClientError::NotConnected`] otherwise.
    pub async fn send_command(&self, command: &str) -> Result<String> {
        let frame = self.request(kind::EXEC, command).await?;
        Ok(frame.body_text().into_owned())
    }

    /// Fetch and parse the player list.
    ///
    /// Failures of any kind degrade to an empty list so a periodic refresh
    /// loop never aborts on a single bad round-trip.
    pub async fn get_player_info(&self) -> Vec<Player> {
        match self.send_command(query::PLAYER_INFO).await {
            Ok(body) => parse_player_info(&body),
            Err(err) => {
                warn!(error = %err, "player info query failed");
                Vec::new()
            }
        }
    }

    /// Fetch the active map, resolved against the catalog. Failures
    /// degrade to the unknown-map entry.
    pub async fn get_current_map(&self) -> MapInfo {
        match self.send_command(query::MAP).await {
            Ok(body) => maps::lookup(&maps::parse_map_name(&body)),
            Err(err) => {
                warn!(error = %err, "map query failed");
                maps::UNKNOWN_MAP
            }
        }
    }

    /// Fetch score/timer state. Failures degrade to the zeroed defaults.
    pub async fn get_game_state(&self) -> GameState {
        match self.send_command(query::GAME_STATE).await {
            Ok(body) => parse_game_state(&body),
            Err(err) => {
                warn!(error = %err, "game state query failed");
                GameState::default()
            }
        }
    }

    /// Reset the attempt budget and force a fresh connect cycle. Use after
    /// automatic recovery has given up and the connection is `Failed`.
    pub async fn reconnect(&self) -> Result<()> {
        self.cmd_tx
            .send(Command::Reconnect)
            .await
            .map_err(|_| ClientError::Closed)
    }

    /// Shut down the connection task and close the socket.
    pub async fn disconnect(mut self) {
        let _ = self.cmd_tx.send(Command::Disconnect).await;
        if let Some(mut task) = self.task.take() {
            if timeout(SHUTDOWN_TIMEOUT, &mut task).await.is_err() {
                warn!("connection task did not stop in time; aborting");
                task.abort();
            }
        }
    }

    async fn request(&self, kind: i32, body: &str) -> Result<Frame> {
        if !self.state().is_ready() {
            return Err(ClientError::NotConnected);
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Request {
                kind,
                body: body.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| ClientError::Closed)?;
        reply_rx.await.map_err(|_| ClientError::Closed)?
    }
}

impl std::fmt::Debug for RconClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RconClient")
            .field("state", &self.state())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for RconClient {
    fn drop(&mut self) {
        // Drop is synchronous, so a graceful shutdown cannot be awaited
        // here; abort so the task does not outlive the handle.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
