use std::collections::HashMap;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, timeout, Instant};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use rconkit_frame::{kind, Frame, RconCodec};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::event::ClientEvent;
use crate::state::ConnectionState;

pub(crate) type Transport = Framed<TcpStream, RconCodec>;

/// Commands sent from the [`crate::RconClient`] handle to the connection
/// task.
pub(crate) enum Command {
    Request {
        kind: i32,
        body: String,
        reply: oneshot::Sender<Result<Frame>>,
    },
    Reconnect,
    Disconnect,
}

/// One in-flight request. Resolved exactly once: by its response, its
/// deadline, or a disconnect, whichever comes first removes the entry.
struct PendingRequest {
    reply: oneshot::Sender<Result<Frame>>,
    deadline: Instant,
}

/// Why the serve loop stopped.
enum Exit {
    /// The handle asked for shutdown, or was dropped.
    Shutdown,
    /// The transport failed; recovery should be attempted.
    Lost(String),
}

/// Outcome of waiting while not connected.
enum Directive {
    Retry,
    Shutdown,
}

/// The connection task: sole owner of the socket, the pending-request
/// table, the attempt counter and the state publisher.
pub(crate) struct Connection {
    cfg: ClientConfig,
    cmd_rx: mpsc::Receiver<Command>,
    events: mpsc::Sender<ClientEvent>,
    state_tx: watch::Sender<ConnectionState>,
    pending: HashMap<i32, PendingRequest>,
    next_id: i32,
    attempts: u32,
}

impl Connection {
    pub(crate) fn new(
        cfg: ClientConfig,
        cmd_rx: mpsc::Receiver<Command>,
        events: mpsc::Sender<ClientEvent>,
        state_tx: watch::Sender<ConnectionState>,
        next_id: i32,
    ) -> Self {
        Self {
            cfg,
            cmd_rx,
            events,
            state_tx,
            pending: HashMap::new(),
            next_id,
            attempts: 0,
        }
    }

    /// Establish TCP and authenticate. Shared by the initial connect and
    /// every reconnect attempt.
    pub(crate) async fn establish(
        cfg: &ClientConfig,
        next_id: &mut i32,
        state_tx: &watch::Sender<ConnectionState>,
    ) -> Result<Transport> {
        let _ = state_tx.send(ConnectionState::Connecting);
        let addr = cfg.addr();
        debug!(%addr, "connecting");

        let stream = match timeout(cfg.connect_timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(ClientError::Connect { addr, source }),
            Err(_) => {
                return Err(ClientError::Connect {
                    addr,
                    source: std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"),
                })
            }
        };

        let _ = state_tx.send(ConnectionState::Authenticating);
        let mut transport = Framed::new(stream, RconCodec::default());
        let id = alloc_id(next_id);
        transport
            .send(Frame::new(id, kind::AUTH, cfg.password.clone()))
            .await?;

        let deadline = Instant::now() + cfg.connect_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ClientError::Auth("no authentication response".to_string()));
            }
            let frame = match timeout(remaining, transport.next()).await {
                Ok(Some(Ok(frame))) => frame,
                Ok(Some(Err(err))) => return Err(err.into()),
                Ok(None) => {
                    return Err(ClientError::Auth(
                        "connection closed during handshake".to_string(),
                    ))
                }
                Err(_) => return Err(ClientError::Auth("no authentication response".to_string())),
            };
            if frame.id != id {
                debug!(id = frame.id, "dropping stray frame during handshake");
                continue;
            }
            if frame.kind == kind::EXEC {
                info!(%addr, "authenticated");
                return Ok(transport);
            }
            return Err(ClientError::Auth(format!(
                "unexpected response kind {}",
                frame.kind
            )));
        }
    }

    /// Drive the connection until the handle shuts it down.
    pub(crate) async fn run(mut self, mut transport: Transport) {
        self.set_state(ConnectionState::Ready);
        loop {
            match self.serve(&mut transport).await {
                Exit::Shutdown => break,
                Exit::Lost(reason) => {
                    warn!(%reason, "connection lost");
                    self.fail_pending();
                    self.emit(ClientEvent::Disconnected { reason });
                    match self.recover().await {
                        Some(fresh) => transport = fresh,
                        None => break,
                    }
                }
            }
        }
        self.set_state(ConnectionState::Disconnected);
        debug!("connection task stopped");
    }

    /// Serve requests and dispatch responses while the transport is live.
    async fn serve(&mut self, transport: &mut Transport) -> Exit {
        loop {
            let next_deadline = self.pending.values().map(|p| p.deadline).min();
            let sweep_at =
                next_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    None | Some(Command::Disconnect) => return Exit::Shutdown,
                    Some(Command::Reconnect) => {
                        debug!("already connected; ignoring reconnect request");
                    }
                    Some(Command::Request { kind, body, reply }) => {
                        if let Some(exit) = self.submit(transport, kind, body, reply).await {
                            return exit;
                        }
                    }
                },
                frame = transport.next() => match frame {
                    Some(Ok(frame)) => self.resolve(frame),
                    Some(Err(err)) => return Exit::Lost(format!("read failed: {err}")),
                    None => return Exit::Lost("server closed the connection".to_string()),
                },
                _ = sleep_until(sweep_at), if next_deadline.is_some() => self.expire(),
            }
        }
    }

    /// Allocate an id, write the frame, and register the waiter.
    async fn submit(
        &mut self,
        transport: &mut Transport,
        kind: i32,
        body: String,
        reply: oneshot::Sender<Result<Frame>>,
    ) -> Option<Exit> {
        let id = alloc_id(&mut self.next_id);
        debug!(id, kind, "sending request");
        if let Err(err) = transport.send(Frame::new(id, kind, body)).await {
            let reason = format!("write failed: {err}");
            let _ = reply.send(Err(err.into()));
            return Some(Exit::Lost(reason));
        }
        let deadline = Instant::now() + self.cfg.request_timeout;
        self.pending.insert(id, PendingRequest { reply, deadline });
        None
    }

    /// Dispatch a decoded frame to its waiter. Responses correlate strictly
    /// by id; strays and duplicates are dropped.
    fn resolve(&mut self, frame: Frame) {
        match self.pending.remove(&frame.id) {
            Some(pending) => {
                if pending.reply.send(Ok(frame)).is_err() {
                    debug!("waiter dropped before its response arrived");
                }
            }
            None => debug!(id = frame.id, "dropping response with no registered waiter"),
        }
    }

    /// Reject requests whose deadline has passed and remove their entries.
    fn expire(&mut self) {
        let now = Instant::now();
        let expired: Vec<i32> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            if let Some(pending) = self.pending.remove(&id) {
                warn!(id, "request timed out");
                let _ = pending
                    .reply
                    .send(Err(ClientError::Timeout(self.cfg.request_timeout)));
            }
        }
    }

    /// Reject every in-flight request immediately rather than letting each
    /// deadline expire on its own.
    fn fail_pending(&mut self) {
        for (id, pending) in self.pending.drain() {
            debug!(id, "rejecting in-flight request");
            let _ = pending.reply.send(Err(ClientError::ConnectionLost));
        }
    }

    /// Reconnect-with-backoff cycle. Returns a fresh transport, or `None`
    /// when the task should stop.
    async fn recover(&mut self) -> Option<Transport> {
        loop {
            if self.attempts >= self.cfg.max_reconnect_attempts {
                let attempts = self.attempts;
                warn!(attempts, "reconnect attempts exhausted");
                self.set_state(ConnectionState::Failed);
                self.emit(ClientEvent::ReconnectExhausted { attempts });
                match self.wait_for_directive().await {
                    Directive::Retry => {
                        self.attempts = 0;
                        continue;
                    }
                    Directive::Shutdown => return None,
                }
            }

            self.attempts += 1;
            let attempt = self.attempts;
            self.set_state(ConnectionState::ReconnectWaiting);
            info!(
                attempt,
                max = self.cfg.max_reconnect_attempts,
                "scheduling reconnect"
            );
            self.emit(ClientEvent::ReconnectScheduled {
                attempt,
                delay: self.cfg.reconnect_delay,
            });
            if let Directive::Shutdown = self.wait_delay(self.cfg.reconnect_delay).await {
                return None;
            }

            match Self::establish(&self.cfg, &mut self.next_id, &self.state_tx).await {
                Ok(transport) => {
                    self.attempts = 0;
                    self.set_state(ConnectionState::Ready);
                    self.emit(ClientEvent::Connected);
                    return Some(transport);
                }
                Err(ClientError::Auth(reason)) => {
                    warn!(%reason, "authentication rejected during reconnect");
                    self.emit(ClientEvent::AuthRejected {
                        reason: reason.clone(),
                    });
                    if !self.cfg.retry_on_auth_failure {
                        // Fail fast instead of spinning on a bad password.
                        self.set_state(ConnectionState::Failed);
                        match self.wait_for_directive().await {
                            Directive::Retry => {
                                self.attempts = 0;
                                continue;
                            }
                            Directive::Shutdown => return None,
                        }
                    }
                }
                Err(err) => warn!(error = %err, "reconnect attempt failed"),
            }
        }
    }

    /// Sleep out the backoff delay while staying responsive to commands.
    /// Requests arriving here are rejected with `NotConnected`; an explicit
    /// reconnect request skips the rest of the delay and resets the budget.
    async fn wait_delay(&mut self, delay: Duration) -> Directive {
        let deadline = Instant::now() + delay;
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => return Directive::Retry,
                cmd = self.cmd_rx.recv() => match cmd {
                    None | Some(Command::Disconnect) => return Directive::Shutdown,
                    Some(Command::Reconnect) => {
                        self.attempts = 0;
                        return Directive::Retry;
                    }
                    Some(Command::Request { reply, .. }) => {
                        let _ = reply.send(Err(ClientError::NotConnected));
                    }
                },
            }
        }
    }

    /// Block in `Failed` until the caller explicitly reconnects or shuts
    /// down. No implicit retries happen here.
    async fn wait_for_directive(&mut self) -> Directive {
        loop {
            match self.cmd_rx.recv().await {
                None | Some(Command::Disconnect) => return Directive::Shutdown,
                Some(Command::Reconnect) => return Directive::Retry,
                Some(Command::Request { reply, .. }) => {
                    let _ = reply.send(Err(ClientError::NotConnected));
                }
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        let _ = self.state_tx.send(state);
    }

    fn emit(&self, event: ClientEvent) {
        if self.events.try_send(event).is_err() {
            debug!("lifecycle event dropped (receiver gone or lagging)");
        }
    }
}

/// Next correlation id: wrapping 32-bit monotonic counter. An id is only
/// reused after its prior owner resolved, was rejected, or timed out.
fn alloc_id(next_id: &mut i32) -> i32 {
    let id = *next_id;
    *next_id = next_id.wrapping_add(1);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_allocation_is_monotonic_and_wraps() {
        let mut next = 0i32;
        assert_eq!(alloc_id(&mut next), 0);
        assert_eq!(alloc_id(&mut next), 1);

        let mut next = i32::MAX;
        assert_eq!(alloc_id(&mut next), i32::MAX);
        assert_eq!(alloc_id(&mut next), i32::MIN);
    }
}
