//! Integration tests against an in-process mock RCON server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::codec::Framed;

use rconkit_client::{ClientConfig, ClientError, ClientEvent, ConnectionState, RconClient};
use rconkit_frame::{kind, Frame, RconCodec};

type ServerSide = Framed<TcpStream, RconCodec>;

const TEST_DEADLINE: Duration = Duration::from_secs(5);

async fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let port = listener.local_addr().expect("local addr").port();
    (listener, port)
}

/// Accept one connection and answer its authentication handshake.
async fn accept_and_auth(listener: &TcpListener) -> ServerSide {
    let (stream, _) = listener.accept().await.expect("accept should succeed");
    let mut framed = Framed::new(stream, RconCodec::default());
    let frame = framed
        .next()
        .await
        .expect("auth frame expected")
        .expect("auth frame should decode");
    assert_eq!(frame.kind, kind::AUTH);
    assert_eq!(frame.body_text(), "hunter2");
    framed
        .send(Frame::new(frame.id, kind::EXEC, ""))
        .await
        .expect("auth ack should send");
    framed
}

fn test_config(port: u16) -> ClientConfig {
    let mut cfg = ClientConfig::new("127.0.0.1", port, "hunter2");
    cfg.connect_timeout = Duration::from_secs(2);
    cfg.request_timeout = Duration::from_millis(400);
    cfg.reconnect_delay = Duration::from_millis(50);
    cfg
}

#[tokio::test]
async fn command_roundtrip() {
    let (listener, port) = bind().await;
    let server = tokio::spawn(async move {
        let mut framed = accept_and_auth(&listener).await;
        while let Some(Ok(frame)) = framed.next().await {
            let body = format!("re:{}", frame.body_text());
            framed
                .send(Frame::new(frame.id, kind::EXEC, body))
                .await
                .expect("response should send");
        }
    });

    let (client, _events) = RconClient::connect(test_config(port))
        .await
        .expect("connect should succeed");
    assert_eq!(client.state(), ConnectionState::Ready);

    let response = client
        .send_command("status")
        .await
        .expect("command should succeed");
    assert_eq!(response, "re:status");

    client.disconnect().await;
    server.abort();
}

#[tokio::test]
async fn pipelined_responses_correlate_by_id() {
    let (listener, port) = bind().await;
    let server = tokio::spawn(async move {
        let mut framed = accept_and_auth(&listener).await;
        let first = framed.next().await.expect("req 1").expect("decode");
        let second = framed.next().await.expect("req 2").expect("decode");
        // Answer in reverse order; correlation must be by id, not arrival.
        for frame in [second, first] {
            let body = format!("re:{}", frame.body_text());
            framed
                .send(Frame::new(frame.id, kind::EXEC, body))
                .await
                .expect("response should send");
        }
    });

    let (client, _events) = RconClient::connect(test_config(port))
        .await
        .expect("connect should succeed");

    let (one, two) = tokio::join!(client.send_command("one"), client.send_command("two"));
    assert_eq!(one.expect("first should resolve"), "re:one");
    assert_eq!(two.expect("second should resolve"), "re:two");

    client.disconnect().await;
    server.await.expect("server should finish");
}

#[tokio::test]
async fn timeout_rejects_and_late_response_is_dropped() {
    let (listener, port) = bind().await;
    let server = tokio::spawn(async move {
        let mut framed = accept_and_auth(&listener).await;
        let stale = framed.next().await.expect("req").expect("decode");
        // Sit on the response until well past the client's deadline.
        tokio::time::sleep(Duration::from_millis(700)).await;
        framed
            .send(Frame::new(stale.id, kind::EXEC, "too late"))
            .await
            .expect("late response should send");
        // The next request must still be served normally.
        let fresh = framed.next().await.expect("req").expect("decode");
        framed
            .send(Frame::new(fresh.id, kind::EXEC, "on time"))
            .await
            .expect("response should send");
    });

    let (client, _events) = RconClient::connect(test_config(port))
        .await
        .expect("connect should succeed");

    let err = client
        .send_command("slow")
        .await
        .expect_err("deadline should reject the request");
    assert!(matches!(err, ClientError::Timeout(_)), "got {err:?}");

    // Give the late frame time to arrive; it must be dropped, not
    // mis-delivered to the next request.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let response = client
        .send_command("next")
        .await
        .expect("follow-up should succeed");
    assert_eq!(response, "on time");

    client.disconnect().await;
    server.await.expect("server should finish");
}

#[tokio::test]
async fn pending_requests_rejected_immediately_on_disconnect() {
    let (listener, port) = bind().await;
    let server = tokio::spawn(async move {
        let mut framed = accept_and_auth(&listener).await;
        let _ = framed.next().await;
        // Drop the connection with the request still pending.
    });

    let mut cfg = test_config(port);
    cfg.request_timeout = Duration::from_secs(30);
    let (client, _events) = RconClient::connect(cfg)
        .await
        .expect("connect should succeed");

    // The rejection must come from the disconnect, not from the 30s
    // deadline, so bound the wait well below it.
    let result = timeout(TEST_DEADLINE, client.send_command("doomed"))
        .await
        .expect("rejection should be prompt");
    let err = result.expect_err("in-flight request should be rejected");
    assert!(matches!(err, ClientError::ConnectionLost), "got {err:?}");

    server.await.expect("server should finish");
}

#[tokio::test]
async fn reconnects_after_connection_drop() {
    let (listener, port) = bind().await;
    let server = tokio::spawn(async move {
        // First session: authenticate, then drop immediately.
        let framed = accept_and_auth(&listener).await;
        drop(framed);
        // Second session: serve one command.
        let mut framed = accept_and_auth(&listener).await;
        if let Some(Ok(frame)) = framed.next().await {
            framed
                .send(Frame::new(frame.id, kind::EXEC, "back"))
                .await
                .expect("response should send");
        }
    });

    let (client, _events) = RconClient::connect(test_config(port))
        .await
        .expect("connect should succeed");

    let mut states = client.state_watch();
    timeout(TEST_DEADLINE, async {
        loop {
            states.changed().await.expect("state channel should live");
            if states.borrow_and_update().is_ready() {
                break;
            }
        }
    })
    .await
    .expect("client should become ready again");

    let response = client
        .send_command("hello")
        .await
        .expect("command after reconnect should succeed");
    assert_eq!(response, "back");

    client.disconnect().await;
    server.await.expect("server should finish");
}

#[tokio::test]
async fn exhaustion_event_fires_exactly_once() {
    let (listener, port) = bind().await;
    // Authenticate once, then drop the session *and* the listener so every
    // reconnect attempt is refused.
    let server = tokio::spawn(async move {
        let framed = accept_and_auth(&listener).await;
        drop(listener);
        framed
    });

    let mut cfg = test_config(port);
    cfg.max_reconnect_attempts = 2;
    let (client, mut events) = RconClient::connect(cfg)
        .await
        .expect("connect should succeed");
    let framed = server.await.expect("server should finish");
    drop(framed);

    let mut exhausted = 0u32;
    let mut scheduled = 0u32;
    timeout(TEST_DEADLINE, async {
        while let Some(event) = events.recv().await {
            match event {
                ClientEvent::ReconnectExhausted { attempts } => {
                    assert_eq!(attempts, 2);
                    exhausted += 1;
                    break;
                }
                ClientEvent::ReconnectScheduled { .. } => scheduled += 1,
                _ => {}
            }
        }
    })
    .await
    .expect("exhaustion should be reported");

    assert_eq!(exhausted, 1);
    assert_eq!(scheduled, 2);
    assert_eq!(client.state(), ConnectionState::Failed);

    // No implicit retries after exhaustion: the channel stays quiet.
    let extra = timeout(Duration::from_millis(300), events.recv()).await;
    assert!(extra.is_err(), "no further events expected, got {extra:?}");

    let err = client
        .send_command("status")
        .await
        .expect_err("requests must be refused while failed");
    assert!(matches!(err, ClientError::NotConnected), "got {err:?}");
}

#[tokio::test]
async fn auth_failure_fails_fast_when_retry_disabled() {
    let (listener, port) = bind().await;
    let server = tokio::spawn(async move {
        // First session authenticates cleanly, then drops.
        let framed = accept_and_auth(&listener).await;
        drop(framed);
        // Reconnect attempt: reject the password with a non-ack kind.
        let (stream, _) = listener.accept().await.expect("accept should succeed");
        let mut framed = Framed::new(stream, RconCodec::default());
        let frame = framed.next().await.expect("auth frame").expect("decode");
        framed
            .send(Frame::new(frame.id, 0, "denied"))
            .await
            .expect("rejection should send");
    });

    let mut cfg = test_config(port);
    cfg.retry_on_auth_failure = false;
    let (client, mut events) = RconClient::connect(cfg)
        .await
        .expect("initial connect should succeed");

    timeout(TEST_DEADLINE, async {
        loop {
            match events.recv().await {
                Some(ClientEvent::AuthRejected { .. }) => break,
                Some(_) => {}
                None => panic!("event channel closed before auth rejection"),
            }
        }
    })
    .await
    .expect("auth rejection should be reported");

    let mut states = client.state_watch();
    timeout(TEST_DEADLINE, async {
        while *states.borrow_and_update() != ConnectionState::Failed {
            states.changed().await.expect("state channel should live");
        }
    })
    .await
    .expect("client should fail fast on rejected credentials");

    server.await.expect("server should finish");
}

#[tokio::test]
async fn connect_surfaces_bad_password() {
    let (listener, port) = bind().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept should succeed");
        let mut framed = Framed::new(stream, RconCodec::default());
        let frame = framed.next().await.expect("auth frame").expect("decode");
        framed
            .send(Frame::new(frame.id, 0, "denied"))
            .await
            .expect("rejection should send");
    });

    let err = RconClient::connect(test_config(port))
        .await
        .expect_err("connect should be rejected");
    assert!(matches!(err, ClientError::Auth(_)), "got {err:?}");

    server.await.expect("server should finish");
}

#[tokio::test]
async fn connect_surfaces_unreachable_server() {
    let (listener, port) = bind().await;
    drop(listener);

    let err = RconClient::connect(test_config(port))
        .await
        .expect_err("connect should fail");
    assert!(matches!(err, ClientError::Connect { .. }), "got {err:?}");
}

#[tokio::test]
async fn facade_degrades_to_defaults_when_not_connected() {
    let (listener, port) = bind().await;
    let server = tokio::spawn(async move {
        let framed = accept_and_auth(&listener).await;
        drop(listener);
        framed
    });

    let mut cfg = test_config(port);
    cfg.max_reconnect_attempts = 1;
    let (client, mut events) = RconClient::connect(cfg)
        .await
        .expect("connect should succeed");
    let framed = server.await.expect("server should finish");
    drop(framed);

    timeout(TEST_DEADLINE, async {
        loop {
            match events.recv().await {
                Some(ClientEvent::ReconnectExhausted { .. }) => break,
                Some(_) => {}
                None => panic!("event channel closed early"),
            }
        }
    })
    .await
    .expect("exhaustion should be reported");

    // The typed queries never error; they return safe defaults.
    assert!(client.get_player_info().await.is_empty());
    assert_eq!(client.get_current_map().await.name, "Unknown Map");
    assert_eq!(
        client.get_game_state().await,
        rconkit_client::GameState::default()
    );
}
