//! End-to-end smoke tests: spawn the compiled binary against an
//! in-process mock server speaking the wire protocol.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::process::Command;
use std::thread;

use bytes::BytesMut;

use rconkit_frame::{decode_frame, encode_frame, kind, DEFAULT_MAX_BODY};

/// Serve one connection: ack authentication, echo every command body back
/// prefixed with `ok:`.
fn spawn_mock_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let port = listener.local_addr().expect("local addr").port();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept should succeed");
        let mut buf = BytesMut::new();
        let mut chunk = [0u8; 4096];

        loop {
            while let Some(frame) = decode_frame(&mut buf, DEFAULT_MAX_BODY).expect("decode") {
                let body = if frame.kind == kind::AUTH {
                    String::new()
                } else {
                    format!("ok:{}", frame.body_text())
                };
                let mut out = BytesMut::new();
                encode_frame(frame.id, kind::EXEC, body.as_bytes(), &mut out).expect("encode");
                if stream.write_all(&out).is_err() {
                    return;
                }
            }
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
    });

    port
}

fn rconkit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rconkit"))
}

#[test]
fn exec_roundtrip_through_binary() {
    let port = spawn_mock_server();

    let output = rconkit()
        .args([
            "--format",
            "raw",
            "--log-level",
            "error",
            "exec",
            "--host",
            "127.0.0.1",
            "--port",
            &port.to_string(),
            "--password",
            "pw",
            "status",
        ])
        .output()
        .expect("binary should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "ok:status\n");
}

#[test]
fn connection_args_fall_back_to_environment() {
    let port = spawn_mock_server();

    let output = rconkit()
        .args(["--format", "raw", "--log-level", "error", "exec", "ping"])
        .env("RCON_HOST", "127.0.0.1")
        .env("RCON_PORT", port.to_string())
        .env("RCON_PASSWORD", "pw")
        .output()
        .expect("binary should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "ok:ping\n");
}

#[test]
fn unreachable_server_exits_nonzero() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let output = rconkit()
        .args([
            "--log-level",
            "error",
            "map",
            "--host",
            "127.0.0.1",
            "--port",
            &port.to_string(),
            "--password",
            "pw",
        ])
        .output()
        .expect("binary should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("connect failed"), "stderr: {stderr}");
}

#[test]
fn version_prints_crate_version() {
    let output = rconkit()
        .args(["version"])
        .output()
        .expect("binary should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "stdout: {stdout}");
}
