use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

use rconkit_client::query;
use rconkit_frame::{kind, Frame, RconCodec};
use rconkit_telemetry::maps;

use crate::cmd::{connect, DoctorArgs};
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

/// Step-by-step connection probe: raw TCP, raw handshake frame exchange,
/// then a full client session issuing one telemetry query.
pub async fn run(args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let mut checks = Vec::new();

    let tcp = tcp_connect_check(&args).await;
    let tcp_passed = matches!(tcp.status, CheckStatus::Pass);
    checks.push(tcp);

    if tcp_passed {
        checks.push(handshake_check(&args).await);
        checks.push(telemetry_check(&args).await);
    } else {
        checks.push(skipped("handshake", "tcp connect failed"));
        checks.push(skipped("telemetry_query", "tcp connect failed"));
    }

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput { checks, overall };
    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

async fn tcp_connect_check(args: &DoctorArgs) -> CheckResult {
    let addr = format!("{}:{}", args.conn.host, args.conn.port);
    let started = Instant::now();
    match timeout(PROBE_TIMEOUT, TcpStream::connect(&addr)).await {
        Ok(Ok(_stream)) => CheckResult {
            name: "tcp_connect".to_string(),
            status: CheckStatus::Pass,
            detail: format!("{addr} reachable in {:?}", started.elapsed()),
        },
        Ok(Err(err)) => CheckResult {
            name: "tcp_connect".to_string(),
            status: CheckStatus::Fail,
            detail: format!("{addr}: {err}"),
        },
        Err(_) => CheckResult {
            name: "tcp_connect".to_string(),
            status: CheckStatus::Fail,
            detail: format!("{addr}: connect timed out"),
        },
    }
}

/// Raw frame exchange, bypassing the client: send one AUTH frame, report
/// what kind of response comes back.
async fn handshake_check(args: &DoctorArgs) -> CheckResult {
    let name = "handshake".to_string();
    let addr = format!("{}:{}", args.conn.host, args.conn.port);

    let probe = async {
        let stream = TcpStream::connect(&addr).await?;
        let mut framed = Framed::new(stream, RconCodec::default());
        framed
            .send(Frame::new(0, kind::AUTH, args.conn.password.clone()))
            .await
            .map_err(std::io::Error::other)?;
        match framed.next().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(err)) => Err(std::io::Error::other(err)),
            None => Ok(None),
        }
    };

    match timeout(PROBE_TIMEOUT, probe).await {
        Ok(Ok(Some(frame))) if frame.kind == kind::EXEC => CheckResult {
            name,
            status: CheckStatus::Pass,
            detail: format!("password accepted (response kind {})", frame.kind),
        },
        Ok(Ok(Some(frame))) => CheckResult {
            name,
            status: CheckStatus::Fail,
            detail: format!(
                "unexpected response kind {} ({}), wrong password?",
                frame.kind,
                kind::kind_name(frame.kind)
            ),
        },
        Ok(Ok(None)) => CheckResult {
            name,
            status: CheckStatus::Fail,
            detail: "server closed the connection during the handshake".to_string(),
        },
        Ok(Err(err)) => CheckResult {
            name,
            status: CheckStatus::Fail,
            detail: format!("handshake I/O failed: {err}"),
        },
        Err(_) => CheckResult {
            name,
            status: CheckStatus::Fail,
            detail: "no handshake response before the probe deadline".to_string(),
        },
    }
}

/// Full client session: connect, authenticate, resolve the active map.
async fn telemetry_check(args: &DoctorArgs) -> CheckResult {
    let name = "telemetry_query".to_string();
    let (client, _events) = match connect(&args.conn).await {
        Ok(pair) => pair,
        Err(err) => {
            return CheckResult {
                name,
                status: CheckStatus::Fail,
                detail: format!("client connect failed: {err}"),
            }
        }
    };

    let result = match client.send_command(query::MAP).await {
        Ok(body) => {
            let map = maps::lookup(&maps::parse_map_name(&body));
            CheckResult {
                name,
                status: CheckStatus::Pass,
                detail: format!("active map resolved to {} ({})", map.name, map.file_key),
            }
        }
        Err(err) => CheckResult {
            name,
            status: CheckStatus::Fail,
            detail: format!("map query failed: {err}"),
        },
    };

    client.disconnect().await;
    result
}

fn skipped(name: &str, reason: &str) -> CheckResult {
    CheckResult {
        name: name.to_string(),
        status: CheckStatus::Skip,
        detail: reason.to_string(),
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("rconkit doctor\n");
            for c in &output.checks {
                println!("  [{:>4}] {:<18} {}", status_text(c.status), c.name, c.detail);
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Skip => "SKIP",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_output_serializes_overall_status() {
        let output = DoctorOutput {
            checks: vec![CheckResult {
                name: "tcp_connect".to_string(),
                status: CheckStatus::Pass,
                detail: "ok".to_string(),
            }],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).expect("doctor output should serialize");
        assert!(json.contains("\"overall\":\"pass\""));
        assert!(json.contains("\"status\":\"pass\""));
    }
}
