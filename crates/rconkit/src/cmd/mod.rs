use std::time::Duration;

use clap::{Args, Subcommand};
use tokio::sync::mpsc;

use rconkit_client::{ClientConfig, ClientEvent, RconClient};

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod exec;
pub mod gamestate;
pub mod map;
pub mod players;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a raw command and print the response body.
    Exec(ExecArgs),
    /// Fetch and print the player list.
    Players(PlayersArgs),
    /// Fetch and print the active map.
    Map(MapArgs),
    /// Fetch and print score and timer state.
    Gamestate(GamestateArgs),
    /// Periodically refresh players, map and game state.
    Watch(WatchArgs),
    /// Probe connectivity and authentication step by step.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub async fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Exec(args) => exec::run(args, format).await,
        Command::Players(args) => players::run(args, format).await,
        Command::Map(args) => map::run(args, format).await,
        Command::Gamestate(args) => gamestate::run(args, format).await,
        Command::Watch(args) => watch::run(args, format).await,
        Command::Doctor(args) => doctor::run(args, format).await,
        Command::Version(args) => version::run(args),
    }
}

/// Connection parameters shared by every server-facing subcommand.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Server hostname or IP.
    #[arg(long, env = "RCON_HOST")]
    pub host: String,

    /// Server RCON port.
    #[arg(long, env = "RCON_PORT", default_value_t = 27210)]
    pub port: u16,

    /// RCON password.
    #[arg(long, env = "RCON_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Per-request response deadline (e.g. 5s, 500ms).
    #[arg(long, default_value = "10s")]
    pub timeout: String,
}

impl ConnectArgs {
    pub fn to_config(&self) -> CliResult<ClientConfig> {
        let mut cfg = ClientConfig::new(self.host.clone(), self.port, self.password.clone());
        cfg.request_timeout = parse_duration(&self.timeout)?;
        Ok(cfg)
    }
}

/// Connect and authenticate, mapping failures to exit codes.
pub(crate) async fn connect(
    args: &ConnectArgs,
) -> CliResult<(RconClient, mpsc::Receiver<ClientEvent>)> {
    let cfg = args.to_config()?;
    RconClient::connect(cfg)
        .await
        .map_err(|err| client_error("connect failed", err))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub conn: ConnectArgs,

    /// Raw command text to send.
    pub command: String,
}

#[derive(Args, Debug)]
pub struct PlayersArgs {
    #[command(flatten)]
    pub conn: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct MapArgs {
    #[command(flatten)]
    pub conn: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct GamestateArgs {
    #[command(flatten)]
    pub conn: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub conn: ConnectArgs,

    /// Refresh interval (e.g. 60s, 500ms).
    #[arg(long, default_value = "60s")]
    pub interval: String,

    /// Exit after N refreshes instead of running until interrupted.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub conn: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
