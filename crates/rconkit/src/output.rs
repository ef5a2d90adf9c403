use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use rconkit_telemetry::{GameState, MapInfo, Player};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ResponseOutput<'a> {
    response: &'a str,
}

/// Print a raw command response body.
pub fn print_response(body: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ResponseOutput { response: body }),
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => println!("{body}"),
    }
}

pub fn print_players(players: &[Player], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&players),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NAME", "TEAM", "ROLE", "KILLS", "DEATHS", "X", "Y"]);
            for p in players {
                table.add_row(vec![
                    p.name.clone(),
                    p.team.to_string(),
                    p.role.clone(),
                    p.kills.to_string(),
                    p.deaths.to_string(),
                    format!("{:.1}", p.position.x),
                    format!("{:.1}", p.position.y),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for p in players {
                println!(
                    "{} [{}/{}] {}K/{}D at ({:.1}, {:.1})",
                    p.name, p.team, p.role, p.kills, p.deaths, p.position.x, p.position.y
                );
            }
        }
        OutputFormat::Raw => {
            for p in players {
                println!(
                    "{}:{}:{}:{}:{}:{}:{}",
                    p.name, p.team, p.role, p.kills, p.deaths, p.position.x, p.position.y
                );
            }
        }
    }
}

pub fn print_map(map: &MapInfo, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(map),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MAP", "FILE KEY"])
                .add_row(vec![map.name.to_string(), map.file_key.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{} ({})", map.name, map.file_key),
        OutputFormat::Raw => println!("{}", map.file_key),
    }
}

pub fn print_game_state(state: &GameState, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(state),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ALLIED", "AXIS", "REMAINING", "PLAYERS"])
                .add_row(vec![
                    state.allied_score.to_string(),
                    state.axis_score.to_string(),
                    state.remaining_time.clone(),
                    format!("{}/{}", state.player_count, state.max_players),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "allied {} : {} axis | {} remaining | {}/{} players",
            state.allied_score,
            state.axis_score,
            state.remaining_time,
            state.player_count,
            state.max_players
        ),
        OutputFormat::Raw => println!(
            "{} {} {} {}/{}",
            state.allied_score,
            state.axis_score,
            state.remaining_time,
            state.player_count,
            state.max_players
        ),
    }
}

#[derive(Serialize)]
struct SnapshotOutput<'a> {
    map: &'a MapInfo,
    game_state: &'a GameState,
    players: &'a [Player],
}

/// Print one combined refresh of map, score state and player list.
pub fn print_snapshot(players: &[Player], map: &MapInfo, state: &GameState, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SnapshotOutput {
            map,
            game_state: state,
            players,
        }),
        format => {
            let allies = players
                .iter()
                .filter(|p| p.team == rconkit_telemetry::Team::Allies)
                .count();
            let axis = players
                .iter()
                .filter(|p| p.team == rconkit_telemetry::Team::Axis)
                .count();
            println!(
                "== {} | allies {} ({allies} players) : axis {} ({axis} players) | {} remaining | {}/{}",
                map.name,
                state.allied_score,
                state.axis_score,
                state.remaining_time,
                state.player_count,
                state.max_players
            );
            print_players(players, format);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
