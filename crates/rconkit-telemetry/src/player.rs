use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

/// Side a player fights on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Team {
    Allies,
    Axis,
    /// Any other value reported by the server, case-folded.
    Other(String),
}

impl Team {
    /// Parse a reported team field, case-folding known sides.
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "allies" => Team::Allies,
            "axis" => Team::Axis,
            other => Team::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Team::Allies => "allies",
            Team::Axis => "axis",
            Team::Other(name) => name,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Team {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A player's in-game position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// One entry of the player list.
///
/// Rebuilt fresh on every query; no identity persists across calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub name: String,
    pub team: Team,
    pub role: String,
    pub kills: u32,
    pub deaths: u32,
    pub position: Position,
}

/// Minimum colon-delimited fields a player line must carry:
/// name, team, role, kills, deaths, x, y.
const MIN_FIELDS: usize = 7;

/// Parse a `get playerinfo` response body.
///
/// One player per line, fields colon-delimited and trimmed. Lines with
/// fewer than seven fields are skipped; numeric fields that fail to parse
/// default to zero.
pub fn parse_player_info(text: &str) -> Vec<Player> {
    let mut players = Vec::new();

    for line in text.lines() {
        let fields: Vec<&str> = line.split(':').map(str::trim).collect();
        if fields.len() < MIN_FIELDS {
            if !line.trim().is_empty() {
                debug!(line, "skipping malformed player line");
            }
            continue;
        }

        players.push(Player {
            name: fields[0].to_string(),
            team: Team::parse(fields[1]),
            role: fields[2].to_string(),
            kills: fields[3].parse().unwrap_or(0),
            deaths: fields[4].parse().unwrap_or(0),
            position: Position {
                x: fields[5].parse().unwrap_or(0.0),
                y: fields[6].parse().unwrap_or(0.0),
            },
        });
    }

    players
}
