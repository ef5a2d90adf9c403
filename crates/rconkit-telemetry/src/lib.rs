//! Typed entities and tolerant parsers for game-server telemetry text.
//!
//! The server answers queries with loosely-formatted text: colon-delimited
//! player lines, keyword-tagged score lines, bare map identifiers. The
//! parsers here never fail: malformed input degrades to skipped lines or
//! placeholder defaults, so a polling caller is never aborted by one bad
//! payload.

pub mod gamestate;
pub mod maps;
pub mod player;

pub use gamestate::{parse_game_state, GameState};
pub use maps::{lookup, parse_map_name, CoordinateBounds, MapInfo, DEFAULT_BOUNDS, UNKNOWN_MAP};
pub use player::{parse_player_info, Player, Position, Team};
