use serde::Serialize;

/// Server-reported match state.
///
/// Fields that cannot be parsed keep their placeholder defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub allied_score: u32,
    pub axis_score: u32,
    /// Remaining match time as `HH:MM:SS`.
    pub remaining_time: String,
    pub player_count: u32,
    pub max_players: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            allied_score: 0,
            axis_score: 0,
            remaining_time: "00:00:00".to_string(),
            player_count: 0,
            max_players: 100,
        }
    }
}

/// Parse a `get gamestate` response body.
///
/// Lines are matched case-insensitively by keyword, in priority order
/// `allied` > `axis` > `time`/`remaining` > `player`. The last matching
/// line for a keyword wins when duplicates exist; fields without a match
/// keep their defaults.
pub fn parse_game_state(text: &str) -> GameState {
    let mut state = GameState::default();

    for line in text.lines() {
        let lower = line.to_lowercase();

        if lower.contains("allied") {
            if let Some(score) = first_uint(line) {
                state.allied_score = score;
            }
        } else if lower.contains("axis") {
            if let Some(score) = first_uint(line) {
                state.axis_score = score;
            }
        } else if lower.contains("time") || lower.contains("remaining") {
            if let Some(clock) = first_clock(line) {
                state.remaining_time = clock;
            }
        } else if lower.contains("player") {
            if let Some((current, max)) = first_count_pair(line) {
                state.player_count = current;
                state.max_players = max;
            }
        }
    }

    state
}

/// First run of ASCII digits in the line, parsed as an integer.
fn first_uint(line: &str) -> Option<u32> {
    line.split(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty())
        .and_then(|run| run.parse().ok())
}

/// First `H:MM:SS` token in the line, with the hour zero-padded.
fn first_clock(line: &str) -> Option<String> {
    let tokens = line
        .split(|c: char| !(c.is_ascii_digit() || c == ':'))
        .filter(|t| !t.is_empty());

    for token in tokens {
        let parts: Vec<&str> = token.split(':').collect();
        let shape_ok = parts.len() == 3
            && (1..=2).contains(&parts[0].len())
            && parts[1].len() == 2
            && parts[2].len() == 2;
        if shape_ok && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
            return Some(format!("{:0>2}:{}:{}", parts[0], parts[1], parts[2]));
        }
    }
    None
}

/// First `N / M` pair in the line, slash-separated with optional spaces.
fn first_count_pair(line: &str) -> Option<(u32, u32)> {
    for (i, byte) in line.bytes().enumerate() {
        if byte != b'/' {
            continue;
        }
        let left: String = line[..i]
            .chars()
            .rev()
            .skip_while(|c| c.is_whitespace())
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .chars()
            .rev()
            .collect();
        let right: String = line[i + 1..]
            .chars()
            .skip_while(|c| c.is_whitespace())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let (Ok(current), Ok(max)) = (left.parse(), right.parse()) {
            return Some((current, max));
        }
    }
    None
}
