//! Static map catalog.
//!
//! The server reports maps as short identifiers ("sme", "foy"), sometimes
//! carrying a `_P` variant suffix. The catalog resolves them to display
//! names, asset file keys and coordinate bounds.

use serde::Serialize;

/// Playable coordinate extent of a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoordinateBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

/// Bounds shared by every map in the catalog.
pub const DEFAULT_BOUNDS: CoordinateBounds = CoordinateBounds {
    min_x: -100_000.0,
    max_x: 100_000.0,
    min_y: -100_000.0,
    max_y: 100_000.0,
};

impl CoordinateBounds {
    /// Normalize game coordinates into the `0..=1` range, clamped.
    pub fn normalize(&self, x: f32, y: f32) -> (f32, f32) {
        let nx = (x - self.min_x) / (self.max_x - self.min_x);
        let ny = (y - self.min_y) / (self.max_y - self.min_y);
        (nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0))
    }
}

/// A resolved map catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapInfo {
    /// Display name.
    pub name: &'static str,
    /// Normalized identifier used for asset lookup.
    pub file_key: &'static str,
    /// Playable coordinate extent.
    pub bounds: CoordinateBounds,
}

/// Fallback entry for unrecognized identifiers.
pub const UNKNOWN_MAP: MapInfo = MapInfo {
    name: "Unknown Map",
    file_key: "unknown",
    bounds: DEFAULT_BOUNDS,
};

macro_rules! entry {
    ($key:literal, $name:literal) => {
        (
            $key,
            MapInfo {
                name: $name,
                file_key: $key,
                bounds: DEFAULT_BOUNDS,
            },
        )
    };
}

const CATALOG: &[(&str, MapInfo)] = &[
    entry!("carentan", "Carentan"),
    entry!("foy", "Foy"),
    entry!("hill400", "Hill 400"),
    entry!("hurtgen", "Hurtgen Forest"),
    entry!("kursk", "Kursk"),
    entry!("omaha", "Omaha Beach"),
    entry!("phl", "Purple Heart Lane"),
    entry!("sme", "St. Mere Eglise"),
    entry!("smdm", "St. Marie Du Mont"),
    entry!("stalingrad", "Stalingrad"),
    entry!("utah", "Utah Beach"),
    entry!("remagen", "Remagen"),
    entry!("kharkov", "Kharkov"),
    entry!("smolensk", "Smolensk"),
    entry!("elalamein", "El Alamein"),
    entry!("driel", "Driel"),
    entry!("elsenborn", "Elsenbornridge"),
    entry!("mortain", "Mortain"),
    entry!("tobruk", "Tobruk"),
];

/// Resolve a reported map identifier against the catalog.
///
/// Matching is exact key first, then partial in either direction, then the
/// [`UNKNOWN_MAP`] fallback.
pub fn lookup(raw: &str) -> MapInfo {
    let normalized = squash(raw);
    if normalized.is_empty() {
        return UNKNOWN_MAP;
    }

    for (key, info) in CATALOG {
        if *key == normalized {
            return *info;
        }
    }

    for (key, info) in CATALOG {
        if squash(info.name).contains(&normalized) || normalized.contains(key) {
            return *info;
        }
    }

    UNKNOWN_MAP
}

/// Extract the map identifier from a `get map` response body.
///
/// Takes the leading word token and strips the `_P` variant suffix.
pub fn parse_map_name(text: &str) -> String {
    let token: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let token = token.to_lowercase();
    match token.strip_suffix("_p") {
        Some(stripped) => stripped.to_string(),
        None => token,
    }
}

/// Lowercase and drop whitespace, matching how catalog keys are formed.
fn squash(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_lookup() {
        let map = lookup("carentan");
        assert_eq!(map.name, "Carentan");
        assert_eq!(map.file_key, "carentan");
    }

    #[test]
    fn lookup_by_display_name_fragment() {
        assert_eq!(lookup("Purple Heart").file_key, "phl");
        assert_eq!(lookup("hurtgenforest").file_key, "hurtgen");
    }

    #[test]
    fn unknown_falls_back() {
        let map = lookup("atlantis");
        assert_eq!(map, UNKNOWN_MAP);
    }

    #[test]
    fn empty_input_falls_back() {
        assert_eq!(lookup(""), UNKNOWN_MAP);
        assert_eq!(lookup("   "), UNKNOWN_MAP);
    }

    #[test]
    fn variant_suffix_resolves() {
        let name = parse_map_name("SME_P");
        assert_eq!(name, "sme");
        assert_eq!(lookup(&name).name, "St. Mere Eglise");
    }

    #[test]
    fn leading_token_only() {
        assert_eq!(parse_map_name("foy some trailing text"), "foy");
        assert_eq!(parse_map_name("  Hill400_P rest"), "hill400");
    }

    #[test]
    fn unrecognized_token_resolves_to_unknown() {
        let name = parse_map_name("XYZZY_P");
        assert_eq!(lookup(&name), UNKNOWN_MAP);
    }

    #[test]
    fn normalize_clamps_to_unit_range() {
        let (x, y) = DEFAULT_BOUNDS.normalize(0.0, 0.0);
        assert_eq!((x, y), (0.5, 0.5));

        let (x, y) = DEFAULT_BOUNDS.normalize(-250_000.0, 250_000.0);
        assert_eq!((x, y), (0.0, 1.0));
    }

    #[test]
    fn catalog_keys_are_normalized() {
        for (key, info) in CATALOG {
            assert_eq!(*key, squash(key), "key {key} must be lowercase");
            assert_eq!(info.file_key, *key);
        }
    }
}
