// Simulation defaults
pub const TARGET_LEVEL: f64 = 50.0;
pub const MAX_SIM_RUNS: u32 = 200_000;
pub const XP_PER_RUN_DEFAULT: f64 = 300_000.0;

/// Fraction of a class's own per-run XP it earns on runs it does not lead.
pub const PASSIVE_CREDIT_RATIO: f64 = 0.25;

// Cache TTLs (seconds)
pub const PROFILE_CACHE_TTL: u64 = 60;
pub const PRICES_CACHE_TTL: u64 = 3600;

// Tracker snapshot file constants
pub const SNAPSHOT_VERSION_MAGIC: u64 = 0x44454C56455F5400; // "DELVE_T\0" in hex

/// Per-level catacombs XP increments. Index 0 unused; the last entry is the
/// perpetual increment for every level past 50.
pub const CATACOMBS_XP: [f64; 51] = [
    0.0, 50.0, 75.0, 110.0, 160.0, 230.0, 330.0, 470.0, 670.0, 950.0, 1340.0,
    1890.0, 2665.0, 3760.0, 5260.0, 7380.0, 10300.0, 14400.0, 20000.0, 27600.0,
    38000.0, 52500.0, 71500.0, 97000.0, 132000.0, 180000.0, 243000.0, 328000.0,
    445000.0, 600000.0, 800000.0, 1065000.0, 1410000.0, 1900000.0, 2500000.0,
    3300000.0, 4300000.0, 5600000.0, 7200000.0, 9200000.0, 12000000.0, 15000000.0,
    19000000.0, 24000000.0, 30000000.0, 38000000.0, 48000000.0, 60000000.0, 75000000.0,
    93000000.0, 200000000.0,
];

/// The five dungeon class tracks.
pub const CLASS_NAMES: [&str; 5] = ["archer", "berserk", "healer", "mage", "tank"];

/// Base XP per completed run for each floor.
pub const FLOOR_XP_MAP: [(&str, f64); 15] = [
    ("M7", 300_000.0),
    ("M6", 100_000.0),
    ("M5", 70_000.0),
    ("M4", 55_000.0),
    ("M3", 35_000.0),
    ("M2", 20_000.0),
    ("M1", 15_000.0),
    ("F7", 28_000.0),
    ("F6", 4_880.0),
    ("F5", 2_400.0),
    ("F4", 1_420.0),
    ("F3", 560.0),
    ("F2", 220.0),
    ("F1", 110.0),
    ("ENTRANCE", 55.0),
];

/// Look up base per-run XP for a floor code like "M7" or "F5".
pub fn floor_xp(code: &str) -> Option<f64> {
    let upper = code.to_uppercase();
    FLOOR_XP_MAP
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, xp)| *xp)
}

/// Notable drops tallied per floor.
pub const FLOOR_DROPS: [(&str, &[&str]); 7] = [
    (
        "Floor 7 (Necron)",
        &[
            "Necron's Handle",
            "Implosion",
            "Wither Shield",
            "Shadow Warp",
            "5th Master Star",
            "Master Skull - Tier 5",
            "50% M7 Skeleton Master Chestplate",
            "Thunderlord VII",
            "Dark Claymore",
        ],
    ),
    (
        "Floor 6 (Sadan)",
        &["Giant's Sword", "Precursor Eye", "4th Master Star"],
    ),
    ("Floor 5 (Livid)", &["Shadow Fury", "3rd Master Star"]),
    (
        "Floor 4 (Thorn)",
        &[
            "Spirit Wing",
            "Spirit Bone",
            "Spirit Shortbow",
            "2nd Master Star",
        ],
    ),
    ("Floor 3 (Professor)", &["1st Master Star"]),
    ("Floor 2 (Scarf)", &["Scarf's Studies"]),
    ("Floor 1 (Bonzo)", &["Bonzo's Staff"]),
];

/// Drops that can appear on any floor.
pub const GLOBAL_DROPS: [&str; 1] = ["Ice Spray"];

/// True if `name` is a known drop floor.
pub fn is_drop_floor(name: &str) -> bool {
    FLOOR_DROPS.iter().any(|(floor, _)| *floor == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        assert_eq!(CATACOMBS_XP.len(), 51);
        assert_eq!(CATACOMBS_XP[0], 0.0);
        assert_eq!(CATACOMBS_XP[1], 50.0);
        assert_eq!(CATACOMBS_XP[50], 200_000_000.0);
    }

    #[test]
    fn test_floor_xp_lookup() {
        assert_eq!(floor_xp("M7"), Some(300_000.0));
        assert_eq!(floor_xp("m7"), Some(300_000.0));
        assert_eq!(floor_xp("entrance"), Some(55.0));
        assert_eq!(floor_xp("M8"), None);
    }

    #[test]
    fn test_drop_floor_names() {
        assert!(is_drop_floor("Floor 7 (Necron)"));
        assert!(!is_drop_floor("Floor 8"));
    }
}
