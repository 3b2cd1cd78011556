//! Level curve properties: round-trips, monotonicity, and extrapolation
//! continuity at the table boundary.

use delve::constants::CATACOMBS_XP;
use delve::leveling::{level_for_xp, total_xp_for_level};

#[test]
fn whole_levels_round_trip_within_rounding() {
    for level in 0..=50u32 {
        let xp = total_xp_for_level(level as f64);
        assert!(
            (level_for_xp(xp) - level as f64).abs() < 0.01,
            "round trip failed at level {}",
            level
        );
    }
}

#[test]
fn fractional_levels_round_trip_within_rounding() {
    for tenths in 0..=600u32 {
        let level = tenths as f64 / 10.0;
        let xp = total_xp_for_level(level);
        assert!(
            (level_for_xp(xp) - level).abs() < 0.01,
            "round trip failed at level {}",
            level
        );
    }
}

#[test]
fn cumulative_xp_is_monotonic() {
    let mut previous = 0.0;
    for hundredths in 1..=7000u32 {
        let level = hundredths as f64 / 100.0;
        let xp = total_xp_for_level(level);
        assert!(
            xp >= previous,
            "cumulative xp decreased between {} and {}",
            level - 0.01,
            level
        );
        previous = xp;
    }
}

#[test]
fn extrapolation_is_continuous_at_table_end() {
    let boundary = total_xp_for_level(50.0);
    let step = CATACOMBS_XP[50];

    // One whole level either side of the boundary costs the expected step.
    assert_eq!(total_xp_for_level(51.0) - boundary, step);
    assert!((boundary - total_xp_for_level(49.0) - CATACOMBS_XP[50]).abs() < 1e-6);

    // Tiny fractional steps across the boundary stay tiny.
    let just_below = total_xp_for_level(49.99);
    let just_above = total_xp_for_level(50.01);
    assert!(boundary - just_below <= step * 0.011);
    assert!(just_above - boundary <= step * 0.011);
}

#[test]
fn known_cumulative_values() {
    // Table opens 50, 75, 110.
    assert_eq!(total_xp_for_level(2.0), 125.0);
    assert_eq!(total_xp_for_level(2.5), 180.0);
    assert_eq!(level_for_xp(125.0), 2.0);
    assert_eq!(level_for_xp(180.0), 2.5);
}

#[test]
fn extrapolated_levels_keep_costing_the_last_increment() {
    let at_50 = total_xp_for_level(50.0);
    let at_60 = total_xp_for_level(60.0);
    assert_eq!(at_60 - at_50, 10.0 * CATACOMBS_XP[50]);
    assert!((level_for_xp(at_60) - 60.0).abs() < 0.01);
}
