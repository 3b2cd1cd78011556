//! Catacombs level curve: bidirectional conversion between XP and
//! (possibly fractional) level.
//!
//! Levels 1..=50 follow the increment table in `constants.rs`. Past level 50
//! the curve is open-ended: every additional level costs the table's last
//! increment. Both directions agree to within the 2-decimal rounding used
//! for level display.

use crate::constants::CATACOMBS_XP;

/// Cumulative XP required to reach `level`, counted from level 0.
///
/// Whole in-range levels are the exact prefix sum of the increment table.
/// A fractional part is charged linearly against the *next* level's
/// increment. Negative or non-finite input is the caller's responsibility.
pub fn total_xp_for_level(level: f64) -> f64 {
    debug_assert!(level.is_finite() && level >= 0.0);

    let level_int = level.floor() as usize;
    let base_levels = CATACOMBS_XP.len() - 1;

    if level_int < base_levels {
        let mut total: f64 = CATACOMBS_XP[1..=level_int].iter().sum();
        let frac = level - level_int as f64;
        if frac > 0.0 {
            total += CATACOMBS_XP[level_int + 1] * frac;
        }
        return total;
    }

    // Past the table: last increment repeats per level, fraction included.
    let table_total: f64 = CATACOMBS_XP[1..=base_levels].iter().sum();
    let extra_levels = level - base_levels as f64;
    if extra_levels > 0.0 {
        table_total + extra_levels * CATACOMBS_XP[base_levels]
    } else {
        table_total
    }
}

/// Fractional level reached with `xp` total XP, rounded to 2 decimals.
///
/// Inverse of [`total_xp_for_level`]: walks the cumulative table to find the
/// bracketing level pair, interpolating within the bracket. XP at or past
/// the table total extrapolates with the last increment.
pub fn level_for_xp(xp: f64) -> f64 {
    debug_assert!(xp.is_finite() && xp >= 0.0);

    let mut cumulative = 0.0;
    for i in 1..CATACOMBS_XP.len() {
        cumulative += CATACOMBS_XP[i];
        if xp < cumulative {
            let prev = cumulative - CATACOMBS_XP[i];
            let progress = (xp - prev) / CATACOMBS_XP[i];
            return round2((i - 1) as f64 + progress);
        }
    }

    let last = CATACOMBS_XP[CATACOMBS_XP.len() - 1];
    let extra_levels = (xp - cumulative) / last;
    round2((CATACOMBS_XP.len() - 1) as f64 + extra_levels)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_xp_is_level_zero() {
        assert_eq!(level_for_xp(0.0), 0.0);
        assert_eq!(total_xp_for_level(0.0), 0.0);
    }

    #[test]
    fn test_known_prefix_sums() {
        // First increments are 50, 75, 110.
        assert_eq!(total_xp_for_level(1.0), 50.0);
        assert_eq!(total_xp_for_level(2.0), 125.0);
        assert_eq!(total_xp_for_level(3.0), 235.0);
    }

    #[test]
    fn test_fractional_interpolation() {
        // 2.5 charges half of level 3's increment (110).
        assert_eq!(total_xp_for_level(2.5), 125.0 + 55.0);
    }

    #[test]
    fn test_level_for_known_xp() {
        assert_eq!(level_for_xp(125.0), 2.0);
        assert_eq!(level_for_xp(180.0), 2.5);
        assert_eq!(level_for_xp(49.0), 0.98);
    }

    #[test]
    fn test_round_trip_whole_levels() {
        for level in 0..=50u32 {
            let xp = total_xp_for_level(level as f64);
            let back = level_for_xp(xp);
            assert!(
                (back - level as f64).abs() < 0.01,
                "level {} -> xp {} -> level {}",
                level,
                xp,
                back
            );
        }
    }

    #[test]
    fn test_round_trip_extrapolated() {
        for level in [51.0, 55.0, 72.5, 100.0] {
            let xp = total_xp_for_level(level);
            let back = level_for_xp(xp);
            assert!(
                (back - level).abs() < 0.01,
                "level {} -> xp {} -> level {}",
                level,
                xp,
                back
            );
        }
    }

    #[test]
    fn test_monotonic() {
        let mut previous = -1.0;
        let mut level = 0.0;
        while level <= 60.0 {
            let xp = total_xp_for_level(level);
            assert!(xp >= previous, "curve decreased at level {}", level);
            previous = xp;
            level += 0.25;
        }
    }

    #[test]
    fn test_extrapolation_continuity() {
        // Approaching level 50 from below and above must agree at the boundary.
        let at_50 = total_xp_for_level(50.0);
        let below = total_xp_for_level(49.999);
        let above = total_xp_for_level(50.001);
        assert!(below < at_50 && at_50 < above);
        assert!((at_50 - below) < CATACOMBS_XP[50] * 0.002);
        assert!((above - at_50) < CATACOMBS_XP[50] * 0.002);
    }

    #[test]
    fn test_extrapolated_cost_uses_last_increment() {
        let at_50 = total_xp_for_level(50.0);
        let at_51 = total_xp_for_level(51.0);
        assert_eq!(at_51 - at_50, CATACOMBS_XP[50]);
    }
}
