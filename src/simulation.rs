//! Greedy run projection: how many dungeon runs until every class track
//! reaches the target level.
//!
//! Each simulated run grants full per-run XP to the class furthest from the
//! target and passive credit (25% of its own per-run XP) to every other
//! class, mirroring how one player's runs feed the whole party unequally.
//! The loop is pure and bounded by an iteration cap, so a class whose
//! throughput is zero or negative simply ends with a non-zero residual
//! instead of spinning forever.

use crate::constants::{MAX_SIM_RUNS, PASSIVE_CREDIT_RATIO, TARGET_LEVEL};
use crate::leveling::{level_for_xp, total_xp_for_level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// XP bonus configuration consumed when computing per-run throughput.
///
/// All fields have neutral-deployment defaults; additive bonuses default to
/// their live values and multiplicative ones to 1.0. The simulator never
/// validates these (negative or non-finite values are the caller's
/// responsibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusConfig {
    /// Hecatomb enchant bonus. Counted at double weight in the formula.
    pub hecatomb: f64,
    /// Scarf's accessory additive bonus.
    pub scarf_accessory: f64,
    /// Scarf's attribute additive bonus.
    pub scarf_attribute: f64,
    /// Global XP multiplier (events, boosters).
    pub global_mult: f64,
    /// Mayor perk multiplier.
    pub mayor_mult: f64,
    /// Extra additive bonus per class (e.g. class-specific gear).
    pub class_boosts: BTreeMap<String, f64>,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            hecatomb: 0.02,
            scarf_accessory: 0.06,
            scarf_attribute: 0.2,
            global_mult: 1.0,
            mayor_mult: 1.0,
            class_boosts: BTreeMap::new(),
        }
    }
}

impl BonusConfig {
    /// All bonuses off: throughput equals the base floor XP exactly.
    pub fn neutral() -> Self {
        Self {
            hecatomb: 0.0,
            scarf_accessory: 0.0,
            scarf_attribute: 0.0,
            global_mult: 1.0,
            mayor_mult: 1.0,
            class_boosts: BTreeMap::new(),
        }
    }

    /// Per-run XP for one class: additive bonuses stack on 1.0 (hecatomb at
    /// double weight), then the two multipliers apply.
    pub fn throughput(&self, class_name: &str, floor_xp: f64) -> f64 {
        let boost = self.class_boosts.get(class_name).copied().unwrap_or(0.0);
        floor_xp
            * (1.0 + self.hecatomb * 2.0 + boost + self.scarf_accessory + self.scarf_attribute)
            * self.global_mult
            * self.mayor_mult
    }
}

/// Final state of one class track after simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassOutcome {
    /// Fractional level reached, rounded to 2 decimals.
    pub level: f64,
    /// XP still missing to the target, clamped at zero.
    pub remaining_xp: f64,
    /// Number of runs in which this class was the full-credit leader.
    pub runs_led: u32,
}

/// Result of a full projection.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// Total simulated runs. Equals the sum of `runs_led` across classes.
    pub total_runs: u32,
    pub classes: BTreeMap<String, ClassOutcome>,
}

impl SimulationOutcome {
    fn empty() -> Self {
        Self {
            total_runs: 0,
            classes: BTreeMap::new(),
        }
    }
}

/// Project runs needed to bring every class in `classes` (name -> current
/// XP) to `target_level`, granting XP per [`BonusConfig::throughput`].
///
/// On equal remaining XP the leader is the first class in `BTreeMap`
/// iteration order, i.e. lexicographically smallest name. A class that can
/// never converge (non-positive throughput) is cut off by `max_runs` and
/// reported with a non-zero residual; this is expected, not an error.
pub fn simulate(
    classes: &BTreeMap<String, f64>,
    floor_xp: f64,
    bonuses: &BonusConfig,
    target_level: f64,
    max_runs: u32,
) -> SimulationOutcome {
    if classes.is_empty() {
        return SimulationOutcome::empty();
    }

    let target_xp = total_xp_for_level(target_level);
    log::debug!("target xp for level {}: {}", target_level, target_xp);

    let throughput: BTreeMap<&str, f64> = classes
        .keys()
        .map(|name| (name.as_str(), bonuses.throughput(name, floor_xp)))
        .collect();
    log::debug!("per-run xp: {:?}", throughput);

    let mut remaining: BTreeMap<&str, f64> = classes
        .iter()
        .map(|(name, xp)| (name.as_str(), (target_xp - xp).max(0.0)))
        .collect();
    let mut runs_led: BTreeMap<&str, u32> = classes.keys().map(|n| (n.as_str(), 0)).collect();

    let mut runs = 0u32;
    while runs < max_runs {
        // Leader = strictly largest remaining XP; BTreeMap order breaks ties.
        let leader = remaining
            .iter()
            .filter(|(_, left)| **left > 0.0)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal).then(b.0.cmp(a.0)))
            .map(|(name, _)| *name);

        let Some(leader) = leader else {
            break;
        };

        runs += 1;
        for (name, left) in remaining.iter_mut() {
            if *name == leader {
                *left -= throughput[name];
            } else {
                *left -= throughput[name] * PASSIVE_CREDIT_RATIO;
            }
        }
        *runs_led.get_mut(leader).unwrap() += 1;

        if runs % 5000 == 0 {
            let levels: BTreeMap<&str, f64> = remaining
                .iter()
                .map(|(name, left)| (*name, level_for_xp((target_xp - left).max(0.0))))
                .collect();
            log::debug!("run {}: levels {:?}", runs, levels);
        }
    }
    log::debug!("projection finished after {} runs", runs);

    let class_outcomes = classes
        .keys()
        .map(|name| {
            let left = remaining[name.as_str()];
            let final_xp = (target_xp - left).max(0.0);
            let outcome = ClassOutcome {
                level: level_for_xp(final_xp),
                remaining_xp: left.max(0.0),
                runs_led: runs_led[name.as_str()],
            };
            (name.clone(), outcome)
        })
        .collect();

    SimulationOutcome {
        total_runs: runs,
        classes: class_outcomes,
    }
}

/// [`simulate`] with the deployment defaults: target level 50, 200k run cap.
pub fn simulate_to_target(
    classes: &BTreeMap<String, f64>,
    floor_xp: f64,
    bonuses: &BonusConfig,
) -> SimulationOutcome {
    simulate(classes, floor_xp, bonuses, TARGET_LEVEL, MAX_SIM_RUNS)
}
