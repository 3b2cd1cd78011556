//! Offline run projection CLI.
//!
//! Projects dungeon runs to the target level without touching the network:
//! starting XP and bonuses come from flags.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                               # all classes from 0
//!   cargo run --bin simulate -- --xp mage=5000000          # one class seeded
//!   cargo run --bin simulate -- --floor M6 --target 40     # different floor/target
//!   cargo run --bin simulate -- --neutral                  # bonuses off

use delve::constants::{floor_xp, CLASS_NAMES, MAX_SIM_RUNS, TARGET_LEVEL, XP_PER_RUN_DEFAULT};
use delve::simulation::{simulate, BonusConfig};
use std::collections::BTreeMap;
use std::env;
use std::process;

struct Options {
    classes: BTreeMap<String, f64>,
    floor_xp: f64,
    bonuses: BonusConfig,
    target_level: f64,
    max_runs: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            classes: CLASS_NAMES
                .iter()
                .map(|name| (name.to_string(), 0.0))
                .collect(),
            floor_xp: XP_PER_RUN_DEFAULT,
            bonuses: BonusConfig::default(),
            target_level: TARGET_LEVEL,
            max_runs: MAX_SIM_RUNS,
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    println!("╔═══════════════════════════════════════════════╗");
    println!("║            DELVE RUN PROJECTION               ║");
    println!("╚═══════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Floor XP:       {}", options.floor_xp);
    println!("  Target level:   {}", options.target_level);
    println!("  Run cap:        {}", options.max_runs);
    println!(
        "  Bonuses:        hecatomb={} scarf_accessory={} scarf_attribute={} global={} mayor={}",
        options.bonuses.hecatomb,
        options.bonuses.scarf_accessory,
        options.bonuses.scarf_attribute,
        options.bonuses.global_mult,
        options.bonuses.mayor_mult
    );
    println!();

    let outcome = simulate(
        &options.classes,
        options.floor_xp,
        &options.bonuses,
        options.target_level,
        options.max_runs,
    );

    println!("{:<10} {:>8} {:>16} {:>10}", "CLASS", "LEVEL", "XP LEFT", "RUNS LED");
    for (name, class) in &outcome.classes {
        println!(
            "{:<10} {:>8.2} {:>16.0} {:>10}",
            name, class.level, class.remaining_xp, class.runs_led
        );
    }
    println!();
    println!("Total runs: {}", outcome.total_runs);

    if outcome.total_runs >= options.max_runs {
        println!("(run cap reached; at least one class cannot converge)");
    }
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--xp" => {
                if let Some((class, xp)) = args.get(i + 1).and_then(|a| parse_assignment(a)) {
                    options.classes.insert(class, xp);
                    i += 1;
                }
            }
            "--all" => {
                if let Some(xp) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                    for value in options.classes.values_mut() {
                        *value = xp;
                    }
                    i += 1;
                }
            }
            "--floor" => {
                if let Some(code) = args.get(i + 1) {
                    match floor_xp(code) {
                        Some(xp) => options.floor_xp = xp,
                        None => {
                            eprintln!("Unknown floor: {}", code);
                            process::exit(1);
                        }
                    }
                    i += 1;
                }
            }
            "--floor-xp" => {
                if let Some(xp) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                    options.floor_xp = xp;
                    i += 1;
                }
            }
            "-t" | "--target" => {
                if let Some(level) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                    options.target_level = level;
                    i += 1;
                }
            }
            "--max-runs" => {
                if let Some(cap) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                    options.max_runs = cap;
                    i += 1;
                }
            }
            "--neutral" => {
                options.bonuses = BonusConfig::neutral();
            }
            "--hecatomb" => {
                if let Some(v) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                    options.bonuses.hecatomb = v;
                    i += 1;
                }
            }
            "--scarf-accessory" => {
                if let Some(v) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                    options.bonuses.scarf_accessory = v;
                    i += 1;
                }
            }
            "--scarf-attribute" => {
                if let Some(v) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                    options.bonuses.scarf_attribute = v;
                    i += 1;
                }
            }
            "--global" => {
                if let Some(v) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                    options.bonuses.global_mult = v;
                    i += 1;
                }
            }
            "--mayor" => {
                if let Some(v) = args.get(i + 1).and_then(|a| a.parse().ok()) {
                    options.bonuses.mayor_mult = v;
                    i += 1;
                }
            }
            "--boost" => {
                if let Some((class, boost)) = args.get(i + 1).and_then(|a| parse_assignment(a)) {
                    options.bonuses.class_boosts.insert(class, boost);
                    i += 1;
                }
            }
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    options
}

fn parse_assignment(arg: &str) -> Option<(String, f64)> {
    let (class, value) = arg.split_once('=')?;
    Some((class.to_string(), value.parse().ok()?))
}

fn print_help() {
    println!("Delve Run Projection");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --xp <class=XP>          Starting XP for one class (repeatable)");
    println!("    --all <XP>               Starting XP for every class");
    println!("    --floor <CODE>           Floor code (M7..M1, F7..F1, ENTRANCE; default M7)");
    println!("    --floor-xp <XP>          Raw base XP per run (overrides --floor)");
    println!("    -t, --target <LEVEL>     Target level (default 50)");
    println!("    --max-runs <N>           Iteration cap (default 200,000)");
    println!("    --neutral                Disable all bonuses");
    println!("    --hecatomb <V>           Hecatomb bonus (default 0.02)");
    println!("    --scarf-accessory <V>    Scarf accessory bonus (default 0.06)");
    println!("    --scarf-attribute <V>    Scarf attribute bonus (default 0.2)");
    println!("    --global <V>             Global multiplier (default 1.0)");
    println!("    --mayor <V>              Mayor multiplier (default 1.0)");
    println!("    --boost <class=V>        Per-class additive boost (repeatable)");
    println!("    -h, --help               Show this help");
}
