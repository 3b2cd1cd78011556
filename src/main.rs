//! Delve CLI.
//!
//! Front-end over the tracker: link accounts, look up dungeon XP, project
//! runs to the target level, refresh tracked users, and show drop tallies
//! and leaderboards.

use delve::api::ApiClient;
use delve::constants::{floor_xp, TARGET_LEVEL, XP_PER_RUN_DEFAULT};
use delve::daily_tracker::{DailyTracker, Period};
use delve::drop_log::DropLog;
use delve::leveling::level_for_xp;
use delve::link_store::LinkStore;
use delve::settings::BonusDefaults;
use delve::simulation::simulate;
use std::env;
use std::error::Error;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_help();
        process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    match args[1].as_str() {
        "link" => cmd_link(args),
        "unlink" => cmd_unlink(args),
        "lookup" => cmd_lookup(args),
        "runs" => cmd_runs(args),
        "prices" => cmd_prices(args),
        "simulate" => cmd_simulate(args),
        "bonus" => cmd_bonus(args),
        "update" => cmd_update(),
        "stats" => cmd_stats(args),
        "leaderboard" => cmd_leaderboard(args),
        "drops" => cmd_drops(args),
        "drop-add" => cmd_drop_add(args),
        "drop-set" => cmd_drop_set(args),
        "drop-target" => cmd_drop_target(args),
        "repair" => cmd_repair(),
        "version" => {
            println!(
                "delve {} ({})",
                delve::build_info::BUILD_COMMIT,
                delve::build_info::BUILD_DATE
            );
            Ok(())
        }
        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            process::exit(1);
        }
    }
}

fn cmd_link(args: &[String]) -> Result<(), Box<dyn Error>> {
    let (user_id, ign) = match (args.get(2), args.get(3)) {
        (Some(id), Some(ign)) => (id.parse::<u64>()?, ign.as_str()),
        _ => return Err("usage: delve link <user_id> <ign>".into()),
    };

    let mut api = ApiClient::new();
    let uuid = api.resolve_uuid(ign)?;

    let mut links = LinkStore::new()?;
    links.link(user_id, ign)?;

    let mut tracker = DailyTracker::new()?;
    tracker.register_user(user_id, ign, &uuid)?;

    println!("Linked user {} to {}", user_id, ign);
    Ok(())
}

fn cmd_unlink(args: &[String]) -> Result<(), Box<dyn Error>> {
    let user_id = args
        .get(2)
        .ok_or("usage: delve unlink <user_id>")?
        .parse::<u64>()?;

    let mut links = LinkStore::new()?;
    if links.unlink(user_id)? {
        println!("Unlinked user {}", user_id);
    } else {
        println!("User {} has no linked account", user_id);
    }
    Ok(())
}

fn cmd_lookup(args: &[String]) -> Result<(), Box<dyn Error>> {
    let ign = args.get(2).ok_or("usage: delve lookup <ign>")?;

    let mut api = ApiClient::new();
    let uuid = api.resolve_uuid(ign)?;
    let xp = api.fetch_class_xp(&uuid)?;

    println!("{} (catacombs {:.2})", ign, level_for_xp(xp.catacombs));
    for (class, class_xp) in &xp.classes {
        println!("  {:<8} level {:>6.2}  ({:.0} xp)", class, level_for_xp(*class_xp), class_xp);
    }
    Ok(())
}

fn cmd_runs(args: &[String]) -> Result<(), Box<dyn Error>> {
    let ign = args.get(2).ok_or("usage: delve runs <ign>")?;

    let mut api = ApiClient::new();
    let uuid = api.resolve_uuid(ign)?;
    let runs = api.fetch_floor_runs(&uuid)?;

    println!("Floor completions for {}:", ign);
    println!("{:<24} {:>8} {:>8}", "FLOOR", "NORMAL", "MASTER");
    for (floor, counts) in &runs {
        println!("{:<24} {:>8} {:>8}", floor, counts.normal, counts.master);
    }
    Ok(())
}

fn cmd_prices(args: &[String]) -> Result<(), Box<dyn Error>> {
    if args.len() < 3 {
        return Err("usage: delve prices <ITEM_ID>...".into());
    }

    let mut api = ApiClient::new();
    let prices = api.fetch_prices();
    if prices.is_empty() {
        return Err("price endpoints unavailable".into());
    }

    for item in &args[2..] {
        match prices.get(&item.to_uppercase()) {
            Some(price) => println!("{:<40} {:.1}", item, price),
            None => println!("{:<40} no listing", item),
        }
    }
    Ok(())
}

fn cmd_bonus(args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut store = BonusDefaults::new()?;
    match args.get(2).map(String::as_str) {
        None | Some("show") => {
            let config = store.get();
            println!("hecatomb:        {}", config.hecatomb);
            println!("scarf-accessory: {}", config.scarf_accessory);
            println!("scarf-attribute: {}", config.scarf_attribute);
            println!("global:          {}", config.global_mult);
            println!("mayor:           {}", config.mayor_mult);
            for (class, boost) in &config.class_boosts {
                println!("boost {:<10} {}", class, boost);
            }
            Ok(())
        }
        Some("set") => {
            let usage = "usage: delve bonus set <field> <value>";
            let field = args.get(3).ok_or(usage)?;
            let value: f64 = args.get(4).ok_or(usage)?.parse()?;

            let mut config = store.get();
            match field.as_str() {
                "hecatomb" => config.hecatomb = value,
                "scarf-accessory" => config.scarf_accessory = value,
                "scarf-attribute" => config.scarf_attribute = value,
                "global" => config.global_mult = value,
                "mayor" => config.mayor_mult = value,
                other => return Err(format!("unknown bonus field: {}", other).into()),
            }
            store.set(config)?;
            println!("{} -> {}", field, value);
            Ok(())
        }
        Some("reset") => {
            store.reset()?;
            println!("Bonus defaults restored");
            Ok(())
        }
        Some(other) => Err(format!("unknown bonus subcommand: {}", other).into()),
    }
}

fn cmd_simulate(args: &[String]) -> Result<(), Box<dyn Error>> {
    let ign = args.get(2).ok_or("usage: delve simulate <ign> [options]")?;

    let mut base_xp = XP_PER_RUN_DEFAULT;
    let mut target_level = TARGET_LEVEL;
    let mut bonuses = BonusDefaults::new()?.get();

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--floor" => {
                let code = args.get(i + 1).ok_or("--floor needs a value")?;
                base_xp = floor_xp(code).ok_or_else(|| format!("unknown floor: {}", code))?;
                i += 1;
            }
            "-t" | "--target" => {
                target_level = args.get(i + 1).ok_or("--target needs a value")?.parse()?;
                i += 1;
            }
            "--hecatomb" => {
                bonuses.hecatomb = args.get(i + 1).ok_or("--hecatomb needs a value")?.parse()?;
                i += 1;
            }
            "--global" => {
                bonuses.global_mult = args.get(i + 1).ok_or("--global needs a value")?.parse()?;
                i += 1;
            }
            "--mayor" => {
                bonuses.mayor_mult = args.get(i + 1).ok_or("--mayor needs a value")?.parse()?;
                i += 1;
            }
            other => return Err(format!("unknown option: {}", other).into()),
        }
        i += 1;
    }

    let mut api = ApiClient::new();
    let uuid = api.resolve_uuid(ign)?;
    let xp = api.fetch_class_xp(&uuid)?;

    let outcome = simulate(
        &xp.classes,
        base_xp,
        &bonuses,
        target_level,
        delve::constants::MAX_SIM_RUNS,
    );

    println!(
        "Projection for {} to class level {} ({:.0} base xp/run):",
        ign, target_level, base_xp
    );
    println!();
    println!("{:<10} {:>8} {:>16} {:>10}", "CLASS", "LEVEL", "XP LEFT", "RUNS LED");
    for (class, result) in &outcome.classes {
        println!(
            "{:<10} {:>8.2} {:>16.0} {:>10}",
            class, result.level, result.remaining_xp, result.runs_led
        );
    }
    println!();
    println!("Total runs: {}", outcome.total_runs);
    Ok(())
}

fn cmd_update() -> Result<(), Box<dyn Error>> {
    let mut api = ApiClient::new();
    let mut tracker = DailyTracker::new()?;

    tracker.check_resets(chrono::Utc::now())?;

    let users = tracker.tracked_users();
    if users.is_empty() {
        println!("No tracked users");
        return Ok(());
    }

    let mut updated = 0;
    let mut errors = 0;
    for (user_id, uuid) in &users {
        match api.fetch_class_xp(uuid) {
            Ok(xp) => {
                tracker.record_reading(*user_id, &xp, chrono::Utc::now().timestamp())?;
                updated += 1;
            }
            Err(e) => {
                log::error!("update failed for {}: {}", user_id, e);
                errors += 1;
            }
        }
    }

    println!("Updated {}/{} users ({} errors)", updated, users.len(), errors);
    Ok(())
}

fn cmd_stats(args: &[String]) -> Result<(), Box<dyn Error>> {
    let user_id = args
        .get(2)
        .ok_or("usage: delve stats <user_id> [--monthly]")?
        .parse::<u64>()?;
    let period = parse_period(args);

    let tracker = DailyTracker::new()?;
    let Some(stats) = tracker.stats_since(user_id, period) else {
        println!("No stats for user {} yet; run `delve update` first", user_id);
        return Ok(());
    };

    println!(
        "Catacombs: +{:.0} xp ({:.2} -> {:.2})",
        stats.catacombs.gained, stats.catacombs.start_level, stats.catacombs.current_level
    );
    for (class, track) in &stats.classes {
        println!(
            "  {:<8} +{:.0} xp ({:.2} -> {:.2})",
            class, track.gained, track.start_level, track.current_level
        );
    }
    Ok(())
}

fn cmd_leaderboard(args: &[String]) -> Result<(), Box<dyn Error>> {
    let period = parse_period(args);
    let tracker = DailyTracker::new()?;

    let board = tracker.leaderboard(period);
    if board.is_empty() {
        println!("Leaderboard is empty");
        return Ok(());
    }

    let title = match period {
        Period::Daily => "Daily",
        Period::Monthly => "Monthly",
    };
    println!("{} catacombs XP leaderboard:", title);
    for (rank, entry) in board.iter().enumerate() {
        println!("{:>3}. {:<16} +{:.0} xp", rank + 1, entry.ign, entry.gained);
    }
    Ok(())
}

fn cmd_drops(args: &[String]) -> Result<(), Box<dyn Error>> {
    let user_id = args
        .get(2)
        .ok_or("usage: delve drops <user_id> [floor]")?
        .parse::<u64>()?;

    let drops = DropLog::new()?;
    match args.get(3) {
        Some(floor) => {
            let stats = drops.floor_stats(user_id, floor);
            if stats.is_empty() {
                println!("No drops recorded on {}", floor);
            }
            for (item, count) in stats {
                println!("{:<40} {}", item, count);
            }
        }
        None => {
            let stats = drops.user_stats(user_id);
            if stats.is_empty() {
                println!("No drops recorded");
            }
            for (floor, items) in stats {
                println!("{}:", floor);
                for (item, count) in items {
                    println!("  {:<38} {}", item, count);
                }
            }
        }
    }
    Ok(())
}

fn cmd_drop_add(args: &[String]) -> Result<(), Box<dyn Error>> {
    let usage = "usage: delve drop-add <user_id> <floor> <item> [delta]";
    let user_id = args.get(2).ok_or(usage)?.parse::<u64>()?;
    let floor = args.get(3).ok_or(usage)?;
    let item = args.get(4).ok_or(usage)?;
    let delta: i64 = match args.get(5) {
        Some(d) => d.parse()?,
        None => 1,
    };

    if !delve::constants::is_drop_floor(floor) {
        return Err(format!("unknown floor: {}", floor).into());
    }

    let mut drops = DropLog::new()?;
    let count = drops.adjust(user_id, floor, item, delta)?;
    println!("{} -> {}", item, count);
    Ok(())
}

fn cmd_drop_set(args: &[String]) -> Result<(), Box<dyn Error>> {
    let usage = "usage: delve drop-set <user_id> <floor> <item> <count>";
    let user_id = args.get(2).ok_or(usage)?.parse::<u64>()?;
    let floor = args.get(3).ok_or(usage)?;
    let item = args.get(4).ok_or(usage)?;
    let count: u32 = args.get(5).ok_or(usage)?.parse()?;

    if !delve::constants::is_drop_floor(floor) {
        return Err(format!("unknown floor: {}", floor).into());
    }

    let mut drops = DropLog::new()?;
    drops.set_count(user_id, floor, item, count)?;
    println!("{} -> {}", item, count);
    Ok(())
}

fn cmd_drop_target(args: &[String]) -> Result<(), Box<dyn Error>> {
    let user_id = args
        .get(2)
        .ok_or("usage: delve drop-target <user_id> [target]")?
        .parse::<u64>()?;

    let mut drops = DropLog::new()?;
    match args.get(3) {
        Some(target) => {
            drops.set_default_target(user_id, target)?;
            println!("Default target set to {}", target);
        }
        None => match drops.default_target(user_id) {
            Some(target) => println!("{}", target),
            None => println!("No default target set"),
        },
    }
    Ok(())
}

fn cmd_repair() -> Result<(), Box<dyn Error>> {
    let mut api = ApiClient::new();
    let mut tracker = DailyTracker::new()?;
    let fixed = tracker.repair_uuids(&mut api)?;
    println!("Repaired {} uuids", fixed);
    Ok(())
}

fn parse_period(args: &[String]) -> Period {
    if args.iter().any(|a| a == "--monthly") {
        Period::Monthly
    } else {
        Period::Daily
    }
}

fn print_help() {
    println!("Delve - dungeon progression tracker");
    println!();
    println!("USAGE:");
    println!("    delve <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    link <user_id> <ign>                   Link a chat user to an in-game name");
    println!("    unlink <user_id>                       Remove a link");
    println!("    lookup <ign>                           Show current class levels");
    println!("    runs <ign>                             Show per-floor completion counts");
    println!("    prices <ITEM_ID>...                    Show market prices for item ids");
    println!("    simulate <ign> [options]               Project runs to the target level");
    println!("        --floor <CODE>  -t <LEVEL>  --hecatomb/--global/--mayor <V>");
    println!("    bonus [show|set <field> <v>|reset]     Inspect or adjust default bonuses");
    println!("    update                                 Refresh XP for all tracked users");
    println!("    stats <user_id> [--monthly]            Personal gained-XP stats");
    println!("    leaderboard [--monthly]                Gained-XP leaderboard");
    println!("    drops <user_id> [floor]                Show drop tallies");
    println!("    drop-add <user_id> <floor> <item> [n]  Adjust a drop counter");
    println!("    drop-set <user_id> <floor> <item> <n>  Set a drop counter");
    println!("    drop-target <user_id> [target]         Show or set the default search target");
    println!("    repair                                 Fix malformed stored uuids");
    println!("    version                                Show build info");
}
