//! Delve - dungeon progression tracker and run simulator.
//!
//! Fetches dungeon profile data, projects runs-to-target-level across the
//! five class tracks, and keeps drop tallies and daily/monthly XP
//! leaderboards.

pub mod api;
pub mod build_info;
pub mod cache;
pub mod constants;
pub mod daily_tracker;
pub mod drop_log;
pub mod leveling;
pub mod link_store;
pub mod settings;
pub mod simulation;
