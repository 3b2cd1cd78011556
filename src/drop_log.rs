//! Per-user drop tallies.
//!
//! Counters are manual: users record their own drops per floor, and counts
//! never go below zero. A per-user default search target rides along for
//! the lookup commands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDrops {
    /// floor name -> item name -> count
    #[serde(default)]
    pub floors: BTreeMap<String, BTreeMap<String, u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_target: Option<String>,
}

/// JSON-backed per-user drop counters.
pub struct DropLog {
    path: PathBuf,
    data: BTreeMap<String, UserDrops>,
}

impl DropLog {
    /// Open the log in the default data directory (`~/.delve`).
    pub fn new() -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine home directory")
        })?;

        let data_dir = home_dir.join(".delve");
        fs::create_dir_all(&data_dir)?;
        Self::open(data_dir.join("drop_log.json"))
    }

    /// Open a log at an explicit path. Missing file starts empty.
    pub fn open(path: PathBuf) -> io::Result<Self> {
        let data = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        } else {
            log::info!("no drop log found, starting fresh");
            BTreeMap::new()
        };
        Ok(Self { path, data })
    }

    /// Apply a delta to a counter, clamping at zero. Returns the new count.
    pub fn adjust(
        &mut self,
        user_id: u64,
        floor: &str,
        item: &str,
        change: i64,
    ) -> io::Result<u32> {
        let entry = self
            .data
            .entry(user_id.to_string())
            .or_default()
            .floors
            .entry(floor.to_string())
            .or_default()
            .entry(item.to_string())
            .or_insert(0);

        let updated = (*entry as i64 + change).max(0) as u32;
        *entry = updated;
        self.save()?;
        log::info!(
            "drop update for {}: {} -> {} ({:+})",
            user_id,
            item,
            updated,
            change
        );
        Ok(updated)
    }

    /// Overwrite a counter outright.
    pub fn set_count(&mut self, user_id: u64, floor: &str, item: &str, count: u32) -> io::Result<()> {
        self.data
            .entry(user_id.to_string())
            .or_default()
            .floors
            .entry(floor.to_string())
            .or_default()
            .insert(item.to_string(), count);
        self.save()?;
        log::info!("drop set for {}: {} -> {}", user_id, item, count);
        Ok(())
    }

    pub fn floor_stats(&self, user_id: u64, floor: &str) -> BTreeMap<String, u32> {
        self.data
            .get(&user_id.to_string())
            .and_then(|user| user.floors.get(floor))
            .cloned()
            .unwrap_or_default()
    }

    pub fn user_stats(&self, user_id: u64) -> BTreeMap<String, BTreeMap<String, u32>> {
        self.data
            .get(&user_id.to_string())
            .map(|user| user.floors.clone())
            .unwrap_or_default()
    }

    pub fn default_target(&self, user_id: u64) -> Option<&str> {
        self.data
            .get(&user_id.to_string())
            .and_then(|user| user.default_target.as_deref())
    }

    pub fn set_default_target(&mut self, user_id: u64, target: &str) -> io::Result<()> {
        self.data
            .entry(user_id.to_string())
            .or_default()
            .default_target = Some(target.to_string());
        self.save()
    }

    fn save(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> DropLog {
        let path = std::env::temp_dir().join(format!("delve_drops_{}_{}.json", name, std::process::id()));
        fs::remove_file(&path).ok();
        DropLog::open(path).unwrap()
    }

    #[test]
    fn test_adjust_accumulates() {
        let mut log = temp_log("accumulate");
        assert_eq!(log.adjust(1, "Floor 7 (Necron)", "Implosion", 1).unwrap(), 1);
        assert_eq!(log.adjust(1, "Floor 7 (Necron)", "Implosion", 2).unwrap(), 3);
        fs::remove_file(&log.path).ok();
    }

    #[test]
    fn test_adjust_clamps_at_zero() {
        let mut log = temp_log("clamp");
        log.adjust(1, "Floor 7 (Necron)", "Implosion", 2).unwrap();
        assert_eq!(
            log.adjust(1, "Floor 7 (Necron)", "Implosion", -5).unwrap(),
            0
        );
        fs::remove_file(&log.path).ok();
    }

    #[test]
    fn test_set_count() {
        let mut log = temp_log("set");
        log.set_count(1, "Floor 6 (Sadan)", "Giant's Sword", 4).unwrap();
        let stats = log.floor_stats(1, "Floor 6 (Sadan)");
        assert_eq!(stats["Giant's Sword"], 4);
        fs::remove_file(&log.path).ok();
    }

    #[test]
    fn test_user_stats_isolated_per_user() {
        let mut log = temp_log("isolated");
        log.adjust(1, "Floor 5 (Livid)", "Shadow Fury", 1).unwrap();
        log.adjust(2, "Floor 5 (Livid)", "Shadow Fury", 7).unwrap();
        assert_eq!(log.floor_stats(1, "Floor 5 (Livid)")["Shadow Fury"], 1);
        assert_eq!(log.floor_stats(2, "Floor 5 (Livid)")["Shadow Fury"], 7);
        assert!(log.user_stats(3).is_empty());
        fs::remove_file(&log.path).ok();
    }

    #[test]
    fn test_default_target_round_trip() {
        let mut log = temp_log("target");
        assert_eq!(log.default_target(1), None);
        log.set_default_target(1, "123456").unwrap();
        assert_eq!(log.default_target(1), Some("123456"));
        fs::remove_file(&log.path).ok();
    }

    #[test]
    fn test_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!("delve_drops_reopen_{}.json", std::process::id()));
        fs::remove_file(&path).ok();

        let mut log = DropLog::open(path.clone()).unwrap();
        log.adjust(9, "Floor 4 (Thorn)", "Spirit Wing", 2).unwrap();
        drop(log);

        let reopened = DropLog::open(path.clone()).unwrap();
        assert_eq!(reopened.floor_stats(9, "Floor 4 (Thorn)")["Spirit Wing"], 2);
        fs::remove_file(&path).ok();
    }
}
