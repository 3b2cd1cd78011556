//! Daily and monthly XP tracking.
//!
//! Keeps the set of tracked users, their latest XP readings, and the
//! snapshot each period is measured against. Snapshots roll over at UTC
//! day/month boundaries; gained XP is simply current minus snapshot.
//!
//! State is persisted as a checksummed binary file: version magic, payload
//! length, bincode payload, SHA-256 over all of the preceding bytes.

use crate::api::{validate_uuid, ApiClient, ProfileXp};
use crate::constants::SNAPSHOT_VERSION_MAGIC;
use crate::leveling::level_for_xp;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// One XP observation for a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XpReading {
    pub timestamp: i64,
    pub catacombs: f64,
    pub classes: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedUser {
    pub ign: String,
    pub uuid: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TrackerData {
    users: BTreeMap<String, TrackedUser>,
    current: BTreeMap<String, XpReading>,
    daily_snapshots: BTreeMap<String, XpReading>,
    monthly_snapshots: BTreeMap<String, XpReading>,
    last_daily_reset: i64,
    last_monthly_reset: i64,
    last_updated: i64,
}

/// Which snapshot a stats/leaderboard query measures against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Monthly,
}

/// Progress of one track (catacombs or a class) since the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStats {
    pub gained: f64,
    pub start_xp: f64,
    pub current_xp: f64,
    pub start_level: f64,
    pub current_level: f64,
}

/// Per-user progress summary for a period.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub catacombs: TrackStats,
    pub classes: BTreeMap<String, TrackStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub ign: String,
    pub user_id: u64,
    pub gained: f64,
}

/// Tracked-user state with checksummed binary persistence.
pub struct DailyTracker {
    path: PathBuf,
    data: TrackerData,
}

impl DailyTracker {
    /// Open the tracker in the default data directory.
    pub fn new() -> io::Result<Self> {
        let project_dirs = directories::ProjectDirs::from("", "", "delve").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine data directory")
        })?;

        let data_dir = project_dirs.data_dir();
        fs::create_dir_all(data_dir)?;
        Self::open(data_dir.join("tracker.dat"))
    }

    /// Open a tracker file at an explicit path. Missing file starts fresh.
    pub fn open(path: PathBuf) -> io::Result<Self> {
        let data = if path.exists() {
            let data = load_data(&path)?;
            log::info!("loaded tracker data for {} users", data.users.len());
            data
        } else {
            log::info!("no tracker file found, starting fresh");
            TrackerData::default()
        };
        Ok(Self { path, data })
    }

    /// Add a user to tracking, or refresh their ign if it changed.
    pub fn register_user(&mut self, user_id: u64, ign: &str, uuid: &str) -> io::Result<()> {
        let key = user_id.to_string();
        match self.data.users.get_mut(&key) {
            Some(user) if user.ign == ign && user.uuid == uuid => return Ok(()),
            Some(user) => {
                user.ign = ign.to_string();
                user.uuid = uuid.to_string();
            }
            None => {
                self.data.users.insert(
                    key,
                    TrackedUser {
                        ign: ign.to_string(),
                        uuid: uuid.to_string(),
                    },
                );
                log::info!("registered {} ({}) for daily tracking", ign, user_id);
            }
        }
        self.save()
    }

    pub fn tracked_users(&self) -> Vec<(u64, String)> {
        self.data
            .users
            .iter()
            .filter_map(|(id, user)| id.parse().ok().map(|id| (id, user.uuid.clone())))
            .collect()
    }

    /// Store a fresh XP reading. The first reading for a user also seeds the
    /// daily and monthly snapshots so gained XP starts at zero.
    pub fn record_reading(&mut self, user_id: u64, xp: &ProfileXp, now: i64) -> io::Result<()> {
        let key = user_id.to_string();
        let reading = XpReading {
            timestamp: now,
            catacombs: xp.catacombs,
            classes: xp.classes.clone(),
        };

        self.data
            .daily_snapshots
            .entry(key.clone())
            .or_insert_with(|| reading.clone());
        self.data
            .monthly_snapshots
            .entry(key.clone())
            .or_insert_with(|| reading.clone());
        self.data.current.insert(key, reading);
        self.data.last_updated = now;
        self.save()
    }

    /// Roll snapshots over UTC boundaries. Returns (daily, monthly) flags
    /// for whichever resets fired.
    pub fn check_resets(&mut self, now: DateTime<Utc>) -> io::Result<(bool, bool)> {
        let mut daily = false;
        let mut monthly = false;

        let last_daily = Utc
            .timestamp_opt(self.data.last_daily_reset, 0)
            .single()
            .unwrap_or_default();
        if now.date_naive() > last_daily.date_naive() {
            log::info!("performing daily reset");
            self.data.daily_snapshots = self.data.current.clone();
            self.data.last_daily_reset = now.timestamp();
            daily = true;
        }

        let last_monthly = Utc
            .timestamp_opt(self.data.last_monthly_reset, 0)
            .single()
            .unwrap_or_default();
        if now.month() != last_monthly.month() || now.year() != last_monthly.year() {
            log::info!("performing monthly reset");
            self.data.monthly_snapshots = self.data.current.clone();
            self.data.last_monthly_reset = now.timestamp();
            monthly = true;
        }

        if daily || monthly {
            self.save()?;
        }
        Ok((daily, monthly))
    }

    pub fn last_updated(&self) -> i64 {
        self.data.last_updated
    }

    /// Gained XP and levels for one user since the period's snapshot.
    /// None until both a snapshot and a current reading exist.
    pub fn stats_since(&self, user_id: u64, period: Period) -> Option<UserStats> {
        let key = user_id.to_string();
        let current = self.data.current.get(&key)?;
        let start = self.snapshots(period).get(&key)?;

        let catacombs = track_stats(start.catacombs, current.catacombs);
        let classes = current
            .classes
            .iter()
            .map(|(class, xp)| {
                let start_xp = start.classes.get(class).copied().unwrap_or(0.0);
                (class.clone(), track_stats(start_xp, *xp))
            })
            .collect();

        Some(UserStats { catacombs, classes })
    }

    /// Catacombs-XP-gained leaderboard, descending, one entry per ign.
    pub fn leaderboard(&self, period: Period) -> Vec<LeaderboardEntry> {
        let mut best: BTreeMap<&str, LeaderboardEntry> = BTreeMap::new();

        for (id, user) in &self.data.users {
            let Ok(user_id) = id.parse() else { continue };
            let Some(stats) = self.stats_since(user_id, period) else {
                continue;
            };

            let gained = stats.catacombs.gained;
            match best.get(user.ign.as_str()) {
                Some(existing) if existing.gained >= gained => {}
                _ => {
                    best.insert(
                        user.ign.as_str(),
                        LeaderboardEntry {
                            ign: user.ign.clone(),
                            user_id,
                            gained,
                        },
                    );
                }
            }
        }

        let mut entries: Vec<LeaderboardEntry> = best.into_values().collect();
        entries.sort_by(|a, b| b.gained.partial_cmp(&a.gained).unwrap_or(std::cmp::Ordering::Equal));
        entries
    }

    /// Re-resolve any stored UUID that is not a valid 32-hex id (name
    /// changes used to leave these behind). Returns how many were fixed.
    pub fn repair_uuids(&mut self, api: &mut ApiClient) -> io::Result<u32> {
        let broken: Vec<(String, String)> = self
            .data
            .users
            .iter()
            .filter(|(_, user)| validate_uuid(&user.uuid).is_err())
            .map(|(id, user)| (id.clone(), user.ign.clone()))
            .collect();

        let mut fixed = 0;
        for (id, ign) in broken {
            match api.resolve_uuid(&ign) {
                Ok(uuid) => {
                    log::info!("repaired uuid for {}: {}", ign, uuid);
                    if let Some(user) = self.data.users.get_mut(&id) {
                        user.uuid = uuid;
                    }
                    fixed += 1;
                }
                Err(e) => log::error!("could not repair uuid for {}: {}", ign, e),
            }
        }

        if fixed > 0 {
            self.save()?;
        }
        Ok(fixed)
    }

    fn snapshots(&self, period: Period) -> &BTreeMap<String, XpReading> {
        match period {
            Period::Daily => &self.data.daily_snapshots,
            Period::Monthly => &self.data.monthly_snapshots,
        }
    }

    fn save(&self) -> io::Result<()> {
        let payload = bincode::serialize(&self.data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let payload_len = payload.len() as u32;

        let mut hasher = Sha256::new();
        hasher.update(SNAPSHOT_VERSION_MAGIC.to_le_bytes());
        hasher.update(payload_len.to_le_bytes());
        hasher.update(&payload);
        let checksum = hasher.finalize();

        let mut file = fs::File::create(&self.path)?;
        file.write_all(&SNAPSHOT_VERSION_MAGIC.to_le_bytes())?;
        file.write_all(&payload_len.to_le_bytes())?;
        file.write_all(&payload)?;
        file.write_all(&checksum)?;
        Ok(())
    }
}

fn load_data(path: &PathBuf) -> io::Result<TrackerData> {
    let mut file = fs::File::open(path)?;

    let mut magic_bytes = [0u8; 8];
    file.read_exact(&mut magic_bytes)?;
    let magic = u64::from_le_bytes(magic_bytes);
    if magic != SNAPSHOT_VERSION_MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Invalid tracker file version: expected 0x{:016X}, got 0x{:016X}",
                SNAPSHOT_VERSION_MAGIC, magic
            ),
        ));
    }

    let mut length_bytes = [0u8; 4];
    file.read_exact(&mut length_bytes)?;
    let payload_len = u32::from_le_bytes(length_bytes);

    let mut payload = vec![0u8; payload_len as usize];
    file.read_exact(&mut payload)?;

    let mut stored_checksum = [0u8; 32];
    file.read_exact(&mut stored_checksum)?;

    let mut hasher = Sha256::new();
    hasher.update(magic_bytes);
    hasher.update(length_bytes);
    hasher.update(&payload);
    let computed = hasher.finalize();

    if stored_checksum != computed.as_slice() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Checksum verification failed",
        ));
    }

    bincode::deserialize(&payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn track_stats(start_xp: f64, current_xp: f64) -> TrackStats {
    TrackStats {
        gained: current_xp - start_xp,
        start_xp,
        current_xp,
        start_level: level_for_xp(start_xp),
        current_level: level_for_xp(current_xp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_tracker(name: &str) -> DailyTracker {
        let path = std::env::temp_dir().join(format!(
            "delve_tracker_{}_{}.dat",
            name,
            std::process::id()
        ));
        fs::remove_file(&path).ok();
        DailyTracker::open(path).unwrap()
    }

    fn reading(catacombs: f64, mage: f64) -> ProfileXp {
        let mut classes = BTreeMap::new();
        classes.insert("mage".to_string(), mage);
        ProfileXp { catacombs, classes }
    }

    #[test]
    fn test_first_reading_seeds_snapshots() {
        let mut tracker = temp_tracker("seed");
        tracker.register_user(1, "Steve", "0123456789abcdef0123456789abcdef").unwrap();
        tracker.record_reading(1, &reading(1000.0, 50.0), 100).unwrap();

        let stats = tracker.stats_since(1, Period::Daily).unwrap();
        assert_eq!(stats.catacombs.gained, 0.0);
        assert_eq!(stats.classes["mage"].gained, 0.0);
        fs::remove_file(&tracker.path).ok();
    }

    #[test]
    fn test_gained_xp_accumulates() {
        let mut tracker = temp_tracker("gain");
        tracker.register_user(1, "Steve", "0123456789abcdef0123456789abcdef").unwrap();
        tracker.record_reading(1, &reading(1000.0, 50.0), 100).unwrap();
        tracker.record_reading(1, &reading(2500.0, 80.0), 200).unwrap();

        let stats = tracker.stats_since(1, Period::Daily).unwrap();
        assert_eq!(stats.catacombs.gained, 1500.0);
        assert_eq!(stats.catacombs.start_xp, 1000.0);
        assert_eq!(stats.classes["mage"].gained, 30.0);
        assert_eq!(tracker.last_updated(), 200);
        fs::remove_file(&tracker.path).ok();
    }

    #[test]
    fn test_daily_reset_rolls_snapshot() {
        let mut tracker = temp_tracker("reset");
        tracker.register_user(1, "Steve", "0123456789abcdef0123456789abcdef").unwrap();
        tracker.record_reading(1, &reading(1000.0, 0.0), 100).unwrap();
        tracker.record_reading(1, &reading(3000.0, 0.0), 200).unwrap();

        let (daily, monthly) = tracker
            .check_resets(Utc.with_ymd_and_hms(2026, 3, 5, 0, 10, 0).unwrap())
            .unwrap();
        assert!(daily);
        assert!(monthly);

        // Snapshot is now the latest reading, so gained resets to zero.
        let stats = tracker.stats_since(1, Period::Daily).unwrap();
        assert_eq!(stats.catacombs.gained, 0.0);
        assert_eq!(stats.catacombs.start_xp, 3000.0);

        // Same day again: nothing fires.
        let (daily, monthly) = tracker
            .check_resets(Utc.with_ymd_and_hms(2026, 3, 5, 23, 0, 0).unwrap())
            .unwrap();
        assert!(!daily);
        assert!(!monthly);
        fs::remove_file(&tracker.path).ok();
    }

    #[test]
    fn test_monthly_reset_independent_of_daily() {
        let mut tracker = temp_tracker("monthly");
        tracker.register_user(1, "Steve", "0123456789abcdef0123456789abcdef").unwrap();
        tracker.record_reading(1, &reading(1000.0, 0.0), 100).unwrap();
        tracker
            .check_resets(Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap())
            .unwrap();

        tracker.record_reading(1, &reading(5000.0, 0.0), 200).unwrap();

        // Next day, same month: daily fires, monthly does not.
        let (daily, monthly) = tracker
            .check_resets(Utc.with_ymd_and_hms(2026, 3, 6, 0, 0, 0).unwrap())
            .unwrap();
        assert!(daily);
        assert!(!monthly);

        let monthly_stats = tracker.stats_since(1, Period::Monthly).unwrap();
        assert_eq!(monthly_stats.catacombs.gained, 4000.0);
        fs::remove_file(&tracker.path).ok();
    }

    #[test]
    fn test_leaderboard_ordering() {
        let mut tracker = temp_tracker("leaderboard");
        for (id, ign) in [(1u64, "Steve"), (2, "Alex"), (3, "Herobrine")] {
            tracker
                .register_user(id, ign, "0123456789abcdef0123456789abcdef")
                .unwrap();
            tracker.record_reading(id, &reading(0.0, 0.0), 100).unwrap();
        }
        tracker.record_reading(1, &reading(500.0, 0.0), 200).unwrap();
        tracker.record_reading(2, &reading(9000.0, 0.0), 200).unwrap();
        tracker.record_reading(3, &reading(100.0, 0.0), 200).unwrap();

        let board = tracker.leaderboard(Period::Daily);
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].ign, "Alex");
        assert_eq!(board[0].gained, 9000.0);
        assert_eq!(board[1].ign, "Steve");
        assert_eq!(board[2].ign, "Herobrine");
        fs::remove_file(&tracker.path).ok();
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "delve_tracker_roundtrip_{}.dat",
            std::process::id()
        ));
        fs::remove_file(&path).ok();

        let mut tracker = DailyTracker::open(path.clone()).unwrap();
        tracker.register_user(1, "Steve", "0123456789abcdef0123456789abcdef").unwrap();
        tracker.record_reading(1, &reading(1234.0, 56.0), 42).unwrap();
        drop(tracker);

        let reopened = DailyTracker::open(path.clone()).unwrap();
        assert_eq!(reopened.tracked_users().len(), 1);
        assert_eq!(reopened.last_updated(), 42);
        let stats = reopened.stats_since(1, Period::Daily).unwrap();
        assert_eq!(stats.catacombs.current_xp, 1234.0);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_corrupted_file_rejected() {
        let path = std::env::temp_dir().join(format!(
            "delve_tracker_corrupt_{}.dat",
            std::process::id()
        ));
        let mut tracker = DailyTracker::open(path.clone()).unwrap();
        tracker.register_user(1, "Steve", "0123456789abcdef0123456789abcdef").unwrap();
        drop(tracker);

        // Flip a payload byte; the checksum must catch it.
        let mut bytes = fs::read(&path).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        assert!(DailyTracker::open(path.clone()).is_err());
        fs::remove_file(&path).ok();
    }
}
