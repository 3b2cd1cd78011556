//! Remote profile data fetch.
//!
//! Resolves player names to UUIDs and pulls dungeon XP, floor completion
//! counts and market prices from the upstream HTTP endpoints. Responses are
//! cached in-process per the TTL contract in `constants.rs`; rate limiting
//! beyond that is out of scope.

use crate::cache::TtlCache;
use crate::constants::{CLASS_NAMES, PRICES_CACHE_TTL, PROFILE_CACHE_TTL};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const UUID_ENDPOINT: &str = "https://playerdb.co/api/player/minecraft";
const PROFILES_ENDPOINT: &str =
    "https://adjectilsbackend.adjectivenoun3215.workers.dev/v2/skyblock/profiles";
const BAZAAR_ENDPOINT: &str = "https://api.hypixel.net/skyblock/bazaar";
const AUCTION_ENDPOINT: &str = "https://moulberry.codes/auction_averages_lbin/3day.json";

// The profiles endpoint sits behind Cloudflare and rejects default agents.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.2; WOW64; x64; rv:135.0) Gecko/20100101 Firefox/135.0";

const PROFILE_TIMEOUT: Duration = Duration::from_secs(15);
const PRICES_TIMEOUT: Duration = Duration::from_secs(10);

/// Price key for the M7 chestplate drop, which neither market endpoint lists.
pub const M7_CHESTPLATE_KEY: &str = "SKELETON_MASTER_CHESTPLATE_50";
const M7_CHESTPLATE_PRICE: f64 = 40_000_000.0;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid player name: {0}")]
    InvalidName(String),
    #[error("invalid player uuid: {0}")]
    InvalidUuid(String),
    #[error("request failed with status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed payload: {0}")]
    MalformedPayload(&'static str),
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => ApiError::Status(code),
            ureq::Error::Transport(t) => ApiError::Transport(t.to_string()),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Dungeon XP snapshot for one player: catacombs total plus per-class XP.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileXp {
    pub catacombs: f64,
    pub classes: BTreeMap<String, f64>,
}

/// Normal and master completion counts for one floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorRuns {
    pub normal: u32,
    pub master: u32,
}

/// HTTP client for the upstream endpoints, with an owned TTL cache.
pub struct ApiClient {
    agent: ureq::Agent,
    cache: TtlCache,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            cache: TtlCache::new(),
        }
    }

    /// Resolve an in-game name to its 32-hex UUID.
    pub fn resolve_uuid(&mut self, name: &str) -> Result<String, ApiError> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ApiError::InvalidName(name.to_string()));
        }

        let cache_key = format!("uuid:{}", name.to_lowercase());
        if let Some(Value::String(cached)) = self.cache.get(&cache_key) {
            log::debug!("using cached uuid for {}", name);
            return Ok(cached);
        }

        log::debug!("resolving uuid for {}", name);
        let response: Value = self
            .agent
            .get(&format!("{}/{}", UUID_ENDPOINT, name))
            .set("User-Agent", USER_AGENT)
            .call()?
            .into_json()?;

        let uuid = response["data"]["player"]["raw_id"]
            .as_str()
            .ok_or(ApiError::MalformedPayload("missing raw_id"))?
            .to_string();

        self.cache.set(
            &cache_key,
            Value::String(uuid.clone()),
            Duration::from_secs(PROFILE_CACHE_TTL),
        );
        Ok(uuid)
    }

    /// Fetch the raw profiles payload for a UUID.
    pub fn fetch_profile(&mut self, uuid: &str) -> Result<Value, ApiError> {
        validate_uuid(uuid)?;

        let cache_key = format!("profile:{}", uuid);
        if let Some(cached) = self.cache.get(&cache_key) {
            log::debug!("using cached profile for {}", uuid);
            return Ok(cached);
        }

        log::debug!("fetching profile for {}", uuid);
        let response: Value = self
            .agent
            .get(&format!("{}?uuid={}", PROFILES_ENDPOINT, uuid))
            .set("User-Agent", USER_AGENT)
            .timeout(PROFILE_TIMEOUT)
            .call()?
            .into_json()?;

        self.cache.set(
            &cache_key,
            response.clone(),
            Duration::from_secs(PROFILE_CACHE_TTL),
        );
        Ok(response)
    }

    /// Current catacombs and class XP for a player.
    pub fn fetch_class_xp(&mut self, uuid: &str) -> Result<ProfileXp, ApiError> {
        let profile = self.fetch_profile(uuid)?;
        extract_class_xp(&profile, uuid)
    }

    /// Per-floor normal/master completion counts for a player.
    pub fn fetch_floor_runs(&mut self, uuid: &str) -> Result<BTreeMap<String, FloorRuns>, ApiError> {
        let profile = self.fetch_profile(uuid)?;
        extract_floor_runs(&profile, uuid)
    }

    /// Merged bazaar + auction-house price map. Endpoint failures degrade to
    /// an empty map, cached for the full TTL so a dead endpoint is not
    /// re-polled on every request.
    pub fn fetch_prices(&mut self) -> BTreeMap<String, f64> {
        let cache_key = "prices";
        if let Some(cached) = self.cache.get(cache_key) {
            return value_to_price_map(&cached);
        }

        let mut prices = self.fetch_bazaar_prices();
        prices.extend(self.fetch_auction_prices());
        prices.insert(M7_CHESTPLATE_KEY.to_string(), M7_CHESTPLATE_PRICE);

        self.cache.set(
            cache_key,
            json!(prices),
            Duration::from_secs(PRICES_CACHE_TTL),
        );
        prices
    }

    /// Remaining lifetime of the cached price map, if any.
    pub fn prices_expiry(&self) -> Option<Duration> {
        self.cache.expiry("prices")
    }

    fn fetch_bazaar_prices(&self) -> BTreeMap<String, f64> {
        log::debug!("fetching bazaar prices");
        let payload = match self.fetch_json(BAZAAR_ENDPOINT) {
            Ok(v) => v,
            Err(e) => {
                log::error!("bazaar price fetch failed: {}", e);
                return BTreeMap::new();
            }
        };

        let mut prices = BTreeMap::new();
        if let Some(products) = payload["products"].as_object() {
            for (id, info) in products {
                if let Some(price) = info["quick_status"]["sellPrice"].as_f64() {
                    prices.insert(id.clone(), price);
                }
            }
        }
        prices
    }

    fn fetch_auction_prices(&self) -> BTreeMap<String, f64> {
        log::debug!("fetching auction prices (3-day average)");
        match self.fetch_json(AUCTION_ENDPOINT) {
            Ok(payload) => value_to_price_map(&payload),
            Err(e) => {
                log::error!("auction price fetch failed: {}", e);
                BTreeMap::new()
            }
        }
    }

    fn fetch_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self
            .agent
            .get(url)
            .set("User-Agent", USER_AGENT)
            .timeout(PRICES_TIMEOUT)
            .call()?;
        Ok(response.into_json()?)
    }
}

/// Reject anything that is not a 32-hex Mojang-style UUID.
pub fn validate_uuid(uuid: &str) -> Result<(), ApiError> {
    if uuid.len() != 32 || Uuid::try_parse(uuid).is_err() {
        return Err(ApiError::InvalidUuid(uuid.to_string()));
    }
    Ok(())
}

/// Pull catacombs and class XP out of a raw profiles payload.
///
/// The selected profile wins; otherwise the first one. Missing classes and
/// missing experience fields read as 0 so partial profiles still resolve.
pub fn extract_class_xp(profile_data: &Value, uuid: &str) -> Result<ProfileXp, ApiError> {
    let member = select_member(profile_data, uuid)?;
    let dungeons = &member["dungeons"];

    let catacombs = dungeons["dungeon_types"]["catacombs"]["experience"]
        .as_f64()
        .unwrap_or(0.0);

    let mut classes = BTreeMap::new();
    for class_name in CLASS_NAMES {
        let xp = dungeons["player_classes"][class_name]["experience"]
            .as_f64()
            .unwrap_or(0.0);
        classes.insert(class_name.to_string(), xp);
    }

    Ok(ProfileXp { catacombs, classes })
}

/// Pull per-floor completion counts out of a raw profiles payload.
pub fn extract_floor_runs(
    profile_data: &Value,
    uuid: &str,
) -> Result<BTreeMap<String, FloorRuns>, ApiError> {
    let member = select_member(profile_data, uuid)?;
    let dungeon_types = &member["dungeons"]["dungeon_types"];
    let normal = &dungeon_types["catacombs"]["tier_completions"];
    let master = &dungeon_types["master_catacombs"]["tier_completions"];

    let tier_to_floor = [
        ("1", "Floor 1 (Bonzo)"),
        ("2", "Floor 2 (Scarf)"),
        ("3", "Floor 3 (Professor)"),
        ("4", "Floor 4 (Thorn)"),
        ("5", "Floor 5 (Livid)"),
        ("6", "Floor 6 (Sadan)"),
        ("7", "Floor 7 (Necron)"),
    ];

    let mut runs = BTreeMap::new();
    for (tier, floor_name) in tier_to_floor {
        runs.insert(
            floor_name.to_string(),
            FloorRuns {
                normal: normal[tier].as_f64().unwrap_or(0.0) as u32,
                master: master[tier].as_f64().unwrap_or(0.0) as u32,
            },
        );
    }
    Ok(runs)
}

fn select_member<'a>(profile_data: &'a Value, uuid: &str) -> Result<&'a Value, ApiError> {
    let profiles = profile_data["profiles"]
        .as_array()
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MalformedPayload("no profiles"))?;

    let selected = profiles
        .iter()
        .find(|p| p["selected"].as_bool().unwrap_or(false))
        .unwrap_or(&profiles[0]);

    Ok(&selected["members"][uuid])
}

fn value_to_price_map(value: &Value) -> BTreeMap<String, f64> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_f64().map(|price| (k.clone(), price)))
                .collect()
        })
        .unwrap_or_default()
}
