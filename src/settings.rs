//! Stored default bonus configuration.
//!
//! The simulator itself is pure and always receives an explicit
//! [`BonusConfig`]; this store just remembers the deployment's current
//! defaults so privileged users can adjust them between calls.

use crate::simulation::BonusConfig;
use std::fs;
use std::io;
use std::path::PathBuf;

pub struct BonusDefaults {
    path: PathBuf,
    config: BonusConfig,
}

impl BonusDefaults {
    /// Open the store in the default data directory (`~/.delve`).
    pub fn new() -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine home directory")
        })?;

        let data_dir = home_dir.join(".delve");
        fs::create_dir_all(&data_dir)?;
        Self::open(data_dir.join("bonus_defaults.json"))
    }

    /// Open a store at an explicit path. Missing file yields the built-in
    /// defaults.
    pub fn open(path: PathBuf) -> io::Result<Self> {
        let config = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        } else {
            BonusConfig::default()
        };
        Ok(Self { path, config })
    }

    pub fn get(&self) -> BonusConfig {
        self.config.clone()
    }

    pub fn set(&mut self, config: BonusConfig) -> io::Result<()> {
        self.config = config;
        let json = serde_json::to_string_pretty(&self.config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)?;
        log::info!("updated default bonuses");
        Ok(())
    }

    pub fn reset(&mut self) -> io::Result<()> {
        self.set(BonusConfig::default())
    }
}
