//! Persistent chat-user to in-game-name links.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// JSON-backed map of chat user id -> linked in-game name.
pub struct LinkStore {
    path: PathBuf,
    links: BTreeMap<String, String>,
}

impl LinkStore {
    /// Open the store in the default data directory (`~/.delve`).
    pub fn new() -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine home directory")
        })?;

        let data_dir = home_dir.join(".delve");
        fs::create_dir_all(&data_dir)?;
        Self::open(data_dir.join("user_links.json"))
    }

    /// Open a store at an explicit path. Missing file starts empty.
    pub fn open(path: PathBuf) -> io::Result<Self> {
        let links = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        } else {
            log::info!("no user links file found, starting fresh");
            BTreeMap::new()
        };

        if !links.is_empty() {
            log::info!("loaded {} user links", links.len());
        }
        Ok(Self { path, links })
    }

    pub fn link(&mut self, user_id: u64, ign: &str) -> io::Result<()> {
        self.links.insert(user_id.to_string(), ign.to_string());
        self.save()?;
        log::info!("linked user {} to ign {}", user_id, ign);
        Ok(())
    }

    /// Remove a link. Returns false if the user had none.
    pub fn unlink(&mut self, user_id: u64) -> io::Result<bool> {
        if self.links.remove(&user_id.to_string()).is_some() {
            self.save()?;
            log::info!("unlinked user {}", user_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn get(&self, user_id: u64) -> Option<&str> {
        self.links.get(&user_id.to_string()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn save(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.links)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> LinkStore {
        let path = std::env::temp_dir().join(format!("delve_links_{}_{}.json", name, std::process::id()));
        fs::remove_file(&path).ok();
        LinkStore::open(path).unwrap()
    }

    #[test]
    fn test_link_and_get() {
        let mut store = temp_store("link_get");
        store.link(42, "Steve").unwrap();
        assert_eq!(store.get(42), Some("Steve"));
        assert_eq!(store.get(43), None);
        fs::remove_file(&store.path).ok();
    }

    #[test]
    fn test_relink_overwrites() {
        let mut store = temp_store("relink");
        store.link(42, "Steve").unwrap();
        store.link(42, "Alex").unwrap();
        assert_eq!(store.get(42), Some("Alex"));
        assert_eq!(store.len(), 1);
        fs::remove_file(&store.path).ok();
    }

    #[test]
    fn test_unlink() {
        let mut store = temp_store("unlink");
        store.link(42, "Steve").unwrap();
        assert!(store.unlink(42).unwrap());
        assert!(!store.unlink(42).unwrap());
        assert!(store.is_empty());
        fs::remove_file(&store.path).ok();
    }

    #[test]
    fn test_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!("delve_links_reopen_{}.json", std::process::id()));
        fs::remove_file(&path).ok();

        let mut store = LinkStore::open(path.clone()).unwrap();
        store.link(7, "Herobrine").unwrap();
        drop(store);

        let reopened = LinkStore::open(path.clone()).unwrap();
        assert_eq!(reopened.get(7), Some("Herobrine"));
        fs::remove_file(&path).ok();
    }
}
