//! Persistent registry of known publishers
//!
//! Maps a human-readable name to the address of a publisher. The whole
//! store is loaded when the registry is opened and rewritten in full after
//! every mutation. There is no locking: with several processes editing the
//! same file, the last writer wins.
//!
//! # File Format
//!
//! ```json
//! {
//!   "chassis": {
//!     "port": 5555,
//!     "host": "localhost",
//!     "description": "encoder + IMU stream"
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default registry location, relative to the working directory
pub const DEFAULT_REGISTRY_PATH: &str = "publishers.json";

/// Host used when none is given
pub const DEFAULT_HOST: &str = "localhost";

/// Address and description stored under a publisher name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherEntry {
    pub port: u16,
    pub host: String,
    #[serde(default)]
    pub description: String,
}

/// A named registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublisherRecord<'a> {
    pub name: &'a str,
    pub port: u16,
    pub host: &'a str,
    pub description: &'a str,
}

impl<'a> PublisherRecord<'a> {
    fn new(name: &'a str, entry: &'a PublisherEntry) -> Self {
        Self {
            name,
            port: entry.port,
            host: &entry.host,
            description: &entry.description,
        }
    }
}

/// Name → address store, persisted as JSON
#[derive(Debug)]
pub struct PublisherRegistry {
    path: PathBuf,
    publishers: IndexMap<String, PublisherEntry>,
}

impl PublisherRegistry {
    /// Open the registry at `path`, starting empty if the file does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let publishers = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|e| {
                Error::Config(format!("invalid registry {}: {}", path.display(), e))
            })?
        } else {
            log::debug!("No registry at {}, starting empty", path.display());
            IndexMap::new()
        };

        Ok(Self { path, publishers })
    }

    /// Insert or replace a publisher, then persist
    ///
    /// Re-adding an existing name keeps its position in the listing.
    pub fn add(&mut self, name: &str, port: u16, host: &str, description: &str) -> Result<()> {
        self.publishers.insert(
            name.to_string(),
            PublisherEntry {
                port,
                host: host.to_string(),
                description: description.to_string(),
            },
        );
        self.save()?;
        log::debug!("Registered {} -> {}:{}", name, host, port);
        Ok(())
    }

    /// Remove a publisher if present, then persist
    ///
    /// Returns `false` (and leaves the file untouched) when the name is unknown.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        if self.publishers.shift_remove(name).is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Look up a publisher by name
    pub fn get(&self, name: &str) -> Option<PublisherRecord<'_>> {
        self.publishers
            .get_key_value(name)
            .map(|(name, entry)| PublisherRecord::new(name, entry))
    }

    /// All publishers in insertion order
    pub fn list_all(&self) -> impl Iterator<Item = PublisherRecord<'_>> {
        self.publishers
            .iter()
            .map(|(name, entry)| PublisherRecord::new(name, entry))
    }

    /// First registered name for an exact `(host, port)` pair
    pub fn name_for(&self, host: &str, port: u16) -> Option<&str> {
        self.publishers
            .iter()
            .find(|(_, entry)| entry.port == port && entry.host == host)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }

    /// Rewrite the whole store
    ///
    /// Writes a sibling temp file and renames it over the store, so readers
    /// never see a half-written file.
    fn save(&self) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(&self.publishers)?;
        json.push(b'\n');

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
