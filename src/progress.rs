//! The user's solved-set: problem ids persisted as one JSON array under a
//! single key of a key-value store. It never writes into the taxonomy.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::taxonomy::Topic;

pub const SOLVED_KEY: &str = "endlesscode-solved";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object file of string values; a missing file is an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A file that is not a JSON object of strings reads as empty and is
    /// replaced on the next write.
    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        match serde_json::from_str(&json) {
            Ok(all) => Ok(all),
            Err(e) => {
                warn!("Ignoring unreadable store file {}: {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value);
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&all)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

pub struct Progress<S: KeyValueStore> {
    store: S,
    solved: BTreeSet<String>,
}

impl<S: KeyValueStore> Progress<S> {
    /// Read the solved-set once. An absent key is an empty set; an
    /// unreadable store or value is logged and treated the same way.
    pub fn load(store: S) -> Result<Self> {
        let raw = match store.get(SOLVED_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Ignoring unreadable solved-set store: {:#}", e);
                None
            }
        };
        let solved = match raw {
            None => BTreeSet::new(),
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    warn!("Ignoring unreadable solved-set under {}: {}", SOLVED_KEY, e);
                    BTreeSet::new()
                }
            },
        };
        debug!("Loaded {} solved problems", solved.len());
        Ok(Self { store, solved })
    }

    /// Flip `id` and persist. Returns whether it is now solved.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let now_solved = if self.solved.remove(id) {
            false
        } else {
            self.solved.insert(id.to_string());
            true
        };
        self.save()?;
        Ok(now_solved)
    }

    fn save(&mut self) -> Result<()> {
        let ids: Vec<&String> = self.solved.iter().collect();
        let json = serde_json::to_string(&ids)?;
        self.store.set(SOLVED_KEY, json)
    }

    pub fn is_solved(&self, id: &str) -> bool {
        self.solved.contains(id)
    }

    pub fn solved_count(&self) -> usize {
        self.solved.len()
    }

    /// Rounded share of `total` that is solved; 0 when there is nothing to solve.
    pub fn percentage(&self, total: usize) -> u32 {
        if total == 0 {
            return 0;
        }
        ((self.solved.len() as f64 / total as f64) * 100.0).round() as u32
    }

    pub fn solved_in(&self, topic: &Topic) -> usize {
        topic.problems().filter(|p| self.is_solved(&p.id)).count()
    }

    #[cfg(test)]
    pub fn into_store(self) -> S {
        self.store
    }
}
