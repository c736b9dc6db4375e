//! Cache mementos: persisted overrides of generated cache state.
//!
//! A cache that has been mutated is committed here as a serialized
//! [`CacheMemento`] under its cell key (`"<i>,<j>"`). Resolving a cell
//! checks the store first and falls back to the generator on a miss, so
//! untouched cells cost nothing to persist.
//!
//! # Schema
//!
//! ```text
//! {"version": 1, "coins": ["<coin id>", ...]}
//! ```
//!
//! Unknown fields are ignored. A `version` greater than
//! [`MEMENTO_SCHEMA_VERSION`] is rejected rather than misread.
//!
//! The store has no eviction policy; it grows for the life of the session.

use std::collections::BTreeMap;

use coinfield_types::{CellCoord, Coin};
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::error::WorldError;
use crate::generator::CacheGenerator;
use crate::luck::Luck;

/// Highest memento schema version this build reads and the one it writes.
pub const MEMENTO_SCHEMA_VERSION: u32 = 1;

/// Versioned snapshot of a cache's coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMemento {
    /// Schema version of this snapshot.
    pub version: u32,
    /// Coin ids in cache order.
    pub coins: Vec<String>,
}

impl CacheMemento {
    /// Snapshot the current coins of `cache`.
    pub fn capture(cache: &Cache) -> Self {
        Self {
            version: MEMENTO_SCHEMA_VERSION,
            coins: cache.coins().iter().map(|coin| coin.id.clone()).collect(),
        }
    }

    /// Rebuild the cache this memento describes.
    pub fn restore(self) -> Cache {
        Cache::from_coins(self.coins.into_iter().map(Coin::from_id).collect())
    }

    /// Encode as the JSON stored in the session blob.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MementoEncoding`] if serialization fails.
    pub fn encode(&self) -> Result<String, WorldError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a memento stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CorruptMemento`] if `raw` is not a memento, or
    /// [`WorldError::UnsupportedMementoVersion`] if it was written by a newer
    /// schema.
    pub fn decode(key: &str, raw: &str) -> Result<Self, WorldError> {
        let memento: Self =
            serde_json::from_str(raw).map_err(|source| WorldError::CorruptMemento {
                key: key.to_owned(),
                source,
            })?;
        if memento.version > MEMENTO_SCHEMA_VERSION {
            return Err(WorldError::UnsupportedMementoVersion {
                key: key.to_owned(),
                version: memento.version,
            });
        }
        Ok(memento)
    }
}

/// Serialized cache overrides keyed by cell key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MementoStore {
    entries: BTreeMap<String, String>,
}

impl MementoStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Rebuild a store from persisted `(key, serialized memento)` pairs.
    ///
    /// Every memento is decoded up front so that a corrupt entry is caught
    /// at load time rather than on some later resolve. Later duplicates of a
    /// key overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// Returns the first decode error encountered.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, WorldError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries = BTreeMap::new();
        for (key, raw) in pairs {
            CacheMemento::decode(&key, &raw)?;
            entries.insert(key, raw);
        }
        Ok(Self { entries })
    }

    /// Persistable `(key, serialized memento)` pairs, ordered by key.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(key, raw)| (key.clone(), raw.clone()))
            .collect()
    }

    /// Number of stored mementos.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no memento is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the mementos whose key satisfies `keep`. Returns the keys
    /// that were dropped, in key order.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut dropped = Vec::new();
        self.entries.retain(|key, _| {
            let kept = keep(key.as_str());
            if !kept {
                dropped.push(key.clone());
            }
            kept
        });
        dropped
    }

    /// Whether a memento is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The stored override for `key`, or `None` on a miss.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the stored memento is unreadable.
    pub fn lookup(&self, key: &str) -> Result<Option<Cache>, WorldError> {
        self.entries
            .get(key)
            .map(|raw| CacheMemento::decode(key, raw).map(CacheMemento::restore))
            .transpose()
    }

    /// Current state of the cache at `coord`: the stored override if one
    /// exists, otherwise the freshly generated initial cache.
    ///
    /// Does not check the spawn decision; callers gate on it.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the stored memento is unreadable.
    pub fn resolve<L: Luck>(
        &self,
        coord: CellCoord,
        generator: &CacheGenerator<L>,
    ) -> Result<Cache, WorldError> {
        let key = coord.key();
        if let Some(cache) = self.lookup(&key)? {
            tracing::debug!(cell = %coord, coins = cache.len(), "Memento hit");
            return Ok(cache);
        }
        tracing::debug!(cell = %coord, "Memento miss, regenerating");
        Ok(generator.generate(coord))
    }

    /// Store `cache` as the override for `key`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MementoEncoding`] if serialization fails; the
    /// previous memento is kept in that case.
    pub fn commit(&mut self, key: &str, cache: &Cache) -> Result<(), WorldError> {
        let raw = CacheMemento::capture(cache).encode()?;
        self.entries.insert(key.to_owned(), raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> CacheGenerator<fn(&str) -> f64> {
        fn luck(seed: &str) -> f64 {
            if seed.ends_with(":firstCoins") { 0.41 } else { 0.05 }
        }
        CacheGenerator::new(luck as fn(&str) -> f64, 0.1, 5)
    }

    fn coins(ids: &[&str]) -> Cache {
        Cache::from_coins(ids.iter().map(|id| Coin::from_id(*id)).collect())
    }

    #[test]
    fn miss_falls_back_to_generator() {
        let store = MementoStore::new();
        let coord = CellCoord::new(0, 0);
        assert!(matches!(store.lookup("0,0"), Ok(None)));
        let cache = store.resolve(coord, &generator());
        assert_eq!(cache.ok(), Some(coins(&["0:0#0", "0:0#1", "0:0#2"])));
    }

    #[test]
    fn resolve_after_commit_round_trips() {
        let mut store = MementoStore::new();
        let coord = CellCoord::new(0, 0);
        let committed = coins(&["0:0#2", "7:-1#4", "0:0#0"]);
        assert!(store.commit(&coord.key(), &committed).is_ok());

        let resolved = store.resolve(coord, &generator());
        assert_eq!(resolved.ok(), Some(committed));
    }

    #[test]
    fn empty_cache_is_a_real_override() {
        let mut store = MementoStore::new();
        let coord = CellCoord::new(0, 0);
        assert!(store.commit("0,0", &Cache::default()).is_ok());
        let resolved = store.resolve(coord, &generator());
        assert_eq!(resolved.ok(), Some(Cache::default()));
    }

    #[test]
    fn commit_overwrites() {
        let mut store = MementoStore::new();
        assert!(store.commit("1,1", &coins(&["1:1#0"])).is_ok());
        assert!(store.commit("1,1", &coins(&["1:1#1"])).is_ok());
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("1,1").ok().flatten(), Some(coins(&["1:1#1"])));
    }

    #[test]
    fn memento_schema_is_versioned() {
        let raw = CacheMemento::capture(&coins(&["0:0#1"])).encode().unwrap_or_default();
        assert_eq!(raw, r##"{"version":1,"coins":["0:0#1"]}"##);
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let memento = CacheMemento::decode("0,0", r#"{"version":1,"coins":[],"note":"x"}"#);
        assert!(memento.is_ok());
    }

    #[test]
    fn decode_rejects_newer_version() {
        let result = CacheMemento::decode("0,0", r#"{"version":2,"coins":[]}"#);
        assert!(matches!(
            result,
            Err(WorldError::UnsupportedMementoVersion { version: 2, .. })
        ));
    }

    #[test]
    fn from_pairs_rejects_corrupt_entry() {
        let pairs = vec![
            ("0,0".to_owned(), r#"{"version":1,"coins":["0:0#0"]}"#.to_owned()),
            ("0,1".to_owned(), "not json".to_owned()),
        ];
        let result = MementoStore::from_pairs(pairs);
        assert!(matches!(result, Err(WorldError::CorruptMemento { ref key, .. }) if key == "0,1"));
    }

    #[test]
    fn retain_reports_dropped_keys() {
        let mut store = MementoStore::new();
        for key in ["0,0", "0,1", "2,2"] {
            assert!(store.commit(key, &Cache::default()).is_ok());
        }
        let dropped = store.retain(|key| key != "0,1" && key != "2,2");
        assert_eq!(dropped, ["0,1", "2,2"]);
        assert!(store.contains("0,0"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn pairs_are_ordered_by_key() {
        let mut store = MementoStore::new();
        assert!(store.commit("5,5", &Cache::default()).is_ok());
        assert!(store.commit("-1,0", &Cache::default()).is_ok());
        assert!(store.commit("0,3", &Cache::default()).is_ok());
        let keys: Vec<String> = store.to_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["-1,0", "0,3", "5,5"]);

        let rebuilt = MementoStore::from_pairs(store.to_pairs());
        assert_eq!(rebuilt.ok(), Some(store));
    }
}
