use linked_hash_map::LinkedHashMap;
use std::{fmt::Display, hash::Hash, iter::IntoIterator};
use thiserror::Error;

/// An insertion-ordered map that refuses to overwrite. Keys are small
/// Copy identities (node ids); iteration order is insertion order, so
/// consumers that walk the map are deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIdMap<K, V>(LinkedHashMap<K, V>)
where
    K: Hash + Eq + Copy + Display;

impl<K, V> Default for UniqueIdMap<K, V>
where
    K: Hash + Eq + Copy + Display,
{
    fn default() -> Self {
        Self(LinkedHashMap::new())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("duplicate entry found for id: {0}")]
pub struct DuplicateEntryError(pub String);

impl<K, V> UniqueIdMap<K, V>
where
    K: Hash + Eq + Copy + Display,
{
    pub fn new() -> Self {
        Self(LinkedHashMap::new())
    }

    /// Insert a new association, failing without modifying the map if
    /// the id is already present.
    pub fn insert(&mut self, k: K, v: V) -> Result<(), DuplicateEntryError> {
        if self.0.contains_key(&k) {
            return Err(DuplicateEntryError(format!("{}", k)));
        }
        self.0.insert(k, v);
        Ok(())
    }

    pub fn insert_many(
        &mut self,
        other: impl Iterator<Item = (K, V)>,
    ) -> Result<(), DuplicateEntryError> {
        for (k, v) in other {
            self.insert(k, v)?;
        }
        Ok(())
    }

    pub fn get(&self, k: K) -> Option<&V> {
        self.0.get(&k)
    }

    pub fn contains_key(&self, k: K) -> bool {
        self.0.contains_key(&k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter()
    }
}

impl<K, V> IntoIterator for UniqueIdMap<K, V>
where
    K: Hash + Eq + Copy + Display,
{
    type Item = (K, V);
    type IntoIter = linked_hash_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
