//! Ordered map type for MAML objects.
//!
//! This module provides [`MamlMap`], a wrapper around [`IndexMap`] that
//! maintains insertion order for object fields. Preserving order matters for
//! MAML because a decoded document should iterate its fields the way they
//! were written, and encoded output must be deterministic.
//!
//! ## Examples
//!
//! ```rust
//! use serde_maml::{MamlMap, Value};
//!
//! let mut map = MamlMap::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;

/// An ordered map of string keys to MAML values.
///
/// # Examples
///
/// ```rust
/// use serde_maml::{MamlMap, Value};
///
/// let mut map = MamlMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// // Iteration maintains insertion order
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MamlMap(IndexMap<String, crate::Value>);

impl MamlMap {
    /// Creates an empty `MamlMap`.
    #[must_use]
    pub fn new() -> Self {
        MamlMap(IndexMap::new())
    }

    /// Creates an empty `MamlMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        MamlMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned.
    pub fn insert(&mut self, key: String, value: crate::Value) -> Option<crate::Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&crate::Value> {
        self.0.get(key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key from the map, returning its value if present.
    ///
    /// Order of the remaining entries is preserved.
    pub fn remove(&mut self, key: &str) -> Option<crate::Value> {
        self.0.shift_remove(key)
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, crate::Value>> for MamlMap {
    fn from(map: HashMap<String, crate::Value>) -> Self {
        MamlMap(map.into_iter().collect())
    }
}

impl From<MamlMap> for HashMap<String, crate::Value> {
    fn from(map: MamlMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for MamlMap {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MamlMap {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, crate::Value)> for MamlMap {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        MamlMap(IndexMap::from_iter(iter))
    }
}
