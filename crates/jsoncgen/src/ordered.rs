//! Insertion-ordered map used for map-typed defaults.

use std::fmt;

use indexmap::IndexMap;

/// A string-keyed map that iterates in insertion order.
///
/// Inserting an existing key replaces its value and keeps its position, so a
/// map literal with a repeated key renders where the key first appeared.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: IndexMap<String, V>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Append a pair, or overwrite the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V: fmt::Display> fmt::Display for OrderedMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (key, value)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut map = OrderedMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        map.insert("mid", 3);

        let keys: Vec<&str> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.to_string(), "{zeta: 1, alpha: 2, mid: 3}");
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut map: OrderedMap<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        map.insert("a", 10);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&10));
        assert_eq!(map.iter().next(), Some(("a", &10)));
    }

    #[test]
    fn empty_map() {
        let map: OrderedMap<String> = OrderedMap::default();
        assert!(map.is_empty());
        assert!(!map.contains_key("a"));
        assert_eq!(map.get("a"), None);
        assert_eq!(map.to_string(), "{}");
    }
}
