use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Multi-valued map from key to a set of values, safe for concurrent writers.
///
/// Duplicate pairs collapse and values are never removed.
#[derive(Debug, Default)]
pub struct Partition {
    map: DashMap<String, HashSet<String>>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `(key, value)`. Returns `false` when the pair was already present.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.map.entry(key.into()).or_default().insert(value.into())
    }

    pub fn get(&self, key: &str) -> HashSet<String> {
        self.map
            .get(key)
            .map(|values| values.value().clone())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.map
            .get(key)
            .is_some_and(|values| values.contains(value))
    }

    pub fn keys(&self) -> HashSet<String> {
        self.map.iter().map(|e| e.key().clone()).collect()
    }

    pub fn keys_count(&self) -> usize {
        self.map.len()
    }

    /// Number of `(key, value)` pairs
    pub fn values_count(&self) -> usize {
        self.map.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Union every pair of `other` into this partition.
    pub fn extend_from(&self, other: &Partition) {
        if std::ptr::eq(self, other) {
            return;
        }
        // copy out first so no lock on `other` is held while writing here
        let pairs: Vec<(String, HashSet<String>)> = other
            .map
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        self.extend(pairs);
    }

    pub fn extend(&self, pairs: impl IntoIterator<Item = (String, HashSet<String>)>) {
        for (key, values) in pairs {
            self.map.entry(key).or_default().extend(values);
        }
    }

    /// Ordered copy of the content
    pub fn snapshot(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.map
            .iter()
            .map(|e| (e.key().clone(), e.value().iter().cloned().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_pairs_collapse() {
        let partition = Partition::new();
        assert!(partition.put("a.A", "a.B"));
        assert!(!partition.put("a.A", "a.B"));
        partition.put("a.A", "a.C");

        assert_eq!(partition.keys_count(), 1);
        assert_eq!(partition.values_count(), 2);
        assert!(partition.contains("a.A", "a.C"));
        assert!(partition.get("missing").is_empty());
    }

    #[test]
    fn test_concurrent_writers_on_one_key() {
        let partition = Partition::new();
        std::thread::scope(|s| {
            for t in 0..4 {
                let partition = &partition;
                s.spawn(move || {
                    for i in 0..100 {
                        partition.put("shared.Api", format!("impl.T{}x{}", t, i));
                    }
                });
            }
        });
        assert_eq!(partition.get("shared.Api").len(), 400);
    }

    #[test]
    fn test_extend_from_self_is_noop() {
        let partition = Partition::new();
        partition.put("k", "v");
        partition.extend_from(&partition);
        assert_eq!(partition.values_count(), 1);
    }
}
