//! The index: named partitions of a multi-valued map plus closure queries.
//!
//! Partitions are written concurrently by scanners during a scan and merged
//! from other stores afterwards. Reads happen once the scan has drained.

pub mod partition;
mod query;

pub use partition::Partition;

use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

/// Well-known partition names, one per built-in scanner.
pub mod names {
    pub const SUB_TYPES: &str = "SubTypes";
    pub const TYPE_ANNOTATIONS: &str = "TypeAnnotations";
    pub const METHOD_ANNOTATIONS: &str = "MethodAnnotations";
    pub const FIELD_ANNOTATIONS: &str = "FieldAnnotations";
    pub const TYPES: &str = "Types";
    pub const TYPE_ELEMENTS: &str = "TypeElements";
    pub const CONVERTERS: &str = "Converters";
    pub const RESOURCES: &str = "Resources";
}

/// Ordered, serializable copy of a store: partition -> key -> values.
pub type StoreSnapshot = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

#[derive(Debug, Default)]
pub struct Store {
    partitions: DashMap<String, Arc<Partition>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// The named partition, created empty when absent.
    pub fn partition(&self, name: &str) -> Arc<Partition> {
        if let Some(existing) = self.partitions.get(name) {
            return existing.value().clone();
        }
        self.partitions
            .entry(name.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// The named partition, if one was ever created.
    pub fn find_partition(&self, name: &str) -> Option<Arc<Partition>> {
        self.partitions.get(name).map(|p| p.value().clone())
    }

    pub fn partition_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.partitions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn put(&self, partition: &str, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.partition(partition).put(key, value)
    }

    /// Direct lookup; unknown partitions and keys yield the empty set.
    pub fn get(&self, partition: &str, key: &str) -> HashSet<String> {
        self.find_partition(partition)
            .map(|p| p.get(key))
            .unwrap_or_default()
    }

    /// Union of the values stored under each of `keys`.
    pub fn get_many<I, S>(&self, partition: &str, keys: I) -> HashSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(partition) = self.find_partition(partition) else {
            return HashSet::new();
        };
        keys.into_iter()
            .flat_map(|key| partition.get(key.as_ref()))
            .collect()
    }

    pub fn keys(&self, partition: &str) -> HashSet<String> {
        self.find_partition(partition)
            .map(|p| p.keys())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, partition: &str, key: &str) -> bool {
        self.find_partition(partition)
            .is_some_and(|p| p.contains_key(key))
    }

    /// Additive union of every partition of `other` into this store.
    ///
    /// Must not run while a scan is writing into either store.
    pub fn merge(&self, other: &Store) {
        if std::ptr::eq(self, other) {
            return;
        }
        let incoming: Vec<(String, Arc<Partition>)> = other
            .partitions
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        for (name, partition) in incoming {
            self.partition(&name).extend_from(&partition);
        }
    }

    /// Distinct keys summed over all partitions
    pub fn keys_count(&self) -> usize {
        self.partitions.iter().map(|e| e.value().keys_count()).sum()
    }

    /// `(key, value)` pairs summed over all partitions
    pub fn values_count(&self) -> usize {
        self.partitions.iter().map(|e| e.value().values_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values_count() == 0
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.partitions
            .iter()
            .map(|e| (e.key().clone(), e.value().snapshot()))
            .collect()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Store::new();
        for (name, entries) in snapshot {
            let partition = store.partition(&name);
            partition.extend(
                entries
                    .into_iter()
                    .map(|(key, values)| (key, values.into_iter().collect())),
            );
        }
        store
    }
}

impl From<StoreSnapshot> for Store {
    fn from(snapshot: StoreSnapshot) -> Self {
        Store::from_snapshot(snapshot)
    }
}
