//! One-stop entry point: scan on construction, then query, save and merge.

use crate::collect;
use crate::config::Configuration;
use crate::error::Result;
use crate::pipeline::{self, ScanReport};
use crate::serialize::{JsonSerializer, Serializer};
use crate::store::Store;
use crate::vfs::{Location, UrlTypes};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// A scanned index together with the report of how it was built.
///
/// ```no_run
/// use classdex_core::{ClassIndex, ConfigurationBuilder};
/// # fn parser() -> std::sync::Arc<dyn classdex_plugin::ArtifactParser> { unimplemented!() }
///
/// let config = ConfigurationBuilder::new(parser())
///     .add_location("/opt/app/lib/app.jar")
///     .use_parallel_executor()
///     .build()?;
/// let index = ClassIndex::new(config);
/// let services = index.subtypes_of("com.acme.Service");
/// # Ok::<(), classdex_core::ClassdexError>(())
/// ```
pub struct ClassIndex {
    store: Store,
    report: ScanReport,
    serializer: Arc<dyn Serializer>,
}

impl ClassIndex {
    /// Scans right away when any scanner is configured.
    pub fn new(config: Configuration) -> Self {
        let store = Store::new();
        let report = if config.scanners.is_empty() {
            ScanReport::default()
        } else {
            pipeline::scan(&config, &store)
        };
        Self {
            store,
            report,
            serializer: config.serializer,
        }
    }

    pub fn empty() -> Self {
        Self::from_store(Store::new())
    }

    pub fn from_store(store: Store) -> Self {
        Self {
            store,
            report: ScanReport::default(),
            serializer: Arc::new(JsonSerializer::new()),
        }
    }

    /// Merge saved indices found in `locations`, see [`collect::collect`].
    pub fn collect(
        locations: &[Location],
        prefix: &str,
        name_pattern: &str,
        serializer: Arc<dyn Serializer>,
    ) -> Result<Self> {
        let store = collect::collect(
            &UrlTypes::default(),
            locations,
            prefix,
            name_pattern,
            serializer.as_ref(),
        )?;
        Ok(Self {
            store,
            report: ScanReport::default(),
            serializer,
        })
    }

    /// Merge saved indices under the default prefix and file name pattern
    pub fn collect_default(locations: &[Location]) -> Result<Self> {
        Self::collect(
            locations,
            collect::DEFAULT_COLLECT_PREFIX,
            collect::DEFAULT_COLLECT_PATTERN,
            Arc::new(JsonSerializer::new()),
        )
    }

    pub fn collect_file(path: &Path, serializer: Arc<dyn Serializer>) -> Result<Self> {
        let store = collect::collect_file(path, serializer.as_ref())?;
        Ok(Self {
            store,
            report: ScanReport::default(),
            serializer,
        })
    }

    /// Merge the content of `other` into this index.
    pub fn merge(&self, other: &ClassIndex) -> &Self {
        self.store.merge(&other.store);
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn report(&self) -> &ScanReport {
        &self.report
    }

    /// Save with the configured serializer
    pub fn save(&self, path: &Path) -> Result<()> {
        self.serializer.save(&self.store, path)
    }

    pub fn save_with(&self, path: &Path, serializer: &dyn Serializer) -> Result<()> {
        serializer.save(&self.store, path)
    }

    pub fn subtypes_of(&self, type_name: &str) -> HashSet<String> {
        self.store.subtypes_of(type_name)
    }

    pub fn types_tagged_with(&self, tag: &str) -> HashSet<String> {
        self.store.types_tagged_with(tag)
    }

    pub fn types_tagged_with_honoring(&self, tag: &str, honor_inherited: bool) -> HashSet<String> {
        self.store.types_tagged_with_honoring(tag, honor_inherited)
    }

    pub fn methods_tagged_with(&self, tag: &str) -> HashSet<String> {
        self.store.methods_tagged_with(tag)
    }

    pub fn fields_tagged_with(&self, tag: &str) -> HashSet<String> {
        self.store.fields_tagged_with(tag)
    }

    pub fn converters(&self, from: &str, to: &str) -> HashSet<String> {
        self.store.converters(from, to)
    }

    pub fn resources(&self, name: &str) -> HashSet<String> {
        self.store.resources(name)
    }

    pub fn resources_matching(&self, pattern: &str) -> Result<HashSet<String>> {
        self.store.resources_matching(pattern)
    }

    pub fn types(&self) -> HashSet<String> {
        self.store.types()
    }
}

impl Default for ClassIndex {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::names;

    #[test]
    fn test_merge_two_indices() {
        let a = ClassIndex::empty();
        a.store().put(names::SUB_TYPES, "a.A", "a.B");
        let b = ClassIndex::empty();
        b.store().put(names::SUB_TYPES, "a.B", "a.C");

        a.merge(&b).merge(&b);
        assert_eq!(a.subtypes_of("a.A").len(), 2);
        assert_eq!(a.store().values_count(), 2);
    }

    #[test]
    fn test_collect_default_location() {
        let dir = tempfile::tempdir().unwrap();
        let saved = ClassIndex::empty();
        saved.store().put(names::SUB_TYPES, "a.A", "a.B");
        saved
            .save(&dir.path().join("META-INF/classdex/app-classdex.json"))
            .unwrap();
        ClassIndex::empty()
            .save(&dir.path().join("META-INF/classdex/app.bin"))
            .unwrap();

        let index = ClassIndex::collect_default(&[Location::from(dir.path())]).unwrap();
        assert_eq!(index.subtypes_of("a.A"), HashSet::from(["a.B".to_string()]));
    }

    #[test]
    fn test_save_and_collect_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/index.json");
        let index = ClassIndex::empty();
        index.store().put(names::RESOURCES, "a.xml", "conf/a.xml");
        index.save(&path).unwrap();

        let loaded = ClassIndex::collect_file(&path, Arc::new(JsonSerializer::new())).unwrap();
        assert_eq!(loaded.resources("a.xml").len(), 1);
        assert!(loaded.report().is_clean());
    }
}
