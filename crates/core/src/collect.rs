//! Merging previously saved indices found inside containers.

use crate::error::Result;
use crate::serialize::Serializer;
use crate::store::Store;
use crate::vfs::{self, Location, UrlTypes};
use regex::Regex;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Directory saved indices are looked up under
pub const DEFAULT_COLLECT_PREFIX: &str = "META-INF/classdex";

/// File name pattern of saved indices
pub const DEFAULT_COLLECT_PATTERN: &str = r".*-classdex\.json";

/// Find every saved index under `prefix` whose name fully matches
/// `name_pattern` and merge them into one store.
///
/// Files that fail to read or deserialize are logged and skipped.
pub fn collect(
    url_types: &UrlTypes,
    locations: &[Location],
    prefix: &str,
    name_pattern: &str,
    serializer: &dyn Serializer,
) -> Result<Store> {
    let pattern = Regex::new(&format!("^(?:{})$", name_pattern))?;
    let store = Store::new();
    let mut merged = 0;

    vfs::visit_files(
        url_types,
        locations,
        prefix,
        |name| pattern.is_match(name),
        |dir, entry| {
            let loaded = vfs::read_entry(dir, entry)
                .map_err(Into::into)
                .and_then(|bytes| serializer.from_bytes(&bytes));
            match loaded {
                Ok(saved) => {
                    store.merge(&saved);
                    merged += 1;
                }
                Err(e) => warn!("could not merge {}: {}", entry, e),
            }
            Ok(())
        },
    )?;

    info!(
        "collected {} saved indices: {} keys, {} values",
        merged,
        store.keys_count(),
        store.values_count()
    );
    Ok(store)
}

/// Read one saved index file
pub fn collect_file(path: &Path, serializer: &dyn Serializer) -> Result<Store> {
    let mut file = std::fs::File::open(path)?;
    collect_reader(&mut file, serializer)
}

/// Read one saved index from a stream
pub fn collect_reader(reader: &mut dyn Read, serializer: &dyn Serializer) -> Result<Store> {
    serializer.read(reader)
}
