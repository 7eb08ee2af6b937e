//! Persisted index formats.
//!
//! A store is written as its ordered snapshot (partition -> key -> values)
//! wrapped with a format version, either as JSON or as zstd-compressed
//! MessagePack.

use crate::error::{ClassdexError, Result};
use crate::store::{Store, StoreSnapshot};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    partitions: StoreSnapshot,
}

impl PersistedIndex {
    fn of(store: &Store) -> Self {
        Self {
            version: FORMAT_VERSION,
            partitions: store.snapshot(),
        }
    }

    fn into_store(self) -> Result<Store> {
        if self.version != FORMAT_VERSION {
            return Err(ClassdexError::Serialization(format!(
                "unsupported index format version {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(Store::from_snapshot(self.partitions))
    }
}

/// Reads and writes a whole [`Store`].
pub trait Serializer: Send + Sync {
    fn name(&self) -> &str;

    /// Conventional file extension, without the dot
    fn file_extension(&self) -> &str;

    fn to_bytes(&self, store: &Store) -> Result<Vec<u8>>;

    fn from_bytes(&self, bytes: &[u8]) -> Result<Store>;

    /// Write `store` to `path`, creating parent directories as needed.
    fn save(&self, store: &Store, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = self.to_bytes(store)?;
        std::fs::write(path, &bytes)?;
        debug!("saved index to {} ({} bytes, {})", path.display(), bytes.len(), self.name());
        Ok(())
    }

    fn read(&self, reader: &mut dyn Read) -> Result<Store> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.from_bytes(&bytes)
    }
}

/// Human-readable JSON
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Serializer for JsonSerializer {
    fn name(&self) -> &str {
        "json"
    }

    fn file_extension(&self) -> &str {
        "json"
    }

    fn to_bytes(&self, store: &Store) -> Result<Vec<u8>> {
        let index = PersistedIndex::of(store);
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&index)?
        } else {
            serde_json::to_vec(&index)?
        };
        Ok(bytes)
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<Store> {
        let index: PersistedIndex = serde_json::from_slice(bytes)?;
        index.into_store()
    }
}

/// Compact MessagePack, zstd-compressed
#[derive(Debug, Clone, Default)]
pub struct BinarySerializer;

impl Serializer for BinarySerializer {
    fn name(&self) -> &str {
        "binary"
    }

    fn file_extension(&self) -> &str {
        "bin"
    }

    fn to_bytes(&self, store: &Store) -> Result<Vec<u8>> {
        let bytes = rmp_serde::to_vec(&PersistedIndex::of(store))
            .map_err(|e| ClassdexError::Serialization(format!("MSGPACK error: {}", e)))?;
        zstd::encode_all(&bytes[..], 0)
            .map_err(|e| ClassdexError::Serialization(format!("Zstd compression failed: {}", e)))
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<Store> {
        let decompressed = zstd::decode_all(bytes).map_err(|e| {
            ClassdexError::Serialization(format!("Zstd decompression failed: {}", e))
        })?;
        let index: PersistedIndex = rmp_serde::from_slice(&decompressed)
            .map_err(|e| ClassdexError::Serialization(format!("MSGPACK error: {}", e)))?;
        index.into_store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::names;
    use tempfile::tempdir;

    fn sample() -> Store {
        let store = Store::new();
        store.put(names::SUB_TYPES, "a.A", "a.B");
        store.put(names::SUB_TYPES, "a.A", "a.C");
        store.put(names::RESOURCES, "app.xml", "conf/app.xml");
        store
    }

    #[test]
    fn test_json_output_is_ordered() {
        let json = String::from_utf8(JsonSerializer::new().to_bytes(&sample()).unwrap()).unwrap();
        assert!(json.starts_with(r#"{"version":1,"partitions":{"Resources""#));
        assert!(json.contains(r#""a.A":["a.B","a.C"]"#));
    }

    #[test]
    fn test_binary_save_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/index.bin");
        let serializer = BinarySerializer;
        serializer.save(&sample(), &path).unwrap();

        let mut file = std::fs::File::open(&path).unwrap();
        let restored = serializer.read(&mut file).unwrap();
        assert_eq!(restored.snapshot(), sample().snapshot());
    }

    #[test]
    fn test_rejects_other_versions() {
        let err = JsonSerializer::new()
            .from_bytes(br#"{"version":99,"partitions":{}}"#)
            .unwrap_err();
        assert!(matches!(err, ClassdexError::Serialization(_)));
        assert!(JsonSerializer::new().from_bytes(b"not json").is_err());
    }
}
