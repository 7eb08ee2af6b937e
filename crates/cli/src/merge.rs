use crate::Format;
use classdex_core::ClassIndex;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fold every index into one, in argument order.
pub fn merge_all(indices: &[PathBuf]) -> classdex_core::Result<ClassIndex> {
    let merged = ClassIndex::empty();
    for path in indices {
        info!("Merging {}", path.display());
        merged.merge(&crate::load_index(path)?);
    }
    Ok(merged)
}

pub fn run(output: &Path, indices: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let merged = merge_all(indices)?;
    let serializer = Format::of_path(output).serializer();
    merged.save_with(output, serializer.as_ref())?;

    println!(
        "Merged {} index(es): {} keys, {} values -> {}",
        indices.len(),
        merged.store().keys_count(),
        merged.store().values_count(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use classdex_core::store::names;
    use classdex_core::{BinarySerializer, JsonSerializer, Serializer, Store};

    #[test]
    fn test_merge_mixed_formats() {
        let dir = tempfile::tempdir().unwrap();

        let left = Store::new();
        left.put(names::SUB_TYPES, "A", "B");
        let left_path = dir.path().join("left.json");
        JsonSerializer::new().save(&left, &left_path).unwrap();

        let right = Store::new();
        right.put(names::SUB_TYPES, "B", "C");
        right.put(names::SUB_TYPES, "A", "B");
        let right_path = dir.path().join("right.bin");
        BinarySerializer.save(&right, &right_path).unwrap();

        let output = dir.path().join("out/all.json");
        run(&output, &[left_path, right_path]).unwrap();

        let merged = crate::load_index(&output).unwrap();
        assert_eq!(merged.store().values_count(), 2);
        assert_eq!(merged.subtypes_of("A").len(), 2);
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(merge_all(&[dir.path().join("absent.json")]).is_err());
    }
}
