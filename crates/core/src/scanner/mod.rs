//! Scanners turn parsed descriptors into index pairs.
//!
//! Each scanner owns one named partition of the [`Store`](crate::store::Store).
//! The pipeline parses an entry once and hands the shared descriptor to every
//! scanner whose [`Scanner::accepts_input`] accepts the entry path.

mod converters;
mod member_annotations;
mod resources;
mod sub_types;
mod type_annotations;
mod type_elements;
mod types;

pub use converters::ConvertersScanner;
pub use member_annotations::{FieldAnnotationsScanner, MethodAnnotationsScanner};
pub use resources::ResourcesScanner;
pub use sub_types::SubTypesScanner;
pub use type_annotations::TypeAnnotationsScanner;
pub use type_elements::TypeElementsScanner;
pub use types::TypesScanner;

use crate::filter::Filter;
use crate::store::{Partition, names};
use crate::vfs::Entry;
use classdex_plugin::{BoxError, ClassDescriptor, is_class_file};
use std::sync::Arc;

/// What a scanner sees for one entry.
pub struct ScanInput<'a> {
    pub entry: &'a Entry,
    /// Absent for scanners that do not require one
    pub descriptor: Option<&'a ClassDescriptor>,
}

impl<'a> ScanInput<'a> {
    pub fn new(entry: &'a Entry, descriptor: Option<&'a ClassDescriptor>) -> Self {
        Self { entry, descriptor }
    }

    /// The parsed descriptor, or an error naming the entry.
    pub fn descriptor(&self) -> Result<&'a ClassDescriptor, BoxError> {
        self.descriptor
            .ok_or_else(|| format!("no descriptor available for {}", self.entry).into())
    }
}

/// A visitor writing `(key, value)` pairs into its own partition.
pub trait Scanner: Send + Sync {
    /// Name of the partition this scanner writes into
    fn name(&self) -> &str;

    /// Cheap check on the entry's relative path, made before parsing.
    fn accepts_input(&self, relative_path: &str) -> bool {
        is_class_file(relative_path)
    }

    /// Whether [`Scanner::scan`] needs a parsed descriptor
    fn requires_descriptor(&self) -> bool {
        true
    }

    fn scan(&self, input: &ScanInput<'_>, sink: &Partition) -> Result<(), BoxError>;
}

/// Optional predicate narrowing which values a scanner records.
#[derive(Clone, Default)]
pub struct ResultFilter(Option<Arc<dyn Filter>>);

impl ResultFilter {
    pub fn new(filter: impl Filter + 'static) -> Self {
        Self(Some(Arc::new(filter)))
    }

    /// Everything passes when no predicate is set.
    pub fn accepts(&self, name: &str) -> bool {
        self.0.as_ref().is_none_or(|f| f.accepts(name))
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl std::fmt::Debug for ResultFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.is_set() { "ResultFilter(set)" } else { "ResultFilter(none)" })
    }
}

/// Type-annotation and subtype scanners
pub fn default_scanners() -> Vec<Arc<dyn Scanner>> {
    vec![
        Arc::new(TypeAnnotationsScanner::new()),
        Arc::new(SubTypesScanner::new()),
    ]
}

/// Built-in scanner writing into the partition `name`, if any.
pub fn scanner_by_name(name: &str, result_filter: ResultFilter) -> Option<Arc<dyn Scanner>> {
    let scanner: Arc<dyn Scanner> = match name {
        names::SUB_TYPES => Arc::new(SubTypesScanner::new().with_result_filter(result_filter)),
        names::TYPE_ANNOTATIONS => {
            Arc::new(TypeAnnotationsScanner::new().with_result_filter(result_filter))
        }
        names::METHOD_ANNOTATIONS => {
            Arc::new(MethodAnnotationsScanner::new().with_result_filter(result_filter))
        }
        names::FIELD_ANNOTATIONS => {
            Arc::new(FieldAnnotationsScanner::new().with_result_filter(result_filter))
        }
        names::TYPES => Arc::new(TypesScanner::new().with_result_filter(result_filter)),
        names::TYPE_ELEMENTS => {
            Arc::new(TypeElementsScanner::new().with_result_filter(result_filter))
        }
        names::CONVERTERS => Arc::new(ConvertersScanner::new().with_result_filter(result_filter)),
        names::RESOURCES => Arc::new(ResourcesScanner::new().with_result_filter(result_filter)),
        _ => return None,
    };
    Some(scanner)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn run(scanner: &dyn Scanner, descriptor: &ClassDescriptor) -> Partition {
        let entry = Entry::new("/test", classdex_plugin::resource_name_of(&descriptor.name));
        let sink = Partition::new();
        scanner
            .scan(&ScanInput::new(&entry, Some(descriptor)), &sink)
            .unwrap();
        sink
    }
}
