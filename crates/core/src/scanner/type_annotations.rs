use super::{ResultFilter, ScanInput, Scanner};
use crate::store::{Partition, names};
use classdex_plugin::{BoxError, INHERITED_TAG, INTERFACE_MARKER};

/// Records tag -> tagged type for every tag attached to a type.
///
/// The propagation marker is always recorded, whatever the result filter
/// says, so the store can tell which tags propagate. Tagged interfaces are
/// also listed under [`INTERFACE_MARKER`], since propagating tags do not
/// flow from an interface to its implementors.
#[derive(Debug, Default)]
pub struct TypeAnnotationsScanner {
    result_filter: ResultFilter,
}

impl TypeAnnotationsScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_filter(mut self, result_filter: ResultFilter) -> Self {
        self.result_filter = result_filter;
        self
    }
}

impl Scanner for TypeAnnotationsScanner {
    fn name(&self) -> &str {
        names::TYPE_ANNOTATIONS
    }

    fn scan(&self, input: &ScanInput<'_>, sink: &Partition) -> Result<(), BoxError> {
        let descriptor = input.descriptor()?;
        if descriptor.is_inherited_tag() {
            sink.put(INHERITED_TAG, descriptor.name.as_str());
        }

        let mut tagged = false;
        for tag in &descriptor.annotations {
            if tag != INHERITED_TAG && self.result_filter.accepts(tag) {
                sink.put(tag.as_str(), descriptor.name.as_str());
                tagged = true;
            }
        }

        if tagged && descriptor.is_interface && !descriptor.is_annotation {
            sink.put(INTERFACE_MARKER, descriptor.name.as_str());
        }
        Ok(())
    }
}
