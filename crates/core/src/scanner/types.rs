use super::{ResultFilter, ScanInput, Scanner};
use crate::store::{Partition, names};
use classdex_plugin::{BoxError, is_class_file};

const PACKAGE_INFO: &str = "package-info.class";

/// Records every scanned type as `name -> name`.
#[derive(Debug, Default)]
pub struct TypesScanner {
    result_filter: ResultFilter,
}

impl TypesScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_filter(mut self, result_filter: ResultFilter) -> Self {
        self.result_filter = result_filter;
        self
    }
}

impl Scanner for TypesScanner {
    fn name(&self) -> &str {
        names::TYPES
    }

    fn accepts_input(&self, relative_path: &str) -> bool {
        is_class_file(relative_path) && !relative_path.ends_with(PACKAGE_INFO)
    }

    fn scan(&self, input: &ScanInput<'_>, sink: &Partition) -> Result<(), BoxError> {
        let descriptor = input.descriptor()?;
        if self.result_filter.accepts(&descriptor.name) {
            sink.put(descriptor.name.as_str(), descriptor.name.as_str());
        }
        Ok(())
    }
}
