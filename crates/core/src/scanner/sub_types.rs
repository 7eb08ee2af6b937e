use super::{ResultFilter, ScanInput, Scanner};
use crate::store::{Partition, names};
use classdex_plugin::{BoxError, ROOT_TYPE};

/// Records direct supertype edges: supertype -> subtype.
///
/// Edges to the universal root type are never recorded.
#[derive(Debug, Default)]
pub struct SubTypesScanner {
    result_filter: ResultFilter,
}

impl SubTypesScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_filter(mut self, result_filter: ResultFilter) -> Self {
        self.result_filter = result_filter;
        self
    }
}

impl Scanner for SubTypesScanner {
    fn name(&self) -> &str {
        names::SUB_TYPES
    }

    fn scan(&self, input: &ScanInput<'_>, sink: &Partition) -> Result<(), BoxError> {
        let descriptor = input.descriptor()?;

        if let Some(super_name) = &descriptor.super_name {
            if super_name != ROOT_TYPE && self.result_filter.accepts(super_name) {
                sink.put(super_name.as_str(), descriptor.name.as_str());
            }
        }

        for interface in &descriptor.interfaces {
            if self.result_filter.accepts(interface) {
                sink.put(interface.as_str(), descriptor.name.as_str());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::test_support::run;
    use classdex_plugin::ClassDescriptor;

    #[test]
    fn test_records_super_and_interfaces() {
        let desc = ClassDescriptor::new("com.acme.Impl")
            .with_super("com.acme.Base")
            .with_interface("com.acme.Api")
            .with_interface("java.io.Serializable");

        let sink = run(&SubTypesScanner::new(), &desc);
        assert!(sink.contains("com.acme.Base", "com.acme.Impl"));
        assert!(sink.contains("com.acme.Api", "com.acme.Impl"));
        assert!(sink.contains("java.io.Serializable", "com.acme.Impl"));
    }

    #[test]
    fn test_skips_root_type() {
        let desc = ClassDescriptor::new("com.acme.Plain").with_super(ROOT_TYPE);
        let sink = run(&SubTypesScanner::new(), &desc);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_result_filter_applies_to_super_and_interfaces() {
        let scanner = SubTypesScanner::new()
            .with_result_filter(ResultFilter::new(|n: &str| n.starts_with("com.acme")));
        let desc = ClassDescriptor::new("com.acme.Impl")
            .with_super("org.lib.Base")
            .with_interface("com.acme.Api")
            .with_interface("java.io.Serializable");

        let sink = run(&scanner, &desc);
        assert_eq!(sink.keys_count(), 1);
        assert!(sink.contains("com.acme.Api", "com.acme.Impl"));
    }
}
