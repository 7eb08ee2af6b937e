use super::{ResultFilter, ScanInput, Scanner};
use crate::store::{Partition, names};
use classdex_plugin::{BoxError, is_class_file};

/// Records non-class entries: simple file name -> relative path.
///
/// Needs no descriptor, so it also runs for entries no parser understands.
#[derive(Debug, Default)]
pub struct ResourcesScanner {
    result_filter: ResultFilter,
}

impl ResourcesScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_filter(mut self, result_filter: ResultFilter) -> Self {
        self.result_filter = result_filter;
        self
    }
}

impl Scanner for ResourcesScanner {
    fn name(&self) -> &str {
        names::RESOURCES
    }

    fn accepts_input(&self, relative_path: &str) -> bool {
        !is_class_file(relative_path)
    }

    fn requires_descriptor(&self) -> bool {
        false
    }

    fn scan(&self, input: &ScanInput<'_>, sink: &Partition) -> Result<(), BoxError> {
        let entry = input.entry;
        if self.result_filter.accepts(entry.name()) {
            sink.put(entry.name(), entry.relative_path());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::Entry;

    #[test]
    fn test_records_simple_name() {
        let scanner = ResourcesScanner::new();
        assert!(!scanner.accepts_input("com/acme/Foo.class"));
        assert!(scanner.accepts_input("META-INF/app.xml"));

        let entry = Entry::new("/opt/app.jar", "META-INF/app.xml");
        let sink = Partition::new();
        scanner.scan(&ScanInput::new(&entry, None), &sink).unwrap();
        assert!(sink.contains("app.xml", "META-INF/app.xml"));
    }
}
