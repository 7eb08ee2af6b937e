use super::{ResultFilter, ScanInput, Scanner};
use crate::member_key;
use crate::store::{Partition, names};
use classdex_plugin::{BoxError, MemberDescriptor};

fn record<'a>(
    members: impl Iterator<Item = &'a MemberDescriptor>,
    result_filter: &ResultFilter,
    sink: &Partition,
) {
    for member in members {
        for tag in &member.annotations {
            if result_filter.accepts(tag) {
                sink.put(tag.as_str(), member_key::key_of(member));
            }
        }
    }
}

/// Records tag -> field key for every tagged field.
#[derive(Debug, Default)]
pub struct FieldAnnotationsScanner {
    result_filter: ResultFilter,
}

impl FieldAnnotationsScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_filter(mut self, result_filter: ResultFilter) -> Self {
        self.result_filter = result_filter;
        self
    }
}

impl Scanner for FieldAnnotationsScanner {
    fn name(&self) -> &str {
        names::FIELD_ANNOTATIONS
    }

    fn scan(&self, input: &ScanInput<'_>, sink: &Partition) -> Result<(), BoxError> {
        let descriptor = input.descriptor()?;
        record(descriptor.fields.iter(), &self.result_filter, sink);
        Ok(())
    }
}

/// Records tag -> method key for every tagged method or constructor.
#[derive(Debug, Default)]
pub struct MethodAnnotationsScanner {
    result_filter: ResultFilter,
}

impl MethodAnnotationsScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_filter(mut self, result_filter: ResultFilter) -> Self {
        self.result_filter = result_filter;
        self
    }
}

impl Scanner for MethodAnnotationsScanner {
    fn name(&self) -> &str {
        names::METHOD_ANNOTATIONS
    }

    fn scan(&self, input: &ScanInput<'_>, sink: &Partition) -> Result<(), BoxError> {
        let descriptor = input.descriptor()?;
        record(descriptor.methods.iter(), &self.result_filter, sink);
        Ok(())
    }
}
