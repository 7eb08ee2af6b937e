use super::{ResultFilter, ScanInput, Scanner};
use crate::member_key;
use crate::store::{Partition, names};
use classdex_plugin::BoxError;

const VOID: &str = "void";

/// Records methods taking exactly one argument and returning a value, keyed
/// by `"<from> to <to>"`.
///
/// A converter is kept when either its parameter or its return type passes
/// the result filter.
#[derive(Debug, Default)]
pub struct ConvertersScanner {
    result_filter: ResultFilter,
}

impl ConvertersScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_filter(mut self, result_filter: ResultFilter) -> Self {
        self.result_filter = result_filter;
        self
    }
}

impl Scanner for ConvertersScanner {
    fn name(&self) -> &str {
        names::CONVERTERS
    }

    fn scan(&self, input: &ScanInput<'_>, sink: &Partition) -> Result<(), BoxError> {
        let descriptor = input.descriptor()?;
        for method in &descriptor.methods {
            let [from] = method.parameter_types.as_slice() else {
                continue;
            };
            let Some(to) = method.return_type.as_deref() else {
                continue;
            };
            if to == VOID {
                continue;
            }
            if self.result_filter.accepts(from) || self.result_filter.accepts(to) {
                sink.put(
                    member_key::converter_key(from, to),
                    member_key::key_of(method),
                );
            }
        }
        Ok(())
    }
}
