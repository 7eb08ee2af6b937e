use super::{ResultFilter, ScanInput, Scanner};
use crate::member_key;
use crate::store::{Partition, names};
use classdex_plugin::BoxError;

/// Records the elements a type declares: field names and method signatures.
///
/// The result filter applies to the owning type name.
#[derive(Debug)]
pub struct TypeElementsScanner {
    include_fields: bool,
    include_methods: bool,
    public_only: bool,
    result_filter: ResultFilter,
}

impl TypeElementsScanner {
    /// Fields and public methods
    pub fn new() -> Self {
        Self {
            include_fields: true,
            include_methods: true,
            public_only: true,
            result_filter: ResultFilter::default(),
        }
    }

    pub fn include_fields(mut self, include: bool) -> Self {
        self.include_fields = include;
        self
    }

    pub fn include_methods(mut self, include: bool) -> Self {
        self.include_methods = include;
        self
    }

    pub fn public_only(mut self, only: bool) -> Self {
        self.public_only = only;
        self
    }

    pub fn with_result_filter(mut self, result_filter: ResultFilter) -> Self {
        self.result_filter = result_filter;
        self
    }
}

impl Default for TypeElementsScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for TypeElementsScanner {
    fn name(&self) -> &str {
        names::TYPE_ELEMENTS
    }

    fn scan(&self, input: &ScanInput<'_>, sink: &Partition) -> Result<(), BoxError> {
        let descriptor = input.descriptor()?;
        let owner = descriptor.name.as_str();
        if !self.result_filter.accepts(owner) {
            return Ok(());
        }

        if self.include_fields {
            for field in &descriptor.fields {
                sink.put(owner, field.name.as_str());
            }
        }

        if self.include_methods {
            for method in descriptor
                .methods
                .iter()
                .filter(|m| !self.public_only || m.is_public)
            {
                sink.put(
                    owner,
                    member_key::method_signature(&method.name, &method.parameter_types),
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::test_support::run;
    use classdex_plugin::{ClassDescriptor, MemberDescriptor};

    fn widget() -> ClassDescriptor {
        ClassDescriptor::new("com.acme.Widget")
            .with_field(MemberDescriptor::field("com.acme.Widget", "size"))
            .with_method(MemberDescriptor::method(
                "com.acme.Widget",
                "resize",
                vec!["int".into()],
                "void",
            ))
            .with_method(
                MemberDescriptor::method("com.acme.Widget", "secret", vec![], "void")
                    .with_public(false),
            )
    }

    #[test]
    fn test_fields_and_public_methods() {
        let sink = run(&TypeElementsScanner::new(), &widget());
        let elements = sink.get("com.acme.Widget");
        assert_eq!(elements.len(), 2);
        assert!(elements.contains("size"));
        assert!(elements.contains("resize(int)"));
    }

    #[test]
    fn test_options() {
        let all_methods = TypeElementsScanner::new()
            .include_fields(false)
            .public_only(false);
        let elements = run(&all_methods, &widget()).get("com.acme.Widget");
        assert!(elements.contains("secret()"));
        assert!(!elements.contains("size"));

        let fields_only = TypeElementsScanner::new().include_methods(false);
        assert_eq!(run(&fields_only, &widget()).values_count(), 1);
    }
}
