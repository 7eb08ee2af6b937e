//! Descriptor-to-source type name conversion.

use ristretto_classfile::{BaseType, FieldType};

pub struct JavaTypeConverter;

impl JavaTypeConverter {
    /// `[Ljava/lang/String;` style field types to `java.lang.String[]`
    pub fn type_name(ty: &FieldType) -> String {
        match ty {
            FieldType::Base(BaseType::Byte) => "byte".to_string(),
            FieldType::Base(BaseType::Char) => "char".to_string(),
            FieldType::Base(BaseType::Double) => "double".to_string(),
            FieldType::Base(BaseType::Float) => "float".to_string(),
            FieldType::Base(BaseType::Int) => "int".to_string(),
            FieldType::Base(BaseType::Long) => "long".to_string(),
            FieldType::Base(BaseType::Short) => "short".to_string(),
            FieldType::Base(BaseType::Boolean) => "boolean".to_string(),
            FieldType::Object(name) => name.replace('/', "."),
            FieldType::Array(component) => {
                let mut dimensions = 1usize;
                let mut current = component.as_ref();
                while let FieldType::Array(inner) = current {
                    dimensions += 1;
                    current = inner.as_ref();
                }
                let mut name = Self::type_name(current);
                for _ in 0..dimensions {
                    name.push_str("[]");
                }
                name
            }
        }
    }

    /// Splits a method descriptor into parameter type names and a return
    /// type name, `void` included.
    pub fn method_types(
        descriptor: &str,
    ) -> Result<(Vec<String>, String), ristretto_classfile::Error> {
        let (params, ret) = FieldType::parse_method_descriptor(descriptor)?;
        let return_type = match ret {
            None => "void".to_string(),
            Some(field_type) => Self::type_name(&field_type),
        };
        let parameters = params.iter().map(Self::type_name).collect();
        Ok((parameters, return_type))
    }

    /// `Lcom/acme/Tag;` -> `com.acme.Tag`
    ///
    /// Annotation type descriptors are always object types; anything else
    /// yields `None`.
    pub fn annotation_name(descriptor: &str) -> Option<String> {
        let inner = descriptor.strip_prefix('L')?.strip_suffix(';')?;
        if inner.is_empty() {
            return None;
        }
        Some(inner.replace('/', "."))
    }
}
