//! Compiled class file reader.

use crate::types::JavaTypeConverter;
use classdex_plugin::{ArtifactParser, ClassDescriptor, MemberDescriptor, ParseError};
use ristretto_classfile::attributes::Attribute;
use ristretto_classfile::{ClassAccessFlags, ClassFile, FieldAccessFlags, MethodAccessFlags};
use std::io::Cursor;

/// Reads `.class` bytes into a [`ClassDescriptor`].
///
/// Only runtime-visible annotations are reported; class-retention
/// annotations are not tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassFileParser;

impl ClassFileParser {
    pub fn new() -> Self {
        Self
    }
}

fn malformed(context: &str, e: impl std::fmt::Debug) -> ParseError {
    ParseError::Malformed(format!("{context}: {e:?}"))
}

fn class_name(class: &ClassFile, index: u16) -> Result<String, ParseError> {
    let name = class
        .constant_pool
        .try_get_class(index)
        .map_err(|e| malformed("Failed to resolve class reference", e))?;
    Ok(name.to_string().replace('/', "."))
}

fn utf8(class: &ClassFile, index: u16, context: &str) -> Result<String, ParseError> {
    class
        .constant_pool
        .try_get_utf8(index)
        .map(|s| s.to_string())
        .map_err(|e| malformed(context, e))
}

/// Tag names from the `RuntimeVisibleAnnotations` attributes in `attributes`
fn annotations(class: &ClassFile, attributes: &[Attribute]) -> Result<Vec<String>, ParseError> {
    let mut tags = Vec::new();
    for attribute in attributes {
        let Attribute::RuntimeVisibleAnnotations { annotations, .. } = attribute else {
            continue;
        };
        for annotation in annotations {
            let descriptor = utf8(class, annotation.type_index, "Failed to read annotation type")?;
            match JavaTypeConverter::annotation_name(&descriptor) {
                Some(name) => tags.push(name),
                None => tracing::trace!("Skipping annotation with type {}", descriptor),
            }
        }
    }
    Ok(tags)
}

impl ArtifactParser for ClassFileParser {
    fn name(&self) -> &str {
        "classfile"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ClassDescriptor, ParseError> {
        let class = ClassFile::from_bytes(&mut Cursor::new(bytes.to_vec()))
            .map_err(|e| malformed("Failed to parse class", e))?;

        let name = class_name(&class, class.this_class)?;
        let mut desc = ClassDescriptor::new(name.clone());

        if class.super_class != 0 {
            desc = desc.with_super(class_name(&class, class.super_class)?);
        }
        for &interface in &class.interfaces {
            desc = desc.with_interface(class_name(&class, interface)?);
        }
        desc.annotations = annotations(&class, &class.attributes)?;
        desc.is_interface = class.access_flags.contains(ClassAccessFlags::INTERFACE);
        desc.is_annotation = class.access_flags.contains(ClassAccessFlags::ANNOTATION);

        for field in &class.fields {
            let field_name = utf8(&class, field.name_index, "Failed to parse field name")?;
            let mut member = MemberDescriptor::field(name.as_str(), field_name)
                .with_public(field.access_flags.contains(FieldAccessFlags::PUBLIC));
            member.return_type = Some(JavaTypeConverter::type_name(&field.field_type));
            member.annotations = annotations(&class, &field.attributes)?;
            desc = desc.with_field(member);
        }

        for method in &class.methods {
            let method_name = utf8(&class, method.name_index, "Failed to parse method name")?;
            if method_name == "<clinit>" {
                continue;
            }
            let descriptor = utf8(
                &class,
                method.descriptor_index,
                "Failed to parse method descriptor",
            )?;
            let (parameters, return_type) = JavaTypeConverter::method_types(&descriptor)
                .map_err(|e| malformed("Failed to parse method signature", e))?;
            let mut member =
                MemberDescriptor::method(name.as_str(), method_name, parameters, return_type)
                    .with_public(method.access_flags.contains(MethodAccessFlags::PUBLIC));
            member.annotations = annotations(&class, &method.attributes)?;
            desc = desc.with_method(member);
        }

        Ok(desc)
    }
}
