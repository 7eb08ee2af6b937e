//! Structural facts extracted from one compiled artifact.

use crate::naming::INHERITED_TAG;
use serde::{Deserialize, Serialize};

/// What kind of member a [`MemberDescriptor`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
}

/// A declared field, method or constructor together with its tags.
///
/// Type names are source-level names (`int`, `java.lang.String[]`),
/// never raw descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub owner: String,
    pub name: String,
    pub kind: MemberKind,
    pub annotations: Vec<String>,
    /// Parameter type names, empty for fields
    pub parameter_types: Vec<String>,
    /// Return type name for methods (`void` included), field type for fields
    pub return_type: Option<String>,
    pub is_public: bool,
}

impl MemberDescriptor {
    pub fn field(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            kind: MemberKind::Field,
            annotations: Vec::new(),
            parameter_types: Vec::new(),
            return_type: None,
            is_public: true,
        }
    }

    pub fn method(
        owner: impl Into<String>,
        name: impl Into<String>,
        parameter_types: Vec<String>,
        return_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let kind = if name == "<init>" {
            MemberKind::Constructor
        } else {
            MemberKind::Method
        };
        Self {
            owner: owner.into(),
            name,
            kind,
            annotations: Vec::new(),
            parameter_types,
            return_type: Some(return_type.into()),
            is_public: true,
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }
}

/// Parsed facts for one artifact: its name, direct supertypes, tags and members.
///
/// Produced once per entry and shared read-only by every scanner that
/// accepts the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    pub super_name: Option<String>,
    /// Declared interfaces in declaration order, without duplicates
    pub interfaces: Vec<String>,
    /// Tags attached directly to the type
    pub annotations: Vec<String>,
    pub fields: Vec<MemberDescriptor>,
    pub methods: Vec<MemberDescriptor>,
    pub is_interface: bool,
    pub is_annotation: bool,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_super(mut self, super_name: impl Into<String>) -> Self {
        self.super_name = Some(super_name.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        let interface = interface.into();
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn with_field(mut self, field: MemberDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MemberDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn as_interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    pub fn as_annotation(mut self) -> Self {
        self.is_annotation = true;
        self.is_interface = true;
        self
    }

    /// Whether this artifact declares a tag that propagates to subtypes,
    /// read from the tag's own declaration.
    pub fn is_inherited_tag(&self) -> bool {
        self.is_annotation && self.annotations.iter().any(|a| a == INHERITED_TAG)
    }

    /// Fields followed by methods and constructors
    pub fn members(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.fields.iter().chain(self.methods.iter())
    }
}
