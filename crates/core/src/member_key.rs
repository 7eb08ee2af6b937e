//! Stable string keys for fields and methods.
//!
//! - field: `com.acme.Foo.count`
//! - method: `com.acme.Foo.resize(int, java.lang.String[])`
//! - constructor: `com.acme.Foo.<init>(int)`
//!
//! Keys parse back into a [`MemberKey`] so a resolver can find the concrete
//! member again.

use classdex_plugin::{MemberDescriptor, MemberKind};
use std::fmt;

const CONSTRUCTOR: &str = "<init>";

pub fn field_key(owner: &str, name: &str) -> String {
    format!("{}.{}", owner, name)
}

pub fn method_key<S: AsRef<str>>(owner: &str, name: &str, parameter_types: &[S]) -> String {
    format!("{}.{}", owner, method_signature(name, parameter_types))
}

/// Method key without its owner, e.g. `resize(int, long)`
pub fn method_signature<S: AsRef<str>>(name: &str, parameter_types: &[S]) -> String {
    let params: Vec<&str> = parameter_types.iter().map(|p| p.as_ref()).collect();
    format!("{}({})", name, params.join(", "))
}

/// Key of any member descriptor
pub fn key_of(member: &MemberDescriptor) -> String {
    match member.kind {
        MemberKind::Field => field_key(&member.owner, &member.name),
        MemberKind::Method | MemberKind::Constructor => {
            method_key(&member.owner, &member.name, &member.parameter_types)
        }
    }
}

/// Key under which converters from `from` to `to` are recorded
pub fn converter_key(from: &str, to: &str) -> String {
    format!("{} to {}", from, to)
}

/// A parsed member key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberKey {
    pub owner: String,
    pub name: String,
    pub kind: MemberKind,
    pub parameter_types: Vec<String>,
}

impl MemberKey {
    /// Parse a field or method key; `None` when there is no owner.
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        let (head, params) = match key.find('(') {
            Some(open) => {
                let params = key[open + 1..].strip_suffix(')')?;
                (&key[..open], Some(params))
            }
            None => (key, None),
        };

        let dot = head.rfind('.')?;
        let (owner, name) = (&head[..dot], &head[dot + 1..]);
        if owner.is_empty() || name.is_empty() {
            return None;
        }

        let (kind, parameter_types) = match params {
            None => (MemberKind::Field, Vec::new()),
            Some(params) => {
                let kind = if name == CONSTRUCTOR {
                    MemberKind::Constructor
                } else {
                    MemberKind::Method
                };
                let types = params
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect();
                (kind, types)
            }
        };

        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            kind,
            parameter_types,
        })
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == MemberKind::Constructor
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MemberKind::Field => f.write_str(&field_key(&self.owner, &self.name)),
            _ => f.write_str(&method_key(&self.owner, &self.name, &self.parameter_types)),
        }
    }
}
