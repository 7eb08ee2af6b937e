//! Contract between the scanning engine and artifact format readers.
//!
//! The engine never looks inside raw bytes itself. A reader implementing
//! [`ArtifactParser`] turns one entry into a [`ClassDescriptor`] and every
//! scanner works from that descriptor.

pub mod descriptor;
pub mod naming;
pub mod parser;

pub use descriptor::{ClassDescriptor, MemberDescriptor, MemberKind};
pub use naming::{INHERITED_TAG, INTERFACE_MARKER, ROOT_TYPE, is_class_file, resource_name_of, type_name_of};
pub use parser::{ArtifactParser, BoxError, ParseError};
