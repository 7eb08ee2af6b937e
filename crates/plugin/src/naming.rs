/// The universal root type. Edges to it are never recorded.
pub const ROOT_TYPE: &str = "java.lang.Object";

/// Marker tag that makes a tag propagate from a type to its subtypes.
pub const INHERITED_TAG: &str = "java.lang.annotation.Inherited";

/// Key under which tagged interfaces are listed next to their tags.
/// Angle brackets never occur in a type name, so it cannot clash with a tag.
pub const INTERFACE_MARKER: &str = "<interface>";

const CLASS_SUFFIX: &str = ".class";

/// Whether an entry path names a compiled class.
pub fn is_class_file(path: &str) -> bool {
    path.ends_with(CLASS_SUFFIX)
}

/// `java.lang.String` -> `java/lang/String.class`
pub fn resource_name_of(type_name: &str) -> String {
    format!("{}{}", type_name.replace('.', "/"), CLASS_SUFFIX)
}

/// `java/lang/String.class` -> `java.lang.String`
///
/// Returns `None` for paths that are not class entries.
pub fn type_name_of(resource: &str) -> Option<String> {
    let stem = resource.strip_suffix(CLASS_SUFFIX)?;
    let stem = stem.trim_start_matches('/');
    if stem.is_empty() {
        return None;
    }
    Some(stem.replace(['/', '\\'], "."))
}
