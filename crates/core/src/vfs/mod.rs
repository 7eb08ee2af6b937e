//! Uniform view over the containers artifacts live in.
//!
//! A [`Location`] is classified by an ordered list of [`UrlType`]s; the first
//! one that matches builds the [`Dir`]. Every container then exposes the same
//! lazy listing of [`Entry`] values and opens entry streams on demand.
//!
//! ```text
//! Location ──▶ UrlTypes (first match wins) ──▶ Box<dyn Dir> ──▶ Entry…
//!                jar file / jar url / directory      │
//!                                                    └─▶ open(entry) -> Read
//! ```

pub mod system_dir;
pub mod url_type;
pub mod zip_dir;

pub use system_dir::SystemDir;
pub use url_type::{DirectoryType, JarFileType, JarUrlType, JbossVfsType, UrlType, UrlTypes};
pub use zip_dir::ZipDir;

use crate::error::Result;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Opaque identifier of a container: an archive file, a directory, or a
/// url-like string addressing either.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical form used to compare locations, see [`normalize_path`].
    pub fn normalized(&self) -> String {
        normalize_path(&self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Path> for Location {
    fn from(value: &Path) -> Self {
        Self(value.to_string_lossy().into_owned())
    }
}

impl From<std::path::PathBuf> for Location {
    fn from(value: std::path::PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

impl From<&url::Url> for Location {
    /// `file:` urls become plain paths, anything else keeps its textual form.
    fn from(value: &url::Url) -> Self {
        match value.to_file_path() {
            Ok(path) if value.scheme() == "file" => Self::from(path),
            _ => Self(value.as_str().to_string()),
        }
    }
}

/// One entry inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    name: String,
    relative_path: String,
    full_path: String,
}

impl Entry {
    /// `relative_path` uses `/` separators and no leading separator.
    pub fn new(container: &str, relative_path: impl Into<String>) -> Self {
        let relative_path = relative_path.into().replace('\\', "/");
        let relative_path = relative_path.trim_start_matches('/').to_string();
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&relative_path)
            .to_string();
        let full_path = format!("{}/{}", container.trim_end_matches('/'), relative_path);
        Self {
            name,
            relative_path,
            full_path,
        }
    }

    /// Simple file name, e.g. `Foo.class`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the container root, e.g. `com/acme/Foo.class`
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Dotted form the input filters and scanners match against,
    /// e.g. `com.acme.Foo.class`
    pub fn input_name(&self) -> String {
        self.relative_path.replace('/', ".")
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path)
    }
}

/// A container of entries.
///
/// Lifecycle: created by a [`UrlType`], enumerated, then closed. Closing
/// releases file handles; dropping a `Dir` closes it as well.
pub trait Dir: Send {
    /// Normalized path of the container
    fn path(&self) -> &str;

    /// Lazy listing of file entries. Restartable: each call starts over.
    fn entries(&self) -> Box<dyn Iterator<Item = Entry> + '_>;

    /// Open a byte stream on one entry of this container.
    fn open(&self, entry: &Entry) -> std::io::Result<Box<dyn Read + '_>>;

    fn close(&mut self) {}
}

/// Read an entry fully, releasing the stream before returning.
pub fn read_entry(dir: &dyn Dir, entry: &Entry) -> std::io::Result<Vec<u8>> {
    let mut stream = dir.open(entry)?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Canonical form of a location string.
///
/// - `\` becomes `/` and runs of `/` collapse to one
/// - scheme prefixes (`file:`, `jar:file:`, …) are dropped, a single-letter
///   drive is kept lower-cased (`file:/C:/x` -> `c:/x`)
/// - everything from the last `!` on is dropped (`a.jar!/b` -> `a.jar`)
/// - trailing `/` are dropped
/// - `%xx` escapes are decoded
pub fn normalize_path(location: &str) -> String {
    let mut path = location.replace('\\', "/");
    while path.contains("//") {
        path = path.replace("//", "/");
    }

    if path.contains(':') {
        let segments: Vec<&str> = path.split(':').collect();
        if segments.len() > 1 {
            let maybe_drive = segments[segments.len() - 2].trim_start_matches('/');
            let last = segments[segments.len() - 1];
            path = if maybe_drive.len() == 1
                && maybe_drive.chars().all(|c| c.is_ascii_alphabetic())
            {
                format!("{}:{}", maybe_drive.to_ascii_lowercase(), last)
            } else {
                last.to_string()
            };
        }
    }

    if let Some(idx) = path.rfind('!') {
        path.truncate(idx);
    }

    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    percent_decode_str(&path).decode_utf8_lossy().into_owned()
}

/// Whether `entry` lies under `root`, compared on normalized forms.
pub fn is_under(entry: &str, root: &str) -> bool {
    let entry = normalize_path(entry);
    let root = normalize_path(root);
    entry == root
        || entry
            .strip_prefix(&root)
            .is_some_and(|rest| rest.starts_with('/') || root.ends_with('/'))
}

/// Visit every entry under `package_prefix` whose remaining file name
/// passes `name_filter`, across all `locations`.
///
/// Locations that cannot be opened are logged and skipped.
pub fn visit_files<F>(
    url_types: &UrlTypes,
    locations: &[Location],
    package_prefix: &str,
    name_filter: impl Fn(&str) -> bool,
    mut visit: F,
) -> Result<usize>
where
    F: FnMut(&dyn Dir, &Entry) -> Result<()>,
{
    let prefix = package_prefix.trim_matches('/');
    let mut visited = 0;

    for location in locations {
        let mut dir = match url_types.from_location(location) {
            Ok(dir) => dir,
            Err(e) => {
                warn!("skipping {}: {}", location, e);
                continue;
            }
        };

        let matching: Vec<Entry> = dir
            .entries()
            .filter(|entry| {
                let path = entry.relative_path();
                match path.strip_prefix(prefix) {
                    Some(rest) => {
                        let file_name = rest.trim_start_matches('/');
                        (prefix.is_empty() || rest.starts_with('/'))
                            && !file_name.is_empty()
                            && name_filter(file_name)
                    }
                    None => false,
                }
            })
            .collect();

        for entry in &matching {
            visit(dir.as_ref(), entry)?;
            visited += 1;
        }

        dir.close();
    }

    Ok(visited)
}

/// List entries under `package_prefix` whose remaining name passes `name_filter`.
pub fn find_files(
    url_types: &UrlTypes,
    locations: &[Location],
    package_prefix: &str,
    name_filter: impl Fn(&str) -> bool,
) -> Result<Vec<Entry>> {
    let mut found = Vec::new();
    visit_files(url_types, locations, package_prefix, name_filter, |_, entry| {
        found.push(entry.clone());
        Ok(())
    })?;
    Ok(found)
}
