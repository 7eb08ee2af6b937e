//! Matchers and factories that turn a [`Location`] into a [`Dir`].

use super::{Dir, Location, SystemDir, ZipDir, normalize_path};
use crate::error::{ClassdexError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// File extensions treated as zip-format archives
pub const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip", "war", "ear", "sar", "har", "par"];

/// Matcher plus factory for one kind of container.
pub trait UrlType: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    fn matches(&self, location: &Location) -> bool;

    fn create_dir(&self, location: &Location) -> std::io::Result<Box<dyn Dir>>;
}

fn has_archive_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn nested_archive_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"(?i)\.(jar|zip|war|ear|sar|har|par)!").expect("static regex")
    })
}

/// A plain archive file, e.g. `/opt/lib/a.jar` or `file:/opt/lib/a.jar`
#[derive(Debug, Default)]
pub struct JarFileType;

impl UrlType for JarFileType {
    fn name(&self) -> &str {
        "jar-file"
    }

    fn matches(&self, location: &Location) -> bool {
        if location.as_str().contains('!') {
            return false;
        }
        let path = location.normalized();
        has_archive_extension(&path) && Path::new(&path).is_file()
    }

    fn create_dir(&self, location: &Location) -> std::io::Result<Box<dyn Dir>> {
        Ok(Box::new(ZipDir::open(&location.normalized())?))
    }
}

/// An address into an archive, e.g. `jar:file:/opt/lib/a.jar!/com/acme`.
/// The outer archive is opened.
#[derive(Debug, Default)]
pub struct JarUrlType;

impl UrlType for JarUrlType {
    fn name(&self) -> &str {
        "jar-url"
    }

    fn matches(&self, location: &Location) -> bool {
        nested_archive_marker().is_match(location.as_str())
    }

    fn create_dir(&self, location: &Location) -> std::io::Result<Box<dyn Dir>> {
        Ok(Box::new(ZipDir::open(&location.normalized())?))
    }
}

/// A directory on the local file system
#[derive(Debug, Default)]
pub struct DirectoryType;

impl UrlType for DirectoryType {
    fn name(&self) -> &str {
        "directory"
    }

    fn matches(&self, location: &Location) -> bool {
        Path::new(&location.normalized()).is_dir()
    }

    fn create_dir(&self, location: &Location) -> std::io::Result<Box<dyn Dir>> {
        Ok(Box::new(SystemDir::open(&location.normalized())?))
    }
}

/// JBoss virtual file system addresses (`vfszip:` and `vfsfile:`).
///
/// Not registered by default; add it with [`UrlTypes::prepend`].
#[derive(Debug, Default)]
pub struct JbossVfsType;

const VFSZIP: &str = "vfszip:";
const VFSFILE: &str = "vfsfile:";

impl JbossVfsType {
    /// Find the real archive inside a deployable path such as
    /// `/srv/app.ear/lib/x.jar/com/acme/`.
    pub fn real_archive(path: &str) -> Option<String> {
        static DEPLOYABLE: OnceLock<Regex> = OnceLock::new();
        let deployable = DEPLOYABLE
            .get_or_init(|| Regex::new(r"\.[ejprsh]ar/").expect("static regex"));

        deployable.find_iter(path).find_map(|m| {
            let candidate = &path[..m.end() - 1];
            Path::new(candidate).is_file().then(|| candidate.to_string())
        })
    }
}

impl UrlType for JbossVfsType {
    fn name(&self) -> &str {
        "jboss-vfs"
    }

    fn matches(&self, location: &Location) -> bool {
        let raw = location.as_str();
        raw.starts_with(VFSZIP) || raw.starts_with(VFSFILE)
    }

    fn create_dir(&self, location: &Location) -> std::io::Result<Box<dyn Dir>> {
        let raw = location.as_str();
        if let Some(rest) = raw.strip_prefix(VFSZIP) {
            let path = normalize_path(rest);
            let with_slash = format!("{}/", path);
            let archive = Self::real_archive(&with_slash).ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("unable to identify the real zip file in path '{}'", rest),
                )
            })?;
            return Ok(Box::new(ZipDir::open(&archive)?));
        }

        let path = normalize_path(&raw.replacen(VFSFILE, "file:", 1));
        if Path::new(&path).is_dir() {
            Ok(Box::new(SystemDir::open(&path)?))
        } else {
            Ok(Box::new(ZipDir::open(&path)?))
        }
    }
}

/// Ordered list of url types; the first match wins.
#[derive(Clone)]
pub struct UrlTypes {
    types: Vec<Arc<dyn UrlType>>,
}

impl UrlTypes {
    /// An empty list that matches nothing
    pub fn empty() -> Self {
        Self { types: Vec::new() }
    }

    /// Put a url type ahead of every registered one
    pub fn prepend(mut self, url_type: Arc<dyn UrlType>) -> Self {
        self.types.insert(0, url_type);
        self
    }

    /// Put a url type after every registered one
    pub fn push(mut self, url_type: Arc<dyn UrlType>) -> Self {
        self.types.push(url_type);
        self
    }

    /// Replace the whole list
    pub fn replace(types: impl IntoIterator<Item = Arc<dyn UrlType>>) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name()).collect()
    }

    /// The first url type matching `location`
    pub fn find(&self, location: &Location) -> Option<&Arc<dyn UrlType>> {
        self.types.iter().find(|t| t.matches(location))
    }

    /// Classify `location` and open it.
    pub fn from_location(&self, location: &Location) -> Result<Box<dyn Dir>> {
        let url_type =
            self.find(location)
                .ok_or_else(|| ClassdexError::NoMatchingContainerType {
                    location: location.to_string(),
                })?;

        debug!("opening {} as {}", location, url_type.name());
        url_type
            .create_dir(location)
            .map_err(|e| ClassdexError::UnreadableContainer {
                location: location.to_string(),
                url_type: url_type.name().to_string(),
                reason: e.to_string(),
            })
    }
}

impl Default for UrlTypes {
    /// Jar file, jar url, directory
    fn default() -> Self {
        Self {
            types: vec![
                Arc::new(JarFileType),
                Arc::new(JarUrlType),
                Arc::new(DirectoryType),
            ],
        }
    }
}
