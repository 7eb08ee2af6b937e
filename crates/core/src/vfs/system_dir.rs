use super::{Dir, Entry};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// A directory tree on the local file system, walked lazily. Symbolic links
/// are followed; subtrees that cannot be read are logged and skipped.
pub struct SystemDir {
    path: String,
    root: PathBuf,
}

impl SystemDir {
    pub fn open(path: &str) -> io::Result<Self> {
        let root = PathBuf::from(path);
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", path),
            ));
        }
        Ok(Self {
            path: path.to_string(),
            root,
        })
    }

    fn relative(&self, file: &Path) -> Option<String> {
        let rel = file.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

impl Dir for SystemDir {
    fn path(&self) -> &str {
        &self.path
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Entry> + '_> {
        Box::new(
            WalkDir::new(&self.root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| match e {
                    Ok(e) => Some(e),
                    Err(err) => {
                        let path = err.path().map(|p| p.display().to_string());
                        warn!(
                            "skipping {} under {}: {}",
                            path.as_deref().unwrap_or("<unknown>"),
                            self.path,
                            err
                        );
                        None
                    }
                })
                .filter(|e| e.file_type().is_file())
                .filter_map(move |e| self.relative(e.path()))
                .map(move |rel| Entry::new(&self.path, rel)),
        )
    }

    fn open(&self, entry: &Entry) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(self.root.join(entry.relative_path()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
