use super::{Dir, Entry};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Cursor, Read};
use zip::ZipArchive;

/// Upper bound on the buffer reserved up front for an entry. The size in
/// the archive header is only a hint and may be forged.
const MAX_PREALLOCATION: usize = 1 << 20;

/// A zip-format archive (jar, war, ear, …) opened from the local file system.
///
/// Entry names are captured when the archive is opened so listing is
/// restartable without touching the archive again.
pub struct ZipDir {
    path: String,
    names: Vec<String>,
    archive: RefCell<Option<ZipArchive<File>>>,
}

impl ZipDir {
    pub fn open(path: &str) -> io::Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file).map_err(io::Error::other)?;

        let names = (0..archive.len())
            .filter_map(|i| archive.name_for_index(i))
            .filter(|name| !name.ends_with('/'))
            .map(|name| name.to_string())
            .collect();

        Ok(Self {
            path: path.to_string(),
            names,
            archive: RefCell::new(Some(archive)),
        })
    }
}

impl Dir for ZipDir {
    fn path(&self) -> &str {
        &self.path
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Entry> + '_> {
        Box::new(
            self.names
                .iter()
                .map(move |name| Entry::new(&self.path, name.as_str())),
        )
    }

    fn open(&self, entry: &Entry) -> io::Result<Box<dyn Read + '_>> {
        let mut guard = self.archive.borrow_mut();
        let archive = guard.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, format!("{} is closed", self.path))
        })?;

        let mut file = archive
            .by_name(entry.relative_path())
            .map_err(io::Error::other)?;
        let hint = usize::try_from(file.size()).unwrap_or(MAX_PREALLOCATION);
        let mut bytes = Vec::with_capacity(hint.min(MAX_PREALLOCATION));
        file.read_to_end(&mut bytes)?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn close(&mut self) {
        self.archive.get_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::read_entry;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_archive(path: &std::path::Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        zip.add_directory("com/acme/", options).unwrap();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_lists_files_and_skips_directories() {
        let dir = tempdir().unwrap();
        let jar = dir.path().join("a.jar");
        write_archive(
            &jar,
            &[("com/acme/Foo.class", b"foo"), ("META-INF/MANIFEST.MF", b"m")],
        );

        let zip_dir = ZipDir::open(jar.to_str().unwrap()).unwrap();
        let paths: Vec<String> = zip_dir
            .entries()
            .map(|e| e.relative_path().to_string())
            .collect();
        assert_eq!(paths, vec!["com/acme/Foo.class", "META-INF/MANIFEST.MF"]);

        // restartable
        assert_eq!(zip_dir.entries().count(), 2);
    }

    #[test]
    fn test_open_reads_entry_bytes() {
        let dir = tempdir().unwrap();
        let jar = dir.path().join("a.jar");
        write_archive(&jar, &[("com/acme/Foo.class", b"class bytes")]);

        let zip_dir = ZipDir::open(jar.to_str().unwrap()).unwrap();
        let entry = zip_dir.entries().next().unwrap();
        assert_eq!(entry.name(), "Foo.class");
        assert_eq!(read_entry(&zip_dir, &entry).unwrap(), b"class bytes");
    }

    #[test]
    fn test_open_after_close_fails() {
        let dir = tempdir().unwrap();
        let jar = dir.path().join("a.jar");
        write_archive(&jar, &[("x.txt", b"x")]);

        let mut zip_dir = ZipDir::open(jar.to_str().unwrap()).unwrap();
        let entry = zip_dir.entries().next().unwrap();
        zip_dir.close();
        assert!(zip_dir.open(&entry).is_err());
    }

    #[test]
    fn test_rejects_non_archive() {
        let dir = tempdir().unwrap();
        let fake = dir.path().join("fake.jar");
        std::fs::write(&fake, b"plain text").unwrap();
        assert!(ZipDir::open(fake.to_str().unwrap()).is_err());
    }
}
