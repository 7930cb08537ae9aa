/*!
 * Archive container handling for mind-map packages
 *
 * A package is a zip archive of named entries. The whole archive is held in
 * memory: it is read once on load and rewritten wholesale on save.
 */

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::codec::{FormatError, FormatResult};
use crate::error::{ResultExt, Result};

/// A named archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry path inside the archive
    pub name: String,
    /// Raw entry bytes
    pub data: Vec<u8>,
}

/// In-memory view of a package archive, entries kept in archive order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a package from disk
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| path.display())?;
        let package = Self::from_bytes(&bytes)?;
        debug!(
            "Read {} entries from {}",
            package.entries.len(),
            path.display()
        );
        Ok(package)
    }

    /// Parse a package from archive bytes
    pub fn from_bytes(bytes: &[u8]) -> FormatResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                data,
            });
        }

        Ok(Self { entries })
    }

    /// Entry names in archive order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Read an entry as UTF-8 text
    pub fn read_str(&self, name: &str) -> FormatResult<&str> {
        let data = self
            .get(name)
            .ok_or_else(|| FormatError::MissingEntry(name.to_string()))?;
        std::str::from_utf8(data).map_err(|_| FormatError::Encoding(name.to_string()))
    }

    /// Insert an entry, replacing any existing entry of the same name in place
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        let name = name.into();
        let data = data.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry { name, data }),
        }
    }

    /// Remove an entry if present
    pub fn remove(&mut self, name: &str) -> Option<Entry> {
        let index = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(index))
    }

    /// Serialize all entries into a zip archive
    pub fn to_bytes(&self) -> FormatResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.data)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Write the archive to `path`, replacing the file only once fully written
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).with_context(|| dir.display())?;
        tmp.write_all(&bytes).with_context(|| path.display())?;
        tmp.as_file().sync_all().with_context(|| path.display())?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| path.display())?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut package = Package::new();
        package.insert("a.txt", "one");
        package.insert("b.txt", "two");
        package.insert("a.txt", "three");

        assert_eq!(package.names().collect::<Vec<_>>(), vec!["a.txt", "b.txt"]);
        assert_eq!(package.read_str("a.txt").unwrap(), "three");
    }

    #[test]
    fn test_missing_entry() {
        let package = Package::new();
        assert!(matches!(
            package.read_str("content.json"),
            Err(FormatError::MissingEntry(name)) if name == "content.json"
        ));
    }

    #[test]
    fn test_write_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.xmind");

        let mut package = Package::new();
        package.insert("content.json", "[]");
        package.insert("Thumbnails/thumbnail.png", vec![0u8, 159, 146, 150]);
        package.write_atomic(&path).unwrap();

        let reopened = Package::open(&path).unwrap();
        assert_eq!(reopened, package);
    }

    #[test]
    fn test_garbage_is_format_error() {
        let result = Package::from_bytes(b"definitely not a zip");
        assert!(matches!(result, Err(FormatError::Archive(_))));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = Package::open(&dir.path().join("nope.xmind"));
        assert!(matches!(result, Err(crate::error::XmindError::Io(_))));
    }
}
