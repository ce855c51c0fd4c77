use std::io::{Read, Seek};

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub is_directory: bool,
}

/// Read access to the files packaged inside an e-book container.
pub trait Archive {
    fn entries(&self) -> Vec<ArchiveEntry>;

    /// Fails with [`Error::EntryNotReadable`] for directories, absent paths
    /// and entries that are not UTF-8 text.
    fn read_entry_as_text(&mut self, path: &str) -> Result<String, Error>;

    fn contains_file(&self, path: &str) -> bool {
        self.entries()
            .iter()
            .any(|e| !e.is_directory && e.path == path)
    }
}

pub struct ZipArchiveReader<R> {
    zip: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipArchiveReader<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        Ok(Self {
            zip: zip::ZipArchive::new(reader)?,
        })
    }
}

impl<R: Read + Seek> Archive for ZipArchiveReader<R> {
    fn entries(&self) -> Vec<ArchiveEntry> {
        self.zip
            .file_names()
            .map(|name| ArchiveEntry {
                path: name.to_string(),
                is_directory: name.ends_with('/'),
            })
            .collect()
    }

    fn contains_file(&self, path: &str) -> bool {
        !path.ends_with('/') && self.zip.index_for_name(path).is_some()
    }

    fn read_entry_as_text(&mut self, path: &str) -> Result<String, Error> {
        let mut file = self
            .zip
            .by_name(path)
            .map_err(|_| Error::EntryNotReadable(path.to_string()))?;
        if file.is_dir() {
            return Err(Error::EntryNotReadable(path.to_string()));
        }
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let text = String::from_utf8(bytes).map_err(|_| Error::EntryNotReadable(path.to_string()))?;
        // Some producers prefix UTF-8 documents with a byte order mark.
        Ok(match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        })
    }
}
