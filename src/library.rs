//! Saved books and reading progress on top of a key-value store.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::model::EpubDocument;

const BOOK_PREFIX: &str = "book:";
const PROGRESS_PREFIX: &str = "progress:";

/// String keys to string values. Implementations decide where values live.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), Error>;
    /// Deleting an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), Error>;
    fn keys(&self) -> Result<Vec<String>, Error>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), Error> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

/// Keys may contain characters that are not valid in file names.
const KEY_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ESCAPES).to_string()
}

fn decode_key(name: &str) -> Option<String> {
    percent_encoding::percent_decode_str(name)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), Error> {
        // Replace atomically.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), Error> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, Error> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_key) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for BookId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| Error::Store(format!("invalid book id {s:?}: {e}")))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBook {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub added_date: DateTime<Utc>,
    pub last_read_date: DateTime<Utc>,
    pub document: EpubDocument,
    pub total_words: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub book_id: BookId,
    pub current_word_index: usize,
    pub words_per_minute: u32,
    pub last_read_date: DateTime<Utc>,
    pub progress_percentage: f64,
}

impl ReadingProgress {
    pub fn new(book_id: BookId, current_word_index: usize, words_per_minute: u32, total_words: usize) -> Self {
        let progress_percentage = if total_words == 0 {
            0.0
        } else {
            (current_word_index as f64 / total_words as f64 * 100.0).min(100.0)
        };
        Self {
            book_id,
            current_word_index,
            words_per_minute,
            last_read_date: Utc::now(),
            progress_percentage,
        }
    }
}

pub struct Library<S> {
    store: S,
}

impl<S: KeyValueStore> Library<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn save_book(&mut self, document: &EpubDocument) -> Result<BookId, Error> {
        let now = Utc::now();
        let book = StoredBook {
            id: BookId::new(),
            title: document.title.clone(),
            author: document.author.clone(),
            added_date: now,
            last_read_date: now,
            document: document.clone(),
            total_words: document.total_words(),
        };
        self.put_book(&book)?;
        log::debug!("saved book {} ({})", book.id, book.title);
        Ok(book.id)
    }

    pub fn book(&self, id: BookId) -> Result<Option<StoredBook>, Error> {
        self.get_json(&book_key(id))
    }

    /// All saved books, most recently read first.
    pub fn books(&self) -> Result<Vec<StoredBook>, Error> {
        let mut books = Vec::new();
        for key in self.store.keys()? {
            if !key.starts_with(BOOK_PREFIX) {
                continue;
            }
            if let Some(book) = self.get_json::<StoredBook>(&key)? {
                books.push(book);
            }
        }
        books.sort_by(|a, b| b.last_read_date.cmp(&a.last_read_date));
        Ok(books)
    }

    /// The saved copy of a book with the same title and author, if any.
    pub fn find_book(&self, title: &str, author: &str) -> Result<Option<StoredBook>, Error> {
        Ok(self
            .books()?
            .into_iter()
            .find(|b| b.title == title && b.author == author))
    }

    pub fn delete_book(&mut self, id: BookId) -> Result<(), Error> {
        self.store.delete(&book_key(id))?;
        self.store.delete(&progress_key(id))
    }

    /// Stores progress and marks the book as just read.
    pub fn save_progress(&mut self, progress: &ReadingProgress) -> Result<(), Error> {
        self.put_json(&progress_key(progress.book_id), progress)?;
        if let Some(mut book) = self.book(progress.book_id)? {
            book.last_read_date = progress.last_read_date;
            self.put_book(&book)?;
        }
        Ok(())
    }

    pub fn progress(&self, id: BookId) -> Result<Option<ReadingProgress>, Error> {
        self.get_json(&progress_key(id))
    }

    fn put_book(&mut self, book: &StoredBook) -> Result<(), Error> {
        self.put_json(&book_key(book.id), book)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>, Error> {
        match self.store.get(key)? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), Error> {
        let json = serde_json::to_string(value)?;
        self.store.put(key, &json)
    }
}

fn book_key(id: BookId) -> String {
    format!("{BOOK_PREFIX}{id}")
}

fn progress_key(id: BookId) -> String {
    format!("{PROGRESS_PREFIX}{id}")
}
