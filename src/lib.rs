mod archive;
mod content;
mod epub;
mod error;
mod library;
mod model;
mod navigation;
mod package;
mod pacing;
mod playback;
mod xml;

pub use archive::{Archive, ArchiveEntry, ZipArchiveReader};
pub use content::{ExtractedText, clean_title, extract as extract_text};
pub use epub::{assemble, parse_archive};
pub use error::Error;
pub use library::{BookId, DirStore, KeyValueStore, Library, MemoryStore, ReadingProgress, StoredBook};
pub use model::{Chapter, EpubDocument, TableOfContentsEntry, count_words};
pub use package::{ManifestItem, Package, parse_package, parse_package_document, read_container};
pub use pacing::{
    PunctuationMultipliers, punctuation_multiplier, punctuation_multiplier_with, rewind_interval,
    word_interval,
};
pub use playback::{
    DEFAULT_WORDS_PER_MINUTE, PlaybackEngine, PlaybackObservers, PlaybackState, ReaderSettings,
};

use std::path::Path;

/// Parses an EPUB held in memory.
pub fn parse(bytes: &[u8]) -> Result<EpubDocument, Error> {
    epub::parse(bytes)
}

pub fn parse_file(path: &Path) -> Result<EpubDocument, Error> {
    epub::parse_file(path)
}
