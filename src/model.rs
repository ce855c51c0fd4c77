use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Manifest id of the spine item this chapter was read from.
    pub id: String,
    pub title: String,
    pub content: String,
    pub order: usize,
    /// Global index of the chapter's first word.
    pub word_start_index: usize,
    pub word_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOfContentsEntry {
    pub title: String,
    pub href: String,
    pub order: usize,
    pub word_start_index: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpubDocument {
    pub title: String,
    pub author: String,
    pub chapters: Vec<Chapter>,
    pub table_of_contents: Vec<TableOfContentsEntry>,
    /// Whitespace-normalized text of every chapter, in reading order.
    pub all_text: String,
}

impl EpubDocument {
    pub fn total_words(&self) -> usize {
        self.chapters.iter().map(|c| c.word_count).sum()
    }

    /// The chapter containing the given global word index.
    pub fn chapter_at(&self, word_index: usize) -> Option<&Chapter> {
        self.chapters
            .iter()
            .rev()
            .find(|c| c.word_start_index <= word_index)
    }
}

/// Splits on runs of whitespace, dropping empty tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
