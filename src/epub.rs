use std::io::Cursor;
use std::path::Path;

use crate::archive::{Archive, ZipArchiveReader};
use crate::content;
use crate::error::Error;
use crate::model::{Chapter, EpubDocument, TableOfContentsEntry, count_words};
use crate::navigation;
use crate::package::{self, Package};
use crate::xml;

/// A chapter together with the archive path it was read from.
struct SpineChapter {
    chapter: Chapter,
    path: String,
}

pub fn parse(bytes: &[u8]) -> Result<EpubDocument, Error> {
    let mut archive = ZipArchiveReader::new(Cursor::new(bytes))?;
    parse_archive(&mut archive)
}

pub fn parse_file(path: &Path) -> Result<EpubDocument, Error> {
    let file = std::fs::File::open(path)?;
    let mut archive = ZipArchiveReader::new(file)?;
    parse_archive(&mut archive)
}

pub fn parse_archive(archive: &mut impl Archive) -> Result<EpubDocument, Error> {
    let package = package::parse_package(archive)?;
    let mut chapters = read_chapters(archive, &package)?;

    if let Err(e) = enhance_titles(archive, &package, &mut chapters) {
        log::warn!("could not read table of contents, keeping extracted titles: {e}");
    }

    let chapters: Vec<Chapter> = chapters.into_iter().map(|c| c.chapter).collect();
    Ok(assemble(package.title, package.author, chapters))
}

/// Builds the document from chapters whose titles and contents are final.
pub fn assemble(title: String, author: String, mut chapters: Vec<Chapter>) -> EpubDocument {
    calculate_word_positions(&mut chapters);
    let table_of_contents = generate_table_of_contents(&chapters);
    let all_text = combine_all_text(&chapters);
    EpubDocument {
        title,
        author,
        chapters,
        table_of_contents,
        all_text,
    }
}

/// Finds the archive entry for a resolved href. Some producers
/// percent-encode hrefs whose archive names are stored raw.
fn locate_entry(archive: &impl Archive, path: &str) -> Option<String> {
    if archive.contains_file(path) {
        return Some(path.to_string());
    }
    let decoded = percent_encoding::percent_decode_str(path).decode_utf8().ok()?;
    archive.contains_file(&decoded).then(|| decoded.into_owned())
}

fn read_chapters(archive: &mut impl Archive, package: &Package) -> Result<Vec<SpineChapter>, Error> {
    let mut chapters = Vec::new();

    for id in &package.spine {
        let Some(item) = package.manifest.get(id) else {
            log::debug!("spine item {id} is not in the manifest, skipping");
            continue;
        };
        if !item.is_markup() {
            log::debug!("spine item {id} has media type {}, skipping", item.media_type);
            continue;
        }
        let Some(path) = locate_entry(&*archive, &package.resolve(&item.href)) else {
            log::debug!("spine item {id} has no archive entry for {}, skipping", item.href);
            continue;
        };

        let markup = archive.read_entry_as_text(&path)?;
        let extracted = content::extract(&markup);

        let order = chapters.len();
        let word_count = count_words(&extracted.content);
        chapters.push(SpineChapter {
            chapter: Chapter {
                id: id.clone(),
                title: extracted.title.unwrap_or_else(|| format!("Chapter {}", order + 1)),
                content: extracted.content,
                order,
                word_start_index: 0,
                word_count,
            },
            path,
        });
    }

    log::debug!("read {} chapters from {} spine items", chapters.len(), package.spine.len());
    Ok(chapters)
}

/// Overlays labels from the book's own table of contents onto chapter titles.
/// Word counts are left untouched: titles are not part of the chapter text.
fn enhance_titles(
    archive: &mut impl Archive,
    package: &Package,
    chapters: &mut [SpineChapter],
) -> Result<(), Error> {
    let Some(declared) = package.toc_path() else {
        return Ok(());
    };
    let Some(toc_path) = locate_entry(&*archive, declared) else {
        log::debug!("table of contents {declared} is not in the archive");
        return Ok(());
    };
    let text = archive.read_entry_as_text(&toc_path)?;
    let labels = if package.ncx_path.as_deref() == Some(declared) {
        navigation::ncx_labels(&toc_path, &text)?
    } else {
        navigation::nav_labels(&toc_path, &text)
    };

    for spine_chapter in chapters.iter_mut() {
        if let Some(label) = labels.get(&xml::decode_path(&spine_chapter.path)) {
            spine_chapter.chapter.title = label.clone();
        }
    }
    Ok(())
}

fn calculate_word_positions(chapters: &mut [Chapter]) {
    let mut word_index = 0;
    for chapter in chapters {
        chapter.word_start_index = word_index;
        word_index += chapter.word_count;
    }
}

fn generate_table_of_contents(chapters: &[Chapter]) -> Vec<TableOfContentsEntry> {
    chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| TableOfContentsEntry {
            title: chapter.title.clone(),
            href: format!("#chapter-{}", chapter.id),
            order: index,
            word_start_index: chapter.word_start_index,
        })
        .collect()
}

fn combine_all_text(chapters: &[Chapter]) -> String {
    let joined = chapters
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
