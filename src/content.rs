use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const INVISIBLE_TAGS: &[&str] = &["script", "style"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static META_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="title"], meta[property="dc:title"]"#));
static HEADING_LIKE: LazyLock<Selector> = LazyLock::new(|| {
    selector("h1, h2, h3, [class*=title], [class*=chapter], [class*=heading]")
});
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static PARAGRAPH_LIKE: LazyLock<Selector> = LazyLock::new(|| selector("p, div"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s*").expect("valid pattern"));
static CHAPTER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^chapter\s+[0-9]+\s*").expect("valid pattern"));
static SECTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^section\s+[0-9]+\s*").expect("valid pattern"));

/// Title and visible text of one content document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedText {
    /// `None` when no heuristic produced a usable title.
    pub title: Option<String>,
    pub content: String,
}

/// Parses a content document the way a browser would, so HTML entities and
/// markup that is not well-formed XML still yield text.
pub fn extract(markup: &str) -> ExtractedText {
    let doc = Html::parse_document(markup);

    let title = infer_title(&doc).map(|t| clean_title(&t)).filter(|t| !t.is_empty());

    let body = doc.select(&BODY).next().unwrap_or_else(|| doc.root_element());
    let mut content = String::new();
    collect_visible_text(body, &mut content);

    ExtractedText {
        title,
        content: content.trim().to_string(),
    }
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn infer_title(doc: &Html) -> Option<String> {
    meta_title(doc)
        .or_else(|| heading_title(doc))
        .or_else(|| document_title(doc))
        .or_else(|| paragraph_title(doc))
}

fn meta_title(doc: &Html) -> Option<String> {
    doc.select(&META_TITLE)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn heading_title(doc: &Html) -> Option<String> {
    doc.select(&HEADING_LIKE)
        .map(text_of)
        .find(|text| (1..200).contains(&text.chars().count()))
}

fn document_title(doc: &Html) -> Option<String> {
    doc.select(&TITLE)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
}

/// A short paragraph without a sentence stop often is an unmarked heading.
fn paragraph_title(doc: &Html) -> Option<String> {
    doc.select(&PARAGRAPH_LIKE)
        .map(text_of)
        .find(|text| (4..100).contains(&text.chars().count()) && !text.contains('.'))
}

/// Drops a leading ordinal ("3. ") and a "Chapter N" / "Section N" label.
pub fn clean_title(title: &str) -> String {
    let title = LEADING_NUMBER.replace(title, "");
    let title = CHAPTER_LABEL.replace(&title, "");
    let title = SECTION_LABEL.replace(&title, "");
    title.trim().to_string()
}

fn collect_visible_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            match child.value().name() {
                name if INVISIBLE_TAGS.contains(&name) => {}
                // A line break separates words even though it holds no text.
                "br" => out.push('\n'),
                _ => collect_visible_text(child, out),
            }
        }
    }
}
