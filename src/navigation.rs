//! Chapter labels from a book's own table of contents.
//!
//! Both the legacy NCX index and the EPUB 3 navigation document map content
//! files to human-written labels. These labels are usually better chapter
//! titles than anything inferred from the content markup, so the assembler
//! overlays them when they are available.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::error::Error;
use crate::xml;

/// Percent-decoded archive path (fragment stripped) -> label.
pub type TocLabels = HashMap<String, String>;

static NAV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("nav").expect("valid selector"));
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

fn insert_label(labels: &mut TocLabels, base: &str, href: &str, label: &str) {
    let label = label.trim();
    let href = xml::strip_fragment(href.trim());
    if label.is_empty() || href.is_empty() {
        return;
    }
    // The first entry for a file is its top-level heading; later entries
    // point at subsections inside it.
    labels
        .entry(xml::decode_path(&xml::resolve_href(base, href)))
        .or_insert_with(|| label.to_string());
}

/// Labels from the `navMap` of an NCX index, which is strict XML.
pub fn ncx_labels(ncx_path: &str, text: &str) -> Result<TocLabels, Error> {
    let doc = xml::parse(text)?;
    let base = xml::base_dir(ncx_path);

    let mut labels = TocLabels::new();
    for nav_point in xml::descendants(doc.root_element(), "navPoint") {
        let label = xml::descendant(nav_point, "text").map(xml::text_content);
        let src = xml::descendant(nav_point, "content").and_then(|n| xml::attr(n, "src"));
        if let (Some(label), Some(src)) = (label, src) {
            insert_label(&mut labels, base, src, &label);
        }
    }
    log::debug!("{ncx_path}: {} table of contents labels", labels.len());
    Ok(labels)
}

/// Labels from the links of the `toc` nav in an EPUB 3 navigation document,
/// or of its first nav when none is marked. The document is parsed as HTML.
pub fn nav_labels(nav_path: &str, text: &str) -> TocLabels {
    let doc = Html::parse_document(text);
    let base = xml::base_dir(nav_path);

    let toc_nav = doc
        .select(&NAV)
        .find(|nav| {
            nav.value()
                .attr("epub:type")
                .is_some_and(|t| t.split_whitespace().any(|t| t == "toc"))
        })
        .or_else(|| doc.select(&NAV).next());

    let mut labels = TocLabels::new();
    if let Some(toc_nav) = toc_nav {
        for link in toc_nav.select(&LINK) {
            if let Some(href) = link.value().attr("href") {
                insert_label(&mut labels, base, href, &link.text().collect::<String>());
            }
        }
    }
    log::debug!("{nav_path}: {} table of contents labels", labels.len());
    labels
}
