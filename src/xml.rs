pub(crate) type Node<'a> = roxmltree::Node<'a, 'a>;

/// Parses an XML package or index document. DOCTYPE declarations are
/// common in EPUB 2 files and must not be rejected.
pub(crate) fn parse(text: &str) -> Result<roxmltree::Document<'_>, roxmltree::Error> {
    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;
    roxmltree::Document::parse_with_options(text, options)
}

pub(crate) fn descendant<'a>(node: Node<'a>, name: &str) -> Option<Node<'a>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

pub(crate) fn descendants<'a>(node: Node<'a>, name: &'a str) -> impl Iterator<Item = Node<'a>> {
    node.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// Attribute lookup by local name, ignoring any namespace prefix
/// (`epub:type`, `opf:role`).
pub(crate) fn attr<'a>(node: Node<'a>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value())
}

/// Concatenated text of every descendant text node, like DOM `textContent`.
pub(crate) fn text_content(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Directory part of an archive path, including the trailing slash.
pub(crate) fn base_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    }
}

/// Resolves an href against an archive directory, folding `.` and `..`
/// segments and dropping any fragment.
pub(crate) fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = strip_fragment(href);
    let mut components: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            s => components.push(s),
        }
    }
    components.join("/")
}

pub(crate) fn strip_fragment(href: &str) -> &str {
    href.split('#').next().unwrap_or(href)
}

/// Percent-decodes an archive path so encoded and raw spellings compare equal.
pub(crate) fn decode_path(path: &str) -> String {
    percent_encoding::percent_decode_str(path)
        .decode_utf8_lossy()
        .into_owned()
}
