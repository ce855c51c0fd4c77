#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

pub const OPF_PATH: &str = "OEBPS/content.opf";

/// Builds EPUB archives in memory, one entry at a time.
pub struct EpubBuilder {
    files: Vec<(String, String)>,
    dirs: Vec<String>,
}

impl EpubBuilder {
    /// A builder holding the `mimetype` entry and a container pointing at
    /// [`OPF_PATH`].
    pub fn new() -> Self {
        Self {
            files: vec![
                ("mimetype".into(), "application/epub+zip".into()),
                ("META-INF/container.xml".into(), container(OPF_PATH)),
            ],
            dirs: Vec::new(),
        }
    }

    /// A builder with no entries at all.
    pub fn empty() -> Self {
        Self { files: Vec::new(), dirs: Vec::new() }
    }

    pub fn file(mut self, path: &str, content: impl Into<String>) -> Self {
        self.files.retain(|(p, _)| p != path);
        self.files.push((path.to_string(), content.into()));
        self
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.dirs.push(path.to_string());
        self
    }

    pub fn without(mut self, path: &str) -> Self {
        self.files.retain(|(p, _)| p != path);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for dir in &self.dirs {
            zip.add_directory(dir.as_str(), options).unwrap();
        }
        for (path, content) in &self.files {
            zip.start_file(path.as_str(), options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

pub fn container(opf_path: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{opf_path}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#
    )
}

pub struct Item<'a> {
    pub id: &'a str,
    pub href: &'a str,
    pub media_type: &'a str,
    pub properties: Option<&'a str>,
}

pub fn xhtml_item<'a>(id: &'a str, href: &'a str) -> Item<'a> {
    Item { id, href, media_type: "application/xhtml+xml", properties: None }
}

pub fn ncx_item<'a>(id: &'a str, href: &'a str) -> Item<'a> {
    Item { id, href, media_type: "application/x-dtbncx+xml", properties: None }
}

pub fn nav_item<'a>(id: &'a str, href: &'a str) -> Item<'a> {
    Item {
        id,
        href,
        media_type: "application/xhtml+xml",
        properties: Some("nav"),
    }
}

pub fn opf(title: &str, author: &str, items: &[Item], spine: &[&str]) -> String {
    let manifest: String = items
        .iter()
        .map(|i| {
            let props = i
                .properties
                .map(|p| format!(r#" properties="{p}""#))
                .unwrap_or_default();
            format!(
                r#"    <item id="{}" href="{}" media-type="{}"{props}/>"#,
                i.id, i.href, i.media_type
            ) + "\n"
        })
        .collect();
    let itemrefs: String = spine
        .iter()
        .map(|id| format!(r#"    <itemref idref="{id}"/>"#) + "\n")
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="uid">urn:uuid:1234</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:creator>{author}</dc:creator>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine>
{itemrefs}  </spine>
</package>"#
    )
}

pub fn xhtml(head_title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>{head_title}</title></head>
<body>
{body}
</body>
</html>"#
    )
}

pub fn ncx(points: &[(&str, &str)]) -> String {
    let nav_points: String = points
        .iter()
        .enumerate()
        .map(|(i, (label, src))| {
            format!(
                r#"    <navPoint id="np{n}" playOrder="{n}">
      <navLabel><text>{label}</text></navLabel>
      <content src="{src}"/>
    </navPoint>
"#,
                n = i + 1
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:uuid:1234"/></head>
  <docTitle><text>Book</text></docTitle>
  <navMap>
{nav_points}  </navMap>
</ncx>"#
    )
}

pub fn nav_doc(links: &[(&str, &str)]) -> String {
    let items: String = links
        .iter()
        .map(|(label, href)| format!(r#"      <li><a href="{href}">{label}</a></li>"#) + "\n")
        .collect();
    xhtml(
        "Contents",
        &format!(
            r#"<nav epub:type="landmarks"><ol><li><a href="text/ch1.xhtml">Start</a></li></ol></nav>
<nav epub:type="toc">
  <ol>
{items}  </ol>
</nav>"#
        ),
    )
}

/// Three chapters, an NCX index and a stylesheet in the spine-free manifest.
pub fn three_chapter_book() -> Vec<u8> {
    let items = [
        xhtml_item("ch1", "text/ch1.xhtml"),
        xhtml_item("ch2", "text/ch2.xhtml"),
        xhtml_item("ch3", "text/ch3.xhtml"),
        ncx_item("ncx", "toc.ncx"),
        Item { id: "css", href: "style.css", media_type: "text/css", properties: None },
    ];
    EpubBuilder::new()
        .file(OPF_PATH, opf("The Test Book", "Ada Writer", &items, &["ch1", "ch2", "ch3"]))
        .file(
            "OEBPS/text/ch1.xhtml",
            xhtml("One", "<h1>The Beginning</h1>\n<p>It was a dark and stormy night.</p>"),
        )
        .file(
            "OEBPS/text/ch2.xhtml",
            xhtml("Two", "<h2>2. Middle</h2>\n<p>Things happened, then more things.</p>"),
        )
        .file(
            "OEBPS/text/ch3.xhtml",
            xhtml("Three", "<p>The end came quickly; nobody minded!</p>"),
        )
        .file(
            "OEBPS/toc.ncx",
            ncx(&[
                ("Part One: Beginning", "text/ch1.xhtml"),
                ("Part Two", "text/ch2.xhtml#start"),
            ]),
        )
        .file("OEBPS/style.css", "p { margin: 0; }")
        .build()
}
