use std::collections::HashMap;

use crate::archive::Archive;
use crate::error::Error;
use crate::xml;

pub(crate) const CONTAINER_PATH: &str = "META-INF/container.xml";
pub(crate) const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Clone, Debug, PartialEq)]
pub struct ManifestItem {
    pub href: String,
    pub media_type: String,
    pub properties: Vec<String>,
}

impl ManifestItem {
    pub fn is_markup(&self) -> bool {
        self.media_type.contains("html")
    }

    fn is_nav(&self) -> bool {
        self.properties.iter().any(|p| p == "nav")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Package {
    /// Archive path of the package document.
    pub opf_path: String,
    pub title: String,
    pub author: String,
    pub manifest: HashMap<String, ManifestItem>,
    /// Manifest ids in reading order.
    pub spine: Vec<String>,
    /// Archive path of the legacy NCX index, if the manifest has one.
    pub ncx_path: Option<String>,
    /// Archive path of the EPUB 3 navigation document, if any.
    pub nav_path: Option<String>,
}

impl Package {
    /// Directory all manifest hrefs are relative to.
    pub fn base_dir(&self) -> &str {
        xml::base_dir(&self.opf_path)
    }

    pub fn resolve(&self, href: &str) -> String {
        xml::resolve_href(self.base_dir(), href)
    }

    pub fn toc_path(&self) -> Option<&str> {
        self.ncx_path.as_deref().or(self.nav_path.as_deref())
    }
}

/// Reads `META-INF/container.xml` and returns the package document path.
pub fn read_container(archive: &mut impl Archive) -> Result<String, Error> {
    if !archive.contains_file(CONTAINER_PATH) {
        return Err(Error::MissingContainer);
    }
    let text = archive.read_entry_as_text(CONTAINER_PATH)?;
    let doc = xml::parse(&text)
        .map_err(|e| Error::MalformedContainer(e.to_string()))?;

    let rootfile = xml::descendant(doc.root_element(), "rootfile")
        .ok_or_else(|| Error::MalformedContainer("no rootfile element".into()))?;
    match xml::attr(rootfile, "full-path").map(str::trim) {
        Some(path) if !path.is_empty() => Ok(path.to_string()),
        _ => Err(Error::MalformedContainer("rootfile has no full-path".into())),
    }
}

pub fn parse_package(archive: &mut impl Archive) -> Result<Package, Error> {
    let opf_path = read_container(archive)?;
    if !archive.contains_file(&opf_path) {
        return Err(Error::MissingPackageDocument(opf_path));
    }
    let text = archive.read_entry_as_text(&opf_path)?;
    let package = parse_package_document(&opf_path, &text)?;
    log::debug!(
        "package {}: {} manifest items, {} spine items",
        package.opf_path,
        package.manifest.len(),
        package.spine.len()
    );
    Ok(package)
}

pub fn parse_package_document(opf_path: &str, text: &str) -> Result<Package, Error> {
    let doc = xml::parse(text)?;
    let root = doc.root_element();

    let (title, author) = parse_metadata(root);

    let manifest_node = xml::descendant(root, "manifest").ok_or(Error::MissingManifest)?;
    let spine_node = xml::descendant(root, "spine").ok_or(Error::MissingSpine)?;

    let mut manifest = HashMap::new();
    // Document order, so the first NCX / nav item wins.
    let mut ncx_id: Option<&str> = None;
    let mut nav_id: Option<&str> = None;
    for item in xml::descendants(manifest_node, "item") {
        let (Some(id), Some(href), Some(media_type)) = (
            xml::attr(item, "id"),
            xml::attr(item, "href"),
            xml::attr(item, "media-type"),
        ) else {
            continue;
        };
        let properties: Vec<String> = xml::attr(item, "properties")
            .map(|p| p.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
        let entry = ManifestItem {
            href: href.to_string(),
            media_type: media_type.to_string(),
            properties,
        };
        if ncx_id.is_none() && entry.media_type == NCX_MEDIA_TYPE {
            ncx_id = Some(id);
        }
        if nav_id.is_none() && entry.is_nav() {
            nav_id = Some(id);
        }
        manifest.insert(id.to_string(), entry);
    }

    // EPUB 2 names its index explicitly on the spine.
    if let Some(toc_id) = xml::attr(spine_node, "toc")
        && manifest.contains_key(toc_id)
    {
        ncx_id = Some(toc_id);
    }

    let spine: Vec<String> = xml::descendants(spine_node, "itemref")
        .filter_map(|n| xml::attr(n, "idref"))
        .map(String::from)
        .collect();

    let base = xml::base_dir(opf_path);
    let resolve = |id: Option<&str>| {
        id.and_then(|id| manifest.get(id))
            .map(|item| xml::resolve_href(base, &item.href))
    };
    let ncx_path = resolve(ncx_id);
    let nav_path = resolve(nav_id);

    Ok(Package {
        opf_path: opf_path.to_string(),
        title,
        author,
        manifest,
        spine,
        ncx_path,
        nav_path,
    })
}

fn parse_metadata(root: xml::Node) -> (String, String) {
    let metadata = xml::descendant(root, "metadata");
    let field = |name: &str, fallback: &str| {
        metadata
            .and_then(|m| xml::descendant(m, name))
            .map(|n| xml::text_content(n).trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    };
    (field("title", UNKNOWN_TITLE), field("creator", UNKNOWN_AUTHOR))
}
