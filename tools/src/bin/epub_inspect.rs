//! Inspect the raw contents of an EPUB file (which is a ZIP).
//!
//! Usage:
//!   epub-inspect <book.epub>                    list all ZIP entries
//!   epub-inspect <book.epub> <internal/path>    dump one entry
//!   epub-inspect <book.epub> --spine            show the reading order from the package
//!   epub-inspect <book.epub> --grep <pattern>   search markup, package and NCX files

use std::fs;
use std::io::{self, Read, Write};
use zip::ZipArchive;

const SEARCHED_EXTENSIONS: [&str; 6] = [".xhtml", ".html", ".htm", ".opf", ".ncx", ".xml"];

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage:");
        eprintln!("  epub-inspect <book.epub>                    list ZIP entries");
        eprintln!("  epub-inspect <book.epub> <internal/path>    dump entry");
        eprintln!("  epub-inspect <book.epub> --spine            show reading order");
        eprintln!("  epub-inspect <book.epub> --grep <pattern>   search markup files");
        std::process::exit(1);
    }

    let file = fs::File::open(&args[1]).unwrap_or_else(|e| {
        eprintln!("Cannot open '{}': {e}", args[1]);
        std::process::exit(1);
    });
    let mut archive = ZipArchive::new(file).unwrap_or_else(|e| {
        eprintln!("Not a valid ZIP/EPUB: {e}");
        std::process::exit(1);
    });

    match args.get(2).map(String::as_str) {
        None => list_entries(&mut archive),
        Some("--spine") => show_spine(&mut archive),
        Some("--grep") => {
            let pattern = args.get(3).unwrap_or_else(|| {
                eprintln!("--grep requires a pattern");
                std::process::exit(1);
            });
            grep_entries(&mut archive, pattern);
        }
        Some(path) => dump_entry(&mut archive, path),
    }
}

fn read_text(archive: &mut ZipArchive<fs::File>, path: &str) -> Option<String> {
    let mut entry = archive.by_name(path).ok()?;
    let mut content = String::new();
    entry.read_to_string(&mut content).ok()?;
    Some(content)
}

fn list_entries(archive: &mut ZipArchive<fs::File>) {
    println!("{:>9}  {:>9}  path", "bytes", "packed");
    println!("{}", "-".repeat(60));
    for i in 0..archive.len() {
        let Ok(entry) = archive.by_index(i) else {
            continue;
        };
        if !entry.is_dir() {
            println!("{:>9}  {:>9}  {}", entry.size(), entry.compressed_size(), entry.name());
        }
    }
}

fn dump_entry(archive: &mut ZipArchive<fs::File>, path: &str) {
    let mut entry = archive.by_name(path).unwrap_or_else(|_| {
        eprintln!("'{path}' not found in archive");
        eprintln!("Run without a path argument to list available entries.");
        std::process::exit(1);
    });

    let mut content = Vec::new();
    if let Err(e) = entry.read_to_end(&mut content) {
        eprintln!("Cannot read '{path}': {e}");
        std::process::exit(1);
    }
    let _ = io::stdout().write_all(&content);
}

fn show_spine(archive: &mut ZipArchive<fs::File>) {
    let container = read_text(archive, "META-INF/container.xml").unwrap_or_else(|| {
        eprintln!("No META-INF/container.xml");
        std::process::exit(1);
    });
    let opf_path = roxmltree::Document::parse(&container).ok().and_then(|doc| {
        doc.descendants()
            .find(|n| n.tag_name().name() == "rootfile")
            .and_then(|n| n.attribute("full-path"))
            .map(str::to_owned)
    });
    let Some(opf_path) = opf_path else {
        eprintln!("container.xml names no rootfile");
        std::process::exit(1);
    };
    let opf = read_text(archive, &opf_path).unwrap_or_else(|| {
        eprintln!("Package document '{opf_path}' not found");
        std::process::exit(1);
    });
    let doc = roxmltree::Document::parse(&opf).unwrap_or_else(|e| {
        eprintln!("Package document is not well-formed: {e}");
        std::process::exit(1);
    });

    let base = opf_path.rfind('/').map_or("", |i| &opf_path[..=i]);
    println!("package: {opf_path}");
    let items: Vec<_> = doc
        .descendants()
        .filter(|n| n.tag_name().name() == "item")
        .collect();
    let itemrefs = doc
        .descendants()
        .filter(|n| n.tag_name().name() == "itemref")
        .filter_map(|n| n.attribute("idref"));
    for (n, idref) in itemrefs.enumerate() {
        let item = items.iter().find(|i| i.attribute("id") == Some(idref));
        let href = item.and_then(|i| i.attribute("href")).unwrap_or("?");
        let media_type = item.and_then(|i| i.attribute("media-type")).unwrap_or("?");
        let full = format!("{base}{href}");
        let present = if archive.index_for_name(&full).is_some() { "" } else { "  (missing)" };
        println!("{:>4}  {idref:<20} {media_type:<24} {full}{present}", n + 1);
    }
}

fn grep_entries(archive: &mut ZipArchive<fs::File>, pattern: &str) {
    let names: Vec<String> = archive
        .file_names()
        .filter(|name| SEARCHED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
        .map(str::to_owned)
        .collect();
    let mut found = 0;
    for name in names {
        let Some(content) = read_text(archive, &name) else {
            continue;
        };
        for (n, line) in content.lines().enumerate() {
            if line.contains(pattern) {
                println!("{}:{}: {}", name, n + 1, line.trim());
                found += 1;
            }
        }
    }
    if found == 0 {
        eprintln!("No matches for '{pattern}'");
    }
}
