//! EPUB text extraction.
//!
//! An EPUB is a zip archive holding a package document (OPF) that
//! lists every content item in its manifest and the reading order in
//! its spine. Extraction is tolerant of broken packages:
//!
//! - only an unreadable archive or package document aborts the book
//! - spine entries pointing at unknown manifest ids are reported
//! - each content item is fetched, decoded and parsed on its own, so
//!   one bad chapter costs only that chapter
//!
//! Package metadata is logged, never mixed into the extracted text.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use roxmltree::{Document, Node, ParsingOptions};
use serde::Serialize;
use zip::ZipArchive;

use crate::core::error::{BookSearchError, Result};
use crate::core::extract::html::visible_text;
use crate::core::extract::{ensure_exists, ErrorSink, TextExtractor};
use crate::core::types::ExtractionResult;

/// Location of the container document inside every EPUB
const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Manifest media types treated as content documents
const CONTENT_MEDIA_TYPES: &[&str] = &["application/xhtml+xml", "text/html", "application/html"];

const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

/// EPUB text extractor
#[derive(Debug, Default, Clone)]
pub struct EpubExtractor;

impl EpubExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of every content document, in manifest order
    pub fn extract(&self, path: &Path) -> ExtractionResult {
        let mut sink = ErrorSink::for_path(path);

        if let Err(e) = ensure_exists(path) {
            return sink.abort(&e);
        }

        let (mut archive, package) = match open_package(path) {
            Ok(opened) => opened,
            Err(e) => return sink.abort(&e),
        };

        package.metadata.log(path);
        tracing::debug!(
            "{:?}: {} manifest items, {} spine entries",
            path,
            package.items.len(),
            package.spine.len()
        );

        for issue in &package.issues {
            sink.record_error(issue);
        }

        let lookup = package.lookup();
        for idref in &package.spine {
            if !lookup.contains_key(idref.as_str()) {
                sink.record_error(&BookSearchError::ItemFailed {
                    item: idref.clone(),
                    message: "spine entry has no manifest item".to_string(),
                });
            }
        }

        let mut blocks = Vec::new();
        for item in package.items.iter().filter(|i| i.is_content_document()) {
            match archive.item_text(item, &mut sink) {
                Ok(Some(text)) => blocks.push(text),
                Ok(None) => tracing::debug!("Skipping empty item {} in {:?}", item.id, path),
                Err(e) => sink.record_error(&e),
            }
        }

        sink.finish(blocks.join("\n"))
    }

    /// Read only the package metadata of an EPUB
    pub fn metadata(&self, path: &Path) -> Result<PackageMetadata> {
        ensure_exists(path)?;
        let (_, package) = open_package(path)?;
        Ok(package.metadata)
    }
}

impl TextExtractor for EpubExtractor {
    fn extract(&self, path: &Path) -> ExtractionResult {
        EpubExtractor::extract(self, path)
    }

    fn name(&self) -> &'static str {
        "epub"
    }
}

/// One manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    /// Archive path, already resolved against the package directory
    pub href: String,
    pub media_type: String,
}

impl ManifestItem {
    pub fn is_content_document(&self) -> bool {
        let media_type = self.media_type.trim().to_ascii_lowercase();
        CONTENT_MEDIA_TYPES.contains(&media_type.as_str())
    }
}

/// Dublin Core metadata of a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub language: Option<String>,
    pub identifier: Option<String>,
}

impl PackageMetadata {
    fn log(&self, path: &Path) {
        tracing::debug!(
            "{:?}: title={} creator={} language={} identifier={}",
            path,
            self.title.as_deref().unwrap_or("N/A"),
            self.creator.as_deref().unwrap_or("N/A"),
            self.language.as_deref().unwrap_or("N/A"),
            self.identifier.as_deref().unwrap_or("N/A"),
        );
    }
}

/// Parsed package document
#[derive(Debug, Default)]
pub struct PackageModel {
    /// Manifest items in declaration order
    pub items: Vec<ManifestItem>,
    /// Spine idrefs in reading order
    pub spine: Vec<String>,
    pub metadata: PackageMetadata,
    /// Non-fatal problems found while parsing the manifest
    pub issues: Vec<BookSearchError>,
}

impl PackageModel {
    /// Parse an OPF document located at `opf_path` inside the archive
    pub fn parse(opf_xml: &str, opf_path: &str) -> Result<Self> {
        let doc = parse_xml(opf_xml)
            .map_err(|e| BookSearchError::StructuralParse(format!("{opf_path}: {e}")))?;

        let package = doc.root_element();
        if package.tag_name().name() != "package" {
            return Err(BookSearchError::StructuralParse(format!(
                "{opf_path}: root element is <{}>, expected <package>",
                package.tag_name().name()
            )));
        }

        let base_dir = opf_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        let mut model = PackageModel::default();

        // Collect the manifest into an owned Vec right away. Everything
        // after this point (lookups, spine checks, extraction) works on
        // this Vec and never walks the XML again.
        let manifest_nodes: Vec<Node<'_, '_>> = child_elements(package, "manifest")
            .flat_map(|manifest| child_elements(manifest, "item"))
            .collect();

        for node in manifest_nodes {
            match (node.attribute("id"), node.attribute("href")) {
                (Some(id), Some(href)) => model.items.push(ManifestItem {
                    id: id.to_string(),
                    href: resolve_href(base_dir, href),
                    media_type: node.attribute("media-type").unwrap_or("").to_string(),
                }),
                (id, _) => model.issues.push(BookSearchError::ItemFailed {
                    item: id.unwrap_or("no_id").to_string(),
                    message: "manifest item without id or href".to_string(),
                }),
            }
        }

        model.spine = child_elements(package, "spine")
            .flat_map(|spine| child_elements(spine, "itemref"))
            .filter_map(|itemref| itemref.attribute("idref"))
            .map(str::to_string)
            .collect();

        if let Some(metadata) = child_elements(package, "metadata").next() {
            model.metadata = PackageMetadata {
                title: dc_value(metadata, "title"),
                creator: dc_value(metadata, "creator"),
                language: dc_value(metadata, "language"),
                identifier: dc_value(metadata, "identifier"),
            };
        }

        Ok(model)
    }

    /// id → item lookup borrowing from the materialized manifest
    pub fn lookup(&self) -> HashMap<&str, &ManifestItem> {
        let mut map = HashMap::with_capacity(self.items.len());
        for item in &self.items {
            map.entry(item.id.as_str()).or_insert(item);
        }
        map
    }
}

/// Open zip archive of an EPUB
struct PackageArchive {
    zip: ZipArchive<File>,
}

impl PackageArchive {
    /// Archive name for an href, trying it as written and then with
    /// `%XX` escapes decoded
    fn entry_name(&self, name: &str) -> String {
        if self.zip.file_names().any(|n| n == name) {
            return name.to_string();
        }
        match percent_decode(name) {
            Some(decoded) if self.zip.file_names().any(|n| n == decoded) => decoded,
            _ => name.to_string(),
        }
    }

    fn read_entry(&mut self, name: &str) -> std::result::Result<Vec<u8>, String> {
        let name = self.entry_name(name);
        let mut entry = self.zip.by_name(&name).map_err(|e| e.to_string())?;

        // Declared sizes are untrusted; let the reader grow the buffer
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(|e| e.to_string())?;
        Ok(bytes)
    }

    /// Fetch, decode and parse one content item. `Ok(None)` for items
    /// with no visible text. A charset fallback is noted in `sink`.
    fn item_text(&mut self, item: &ManifestItem, sink: &mut ErrorSink) -> Result<Option<String>> {
        let item_error = |message: String| BookSearchError::ItemFailed {
            item: item.id.clone(),
            message,
        };

        let bytes = self
            .read_entry(&item.href)
            .map_err(|e| item_error(format!("cannot read {}: {e}", item.href)))?;
        if bytes.is_empty() {
            return Ok(None);
        }

        let markup = decode_content(&bytes);
        if markup.fallback {
            sink.record_error(&BookSearchError::Encoding(format!(
                "item {}: not UTF-8, decoded as windows-1252",
                item.id
            )));
        }

        let text = panic::catch_unwind(AssertUnwindSafe(|| visible_text(&markup.text)))
            .map_err(|_| item_error("markup parser panicked".to_string()))?;

        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}

/// Open the archive and parse its package document
fn open_package(path: &Path) -> Result<(PackageArchive, PackageModel)> {
    let file = File::open(path).map_err(|source| BookSearchError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let zip = ZipArchive::new(file)
        .map_err(|e| BookSearchError::StructuralParse(format!("not a valid EPUB archive: {e}")))?;
    let mut archive = PackageArchive { zip };

    let opf_path = locate_package_document(&mut archive)?;
    let opf_bytes = archive
        .read_entry(&opf_path)
        .map_err(|e| BookSearchError::StructuralParse(format!("cannot read {opf_path}: {e}")))?;
    let opf_xml = decode_content(&opf_bytes).text;

    let package = PackageModel::parse(&opf_xml, &opf_path)?;
    Ok((archive, package))
}

/// Find the OPF path from `META-INF/container.xml`, falling back to the
/// first `.opf` entry for archives without a usable container.
fn locate_package_document(archive: &mut PackageArchive) -> Result<String> {
    if let Ok(bytes) = archive.read_entry(CONTAINER_PATH) {
        let xml = decode_content(&bytes).text;
        match parse_xml(&xml) {
            Ok(doc) => {
                let rootfile = doc
                    .descendants()
                    .filter(|n| n.has_tag_name_local("rootfile"))
                    .filter_map(|n| n.attribute("full-path"))
                    .next();
                if let Some(full_path) = rootfile {
                    return Ok(full_path.trim_start_matches('/').to_string());
                }
                tracing::debug!("{CONTAINER_PATH} lists no rootfile");
            }
            Err(e) => tracing::debug!("Unparseable {CONTAINER_PATH}: {e}"),
        }
    }

    archive
        .zip
        .file_names()
        .find(|name| name.to_ascii_lowercase().ends_with(".opf"))
        .map(str::to_string)
        .ok_or_else(|| BookSearchError::StructuralParse("no package document (.opf) found".into()))
}

fn parse_xml(xml: &str) -> std::result::Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(xml, options)
}

trait LocalName {
    fn has_tag_name_local(&self, name: &str) -> bool;
}

impl LocalName for Node<'_, '_> {
    fn has_tag_name_local(&self, name: &str) -> bool {
        self.is_element() && self.tag_name().name() == name
    }
}

/// Element children of `parent` with the given local name, namespace ignored
fn child_elements<'a, 'input: 'a>(
    parent: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    parent
        .children()
        .filter(move |n| n.has_tag_name_local(name))
}

fn dc_value(metadata: Node<'_, '_>, name: &str) -> Option<String> {
    metadata
        .children()
        .filter(|n| n.has_tag_name_local(name))
        .find(|n| n.tag_name().namespace().is_none_or(|ns| ns == DC_NAMESPACE))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve a manifest href against the package directory
fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let joined = if base_dir.is_empty() || href.starts_with('/') {
        href.trim_start_matches('/').to_string()
    } else {
        format!("{base_dir}/{href}")
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Decode `%XX` escapes; `None` if the result is not UTF-8
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok()?;
            if let Ok(value) = u8::from_str_radix(hex, 16) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}

struct Decoded {
    text: String,
    fallback: bool,
}

/// Decode item bytes: BOM-declared encoding, then strict UTF-8, then
/// windows-1252, which accepts any byte sequence.
fn decode_content(bytes: &[u8]) -> Decoded {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return Decoded {
            text: text.into_owned(),
            fallback: encoding != UTF_8,
        };
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Decoded {
            text: text.to_string(),
            fallback: false,
        },
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            Decoded {
                text: text.into_owned(),
                fallback: true,
            }
        }
    }
}
