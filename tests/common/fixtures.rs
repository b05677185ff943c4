// Test fixtures: synthetic EPUB, PDF and text books in a temp library

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// One manifest entry of a synthetic EPUB
#[allow(dead_code)] // Used in integration tests
struct EpubItem {
    id: String,
    href: String,
    /// Name inside the archive, relative to OEBPS/
    entry: String,
    media_type: String,
    /// `None` leaves the item out of the archive
    content: Option<Vec<u8>>,
}

/// Builder for a minimal EPUB 3 package
#[allow(dead_code)] // Used in integration tests
pub struct EpubFixture {
    title: String,
    items: Vec<EpubItem>,
}

#[allow(dead_code)] // Used in integration tests
impl EpubFixture {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            items: Vec::new(),
        }
    }

    /// XHTML chapter with one paragraph per line of `text`
    pub fn chapter(self, id: &str, text: &str) -> Self {
        let paragraphs: String = text.lines().map(|l| format!("<p>{l}</p>\n")).collect();
        let xhtml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title>{id}</title>\
             <style>p {{ margin: 0 }}</style></head>\n<body>\n{paragraphs}</body></html>"
        );
        self.raw_item(id, &format!("{id}.xhtml"), "application/xhtml+xml", xhtml.as_bytes())
    }

    /// Item with arbitrary bytes
    pub fn raw_item(self, id: &str, href: &str, media_type: &str, content: &[u8]) -> Self {
        self.stored_item(id, href, href, media_type, content)
    }

    /// Item whose manifest href differs from its archive entry name,
    /// e.g. a `%20`-escaped href for a file name with a space
    pub fn stored_item(
        mut self,
        id: &str,
        href: &str,
        entry: &str,
        media_type: &str,
        content: &[u8],
    ) -> Self {
        self.items.push(EpubItem {
            id: id.to_string(),
            href: href.to_string(),
            entry: entry.to_string(),
            media_type: media_type.to_string(),
            content: Some(content.to_vec()),
        });
        self
    }

    /// Content item listed in the manifest but absent from the archive
    pub fn missing_item(mut self, id: &str) -> Self {
        self.items.push(EpubItem {
            id: id.to_string(),
            href: format!("{id}.xhtml"),
            entry: format!("{id}.xhtml"),
            media_type: "application/xhtml+xml".to_string(),
            content: None,
        });
        self
    }

    fn package_document(&self) -> String {
        let manifest: String = self
            .items
            .iter()
            .map(|i| {
                format!(
                    "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
                    i.id, i.href, i.media_type
                )
            })
            .collect();
        let spine: String = self
            .items
            .iter()
            .filter(|i| i.media_type == "application/xhtml+xml")
            .map(|i| format!("    <itemref idref=\"{}\"/>\n", i.id))
            .collect();

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\" unique-identifier=\"uid\">\n\
             <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n\
             <dc:identifier id=\"uid\">urn:uuid:test</dc:identifier>\n\
             <dc:title>{}</dc:title>\n\
             <dc:language>en</dc:language>\n\
             </metadata>\n<manifest>\n{manifest}</manifest>\n<spine>\n{spine}</spine>\n</package>",
            self.title
        )
    }

    pub fn write(&self, path: &Path) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        zip.start_file("META-INF/container.xml", deflated).unwrap();
        zip.write_all(CONTAINER_XML.as_bytes()).unwrap();

        zip.start_file("OEBPS/content.opf", deflated).unwrap();
        zip.write_all(self.package_document().as_bytes()).unwrap();

        for item in &self.items {
            if let Some(content) = &item.content {
                zip.start_file(format!("OEBPS/{}", item.entry), deflated)
                    .unwrap();
                zip.write_all(content).unwrap();
            }
        }

        zip.finish().unwrap();
    }
}

/// One page of a synthetic PDF
#[allow(dead_code)] // Used in integration tests
pub enum PdfPage<'a> {
    Text(&'a str),
    /// Content stream whose font operator has no font name
    Broken,
}

/// Write a PDF with one text line per page (Courier, standard 14 font)
#[allow(dead_code)] // Used in integration tests
pub fn write_pdf(path: &Path, pages: &[PdfPage<'_>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let operations = match page {
            PdfPage::Text(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            PdfPage::Broken => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![12.into(), 12.into()]),
                Operation::new("Tj", vec![Object::string_literal("unreachable")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Temporary books directory
#[allow(dead_code)] // Used in integration tests
pub struct TestLibrary {
    pub dir: TempDir,
    pub files: Vec<PathBuf>,
}

#[allow(dead_code)] // Used in integration tests
impl TestLibrary {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            files: Vec::new(),
        }
    }

    /// Library with one book of each format; the PDF's second page is broken
    pub fn mixed() -> Self {
        let mut library = Self::new();
        library.add_epub(
            "Moby Dick - Herman Melville.epub",
            &EpubFixture::new("Moby Dick")
                .chapter("ch1", "Call me Ishmael.\nThe white whale surfaced near the ship.")
                .chapter("ch2", "Ahab paced the quarterdeck."),
        );
        library.add_pdf(
            "Field Notes - Anonymous.pdf",
            &[
                PdfPage::Text("Lighthouse keepers log the weather"),
                PdfPage::Broken,
                PdfPage::Text("Barometer readings fell overnight"),
            ],
        );
        library.add_text("notes.txt", "A plain text note about harpoons and rope.");
        library
    }

    /// Get path to the library
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn target(&mut self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        self.files.push(path.clone());
        path
    }

    pub fn add_text(&mut self, name: &str, content: &str) -> PathBuf {
        self.add_bytes(name, content.as_bytes())
    }

    pub fn add_bytes(&mut self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.target(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn add_epub(&mut self, name: &str, epub: &EpubFixture) -> PathBuf {
        let path = self.target(name);
        epub.write(&path);
        path
    }

    pub fn add_pdf(&mut self, name: &str, pages: &[PdfPage<'_>]) -> PathBuf {
        let path = self.target(name);
        write_pdf(&path, pages);
        path
    }
}
