//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use docxlate::{TranslateError, Translator};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Translator double that records every call.
///
/// Replies come from a phrase table, falling back to the upper-cased input.
/// Inputs containing a configured marker fail.
#[derive(Default)]
pub struct RecordingTranslator {
    calls: Mutex<Vec<(String, String)>>,
    replies: HashMap<String, String>,
    fail_marker: Option<String>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, input: &str, output: &str) -> Self {
        self.replies.insert(input.to_string(), output.to_string());
        self
    }

    pub fn fail_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.calls().into_iter().map(|(text, _)| text).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Translator for RecordingTranslator {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), target_lang.to_string()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(TranslateError::Http { status: 503 });
            }
        }
        Ok(self
            .replies
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_uppercase()))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// A `w:r` with plain text.
pub fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, text)
}

/// A bold `w:r`.
pub fn bold_run(text: &str) -> String {
    format!(
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        text
    )
}

/// A `w:r` with a font size in half-points.
pub fn sized_run(text: &str, half_points: u32) -> String {
    format!(
        r#"<w:r><w:rPr><w:sz w:val="{}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        half_points, text
    )
}

/// A `w:p` holding the given runs.
pub fn paragraph(runs: &[String]) -> String {
    format!("<w:p>{}</w:p>", runs.concat())
}

/// A one-row table with one paragraph per cell.
pub fn table(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|text| {
            format!(
                r#"<w:tc><w:tcPr><w:tcW w:w="2000" w:type="dxa"/></w:tcPr>{}</w:tc>"#,
                paragraph(&[run(text)])
            )
        })
        .collect();
    format!("<w:tbl><w:tblPr/><w:tr>{}</w:tr></w:tbl>", cells)
}

/// Builder for a small but complete `.docx` package.
pub struct DocxFixture {
    body: Vec<String>,
    header: Option<String>,
    footer: Option<String>,
    title: Option<String>,
    extra_parts: Vec<(String, Vec<u8>)>,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            header: None,
            footer: None,
            title: None,
            extra_parts: Vec::new(),
        }
    }

    pub fn body(mut self, xml: impl Into<String>) -> Self {
        self.body.push(xml.into());
        self
    }

    pub fn header(mut self, text: &str) -> Self {
        self.header = Some(paragraph(&[run(text)]));
        self
    }

    pub fn footer(mut self, text: &str) -> Self {
        self.footer = Some(paragraph(&[run(text)]));
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn part(mut self, name: &str, content: &[u8]) -> Self {
        self.extra_parts.push((name.to_string(), content.to_vec()));
        self
    }

    fn document_xml(&self) -> String {
        let mut refs = String::new();
        if self.header.is_some() {
            refs.push_str(r#"<w:headerReference w:type="default" r:id="rIdHeader"/>"#);
        }
        if self.footer.is_some() {
            refs.push_str(r#"<w:footerReference w:type="default" r:id="rIdFooter"/>"#);
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}<w:sectPr>{}<w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
            W_NS,
            R_NS,
            self.body.concat(),
            refs
        )
    }

    fn document_rels(&self) -> String {
        let mut rels = String::from(
            r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );
        if self.header.is_some() {
            rels.push_str(r#"<Relationship Id="rIdHeader" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>"#);
        }
        if self.footer.is_some() {
            rels.push_str(r#"<Relationship Id="rIdFooter" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#);
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        )
    }

    fn story(root: &str, body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{root} xmlns:w="{}" xmlns:r="{}">{}</w:{root}>"#,
            W_NS,
            R_NS,
            body,
            root = root
        )
    }

    /// Serialize the package.
    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let mut add = |name: &str, content: &[u8], options: SimpleFileOptions| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content).unwrap();
        };

        add("[Content_Types].xml", CONTENT_TYPES.as_bytes(), deflated);
        add("_rels/.rels", ROOT_RELS.as_bytes(), deflated);
        let core = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>Fixture</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">2024-01-15T10:30:00Z</dcterms:created></cp:coreProperties>"#,
            self.title.as_deref().unwrap_or("")
        );
        add("docProps/core.xml", core.as_bytes(), deflated);
        add("word/document.xml", self.document_xml().as_bytes(), deflated);
        add(
            "word/_rels/document.xml.rels",
            self.document_rels().as_bytes(),
            deflated,
        );
        add("word/styles.xml", STYLES.as_bytes(), deflated);
        if let Some(header) = &self.header {
            add("word/header1.xml", Self::story("hdr", header).as_bytes(), deflated);
        }
        if let Some(footer) = &self.footer {
            add("word/footer1.xml", Self::story("ftr", footer).as_bytes(), deflated);
        }
        for (name, content) in &self.extra_parts {
            add(name, content, stored);
        }

        zip.finish().unwrap().into_inner()
    }
}

/// The sample most tests use: a two-run paragraph, a blank paragraph,
/// a table, a header and a footer.
pub fn sample_docx() -> Vec<u8> {
    DocxFixture::new()
        .title("Quarterly report")
        .body(paragraph(&[bold_run("Hello "), run("world")]))
        .body("<w:p/>")
        .body(table(&["Thanks", "Bye"]))
        .header("Draft")
        .footer("Page")
        .part("word/media/image1.png", &PNG_BYTES)
        .build()
}

/// Names of all entries in a zip archive, in archive order.
pub fn part_names(data: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Content of one entry.
pub fn part_bytes(data: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).unwrap();
    buf
}

pub fn part_text(data: &[u8], name: &str) -> String {
    String::from_utf8(part_bytes(data, name)).unwrap()
}

pub const PNG_BYTES: [u8; 16] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/><Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#;
