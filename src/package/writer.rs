//! DOCX package writer.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::props::{render_core, CORE_PART};
use super::xml::write_paragraph;
use super::{Package, PartContent, PartEntry, Segment};
use crate::error::Result;
use crate::model::{Document, HeaderFooter, ParagraphLocation};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_BASE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml";

/// Serialize a document to `.docx` bytes.
///
/// Documents loaded from a package are written through their templates;
/// documents built in memory get a minimal package.
pub(crate) fn write_document(doc: &Document) -> Result<Vec<u8>> {
    let built;
    let package = match &doc.package {
        Some(package) => package,
        None => {
            built = build_package(doc);
            &built
        }
    };

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in &package.parts {
        let method = match entry.compression {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        let options = SimpleFileOptions::default().compression_method(method);

        match &entry.content {
            PartContent::Directory => zip.add_directory(entry.name.as_str(), options)?,
            PartContent::Binary(bytes) => {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(bytes)?;
            }
            PartContent::Story(segments) => {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(render_story(segments, doc).as_bytes())?;
            }
        }
    }

    let cursor = zip.finish()?;
    log::debug!(
        "Wrote package with {} parts ({} stories)",
        package.parts.len(),
        package.story_count()
    );
    Ok(cursor.into_inner())
}

/// Fill a story template with the document's paragraphs.
fn render_story(segments: &[Segment], doc: &Document) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Raw(raw) => out.push_str(raw),
            Segment::Paragraph(location) => match doc.paragraph(location) {
                Some(paragraph) => write_paragraph(&mut out, paragraph),
                None => log::warn!("Paragraph {} no longer exists; dropped", location),
            },
        }
    }
    out
}

/// Build a minimal package for a document created in memory.
fn build_package(doc: &Document) -> Package {
    let mut parts = Vec::new();
    let mut overrides = vec![
        ("/word/document.xml".to_string(), format!("{}.document.main+xml", CT_BASE)),
        (
            format!("/{}", CORE_PART),
            "application/vnd.openxmlformats-package.core-properties+xml".to_string(),
        ),
    ];
    let mut doc_rels = Vec::new();
    let mut stories = Vec::new();
    let mut references = Vec::with_capacity(doc.sections.len());

    for (index, section) in doc.sections.iter().enumerate() {
        let mut refs = (None, None);
        if let Some(header) = &section.header {
            let n = doc_rels.len() + 1;
            let id = format!("rId{}", n);
            let file = format!("header{}.xml", n);
            doc_rels.push((id.clone(), "header", file.clone()));
            overrides.push((format!("/word/{}", file), format!("{}.header+xml", CT_BASE)));
            stories.push((
                format!("word/{}", file),
                header_footer_story("hdr", header, |paragraph| ParagraphLocation::Header {
                    section: index,
                    paragraph,
                }),
            ));
            refs.0 = Some(id);
        }
        if let Some(footer) = &section.footer {
            let n = doc_rels.len() + 1;
            let id = format!("rId{}", n);
            let file = format!("footer{}.xml", n);
            doc_rels.push((id.clone(), "footer", file.clone()));
            overrides.push((format!("/word/{}", file), format!("{}.footer+xml", CT_BASE)));
            stories.push((
                format!("word/{}", file),
                header_footer_story("ftr", footer, |paragraph| ParagraphLocation::Footer {
                    section: index,
                    paragraph,
                }),
            ));
            refs.1 = Some(id);
        }
        references.push(refs);
    }

    parts.push(binary("[Content_Types].xml", content_types(&overrides)));
    parts.push(binary(
        "_rels/.rels",
        relationships(&[
            ("rId1".to_string(), "officeDocument", "word/document.xml".to_string()),
            ("rId2".to_string(), "metadata/core-properties", CORE_PART.to_string()),
        ]),
    ));
    parts.push(binary(CORE_PART, render_core(&doc.metadata)));
    parts.push(story("word/document.xml", main_story(doc, &references)));
    parts.push(binary("word/_rels/document.xml.rels", relationships(&doc_rels)));
    for (name, segments) in stories {
        parts.push(story(&name, segments));
    }

    Package { parts }
}

fn binary(name: &str, content: String) -> PartEntry {
    PartEntry {
        name: name.to_string(),
        compression: CompressionMethod::Deflated,
        content: PartContent::Binary(content.into_bytes()),
    }
}

fn story(name: &str, segments: Vec<Segment>) -> PartEntry {
    PartEntry {
        name: name.to_string(),
        compression: CompressionMethod::Deflated,
        content: PartContent::Story(segments),
    }
}

fn main_story(doc: &Document, references: &[(Option<String>, Option<String>)]) -> Vec<Segment> {
    let mut segments = vec![Segment::Raw(format!(
        r#"{}<w:document xmlns:w="{}" xmlns:r="{}"><w:body>"#,
        XML_DECLARATION, NS_W, NS_R
    ))];

    segments.extend(
        (0..doc.paragraphs.len()).map(|i| Segment::Paragraph(ParagraphLocation::Body(i))),
    );

    for (t, table) in doc.tables.iter().enumerate() {
        segments.push(Segment::Raw(
            r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr>"#.to_string(),
        ));
        for (r, row) in table.rows.iter().enumerate() {
            segments.push(Segment::Raw("<w:tr>".to_string()));
            for (c, cell) in row.cells.iter().enumerate() {
                segments.push(Segment::Raw("<w:tc>".to_string()));
                if cell.paragraphs.is_empty() {
                    // A cell must contain at least one paragraph.
                    segments.push(Segment::Raw("<w:p/>".to_string()));
                }
                for p in 0..cell.paragraphs.len() {
                    segments.push(Segment::Paragraph(ParagraphLocation::Cell {
                        table: t,
                        row: r,
                        cell: c,
                        paragraph: p,
                    }));
                }
                segments.push(Segment::Raw("</w:tc>".to_string()));
            }
            segments.push(Segment::Raw("</w:tr>".to_string()));
        }
        segments.push(Segment::Raw("</w:tbl>".to_string()));
    }

    let last = references.len().saturating_sub(1);
    for (i, (header, footer)) in references.iter().enumerate() {
        let properties = section_properties(header.as_deref(), footer.as_deref());
        if i == last {
            segments.push(Segment::Raw(properties));
        } else {
            segments.push(Segment::Raw(format!("<w:p><w:pPr>{}</w:pPr></w:p>", properties)));
        }
    }
    if references.is_empty() {
        segments.push(Segment::Raw(section_properties(None, None)));
    }

    segments.push(Segment::Raw("</w:body></w:document>".to_string()));
    segments
}

fn section_properties(header: Option<&str>, footer: Option<&str>) -> String {
    let mut out = String::from("<w:sectPr>");
    if let Some(id) = header {
        out.push_str(&format!(r#"<w:headerReference w:type="default" r:id="{}"/>"#, id));
    }
    if let Some(id) = footer {
        out.push_str(&format!(r#"<w:footerReference w:type="default" r:id="{}"/>"#, id));
    }
    out.push_str(r#"<w:pgSz w:w="11906" w:h="16838"/>"#);
    out.push_str("</w:sectPr>");
    out
}

fn header_footer_story(
    root: &str,
    content: &HeaderFooter,
    locate: impl Fn(usize) -> ParagraphLocation,
) -> Vec<Segment> {
    let mut segments = vec![Segment::Raw(format!(
        r#"{}<w:{} xmlns:w="{}" xmlns:r="{}">"#,
        XML_DECLARATION, root, NS_W, NS_R
    ))];
    if content.paragraphs.is_empty() {
        segments.push(Segment::Raw("<w:p/>".to_string()));
    }
    segments.extend((0..content.paragraphs.len()).map(|i| Segment::Paragraph(locate(i))));
    segments.push(Segment::Raw(format!("</w:{}>", root)));
    segments
}

fn content_types(overrides: &[(String, String)]) -> String {
    let mut out = format!(
        r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        XML_DECLARATION
    );
    out.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    out.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for (part, content_type) in overrides {
        out.push_str(&format!(
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            part, content_type
        ));
    }
    out.push_str("</Types>");
    out
}

fn relationships(items: &[(String, &str, String)]) -> String {
    let mut out = format!(
        r#"{}<Relationships xmlns="{}">"#,
        XML_DECLARATION, PACKAGE_REL_BASE
    );
    for (id, kind, target) in items {
        let rel_type = if kind.starts_with("metadata/") {
            format!("{}/{}", PACKAGE_REL_BASE, kind)
        } else {
            format!("{}/{}", REL_BASE, kind)
        };
        out.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        ));
    }
    out.push_str("</Relationships>");
    out
}
