//! Core properties (`docProps/core.xml`).

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use quick_xml::events::Event;

use super::xml::XmlCursor;
use crate::error::{Error, Result};
use crate::model::Metadata;

pub(crate) const CORE_PART: &str = "docProps/core.xml";

/// Parse core properties into [`Metadata`].
pub(crate) fn parse_core(xml: &str, part: &str) -> Result<Metadata> {
    let mut cursor = XmlCursor::new(xml, part);
    let mut metadata = Metadata::default();
    let mut current: Option<Vec<u8>> = None;
    let mut text = String::new();

    loop {
        match cursor.next_event()? {
            Event::Start(e) => {
                current = Some(e.local_name().as_ref().to_vec());
                text.clear();
            }
            Event::Text(t) if current.is_some() => {
                let value = t.unescape().map_err(|e| Error::xml(part, e))?;
                text.push_str(&value);
            }
            Event::End(_) => {
                if let Some(name) = current.take() {
                    assign(&mut metadata, &name, text.trim());
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(metadata)
}

fn assign(metadata: &mut Metadata, name: &[u8], value: &str) {
    if value.is_empty() {
        return;
    }
    let owned = || Some(value.to_string());
    match name {
        b"title" => metadata.title = owned(),
        b"subject" => metadata.subject = owned(),
        b"creator" => metadata.creator = owned(),
        b"keywords" => metadata.keywords = owned(),
        b"description" => metadata.description = owned(),
        b"lastModifiedBy" => metadata.last_modified_by = owned(),
        b"language" => metadata.language = owned(),
        b"created" => metadata.created = parse_date(value),
        b"modified" => metadata.modified = parse_date(value),
        _ => {}
    }
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Render core properties for a newly built package.
pub(crate) fn render_core(metadata: &Metadata) -> String {
    let mut out = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));

    let fields = [
        ("dc:title", &metadata.title),
        ("dc:subject", &metadata.subject),
        ("dc:creator", &metadata.creator),
        ("cp:keywords", &metadata.keywords),
        ("dc:description", &metadata.description),
        ("cp:lastModifiedBy", &metadata.last_modified_by),
        ("dc:language", &metadata.language),
    ];
    for (tag, value) in fields {
        if let Some(value) = value {
            out.push_str(&format!("<{}>{}</{}>", tag, escape(value.as_str()), tag));
        }
    }

    for (tag, value) in [
        ("dcterms:created", metadata.created),
        ("dcterms:modified", metadata.modified),
    ] {
        if let Some(date) = value {
            out.push_str(&format!(
                r#"<{} xsi:type="dcterms:W3CDTF">{}</{}>"#,
                tag,
                date.format("%Y-%m-%dT%H:%M:%SZ"),
                tag
            ));
        }
    }

    out.push_str("</cp:coreProperties>");
    out
}
