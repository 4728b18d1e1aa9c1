//! OPC relationship parts (`*.rels`).

use quick_xml::events::Event;

use super::xml::{attr, XmlCursor};
use crate::error::Result;

/// Suffix of the main document relationship type (transitional and strict).
pub(crate) const OFFICE_DOCUMENT: &str = "/officeDocument";
/// Suffix of the core properties relationship type.
pub(crate) const CORE_PROPERTIES: &str = "/core-properties";

/// A single relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// All relationships of one source part.
#[derive(Debug, Clone, Default)]
pub(crate) struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub(crate) fn parse(xml: &str, part: &str) -> Result<Self> {
        let mut cursor = XmlCursor::new(xml, part);
        let mut items = Vec::new();

        loop {
            match cursor.next_event()? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.local_name().as_ref() != b"Relationship" {
                        continue;
                    }
                    if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                        items.push(Relationship {
                            id,
                            rel_type: attr(&e, b"Type").unwrap_or_default(),
                            target,
                            external: attr(&e, b"TargetMode").as_deref() == Some("External"),
                        });
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { items })
    }

    /// Internal relationship with the given id.
    pub(crate) fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id && !r.external)
    }

    /// First internal relationship whose type ends with `suffix`.
    pub(crate) fn first_of_type(&self, suffix: &str) -> Option<&Relationship> {
        self.items
            .iter()
            .find(|r| r.rel_type.ends_with(suffix) && !r.external)
    }
}

/// Name of the relationships part for a source part.
///
/// `word/document.xml` → `word/_rels/document.xml.rels`
pub(crate) fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against its source part into a part name
/// without leading slash.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        match source_part.rsplit_once('/') {
            Some((dir, _)) => format!("{}/{}", dir, target),
            None => target.to_string(),
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="/word/document.xml"/>
</Relationships>"#;

    #[test]
    fn test_parse_relationships() {
        let rels = Relationships::parse(RELS, "word/_rels/document.xml.rels").unwrap();
        assert_eq!(rels.by_id("rId1").unwrap().target, "header1.xml");
        assert!(rels.by_id("rId2").is_none());
        assert_eq!(
            rels.first_of_type(OFFICE_DOCUMENT).unwrap().target,
            "/word/document.xml"
        );
    }

    #[test]
    fn test_rels_part_for() {
        assert_eq!(
            rels_part_for("word/document.xml"),
            "word/_rels/document.xml.rels"
        );
        assert_eq!(rels_part_for("root.xml"), "_rels/root.xml.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("word/document.xml", "header1.xml"),
            "word/header1.xml"
        );
        assert_eq!(
            resolve_target("word/document.xml", "../customXml/item1.xml"),
            "customXml/item1.xml"
        );
        assert_eq!(
            resolve_target("word/document.xml", "/word/footer2.xml"),
            "word/footer2.xml"
        );
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
    }
}
