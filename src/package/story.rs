//! Scanning of story parts (main document, headers, footers).
//!
//! A story is split into raw text segments and paragraph slots. Slots
//! point at the paragraphs the model owns; everything between them is
//! written back verbatim.

use quick_xml::events::Event;

use super::xml::{read_paragraph, section_refs, SectionRefs, XmlCursor};
use super::Segment;
use crate::error::Result;
use crate::model::{Paragraph, ParagraphLocation, Table, TableCell, TableRow};

/// Which kind of story a part holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoryKind {
    /// `w:document` / `w:body`
    Main,
    /// `w:hdr` or `w:ftr`
    HeaderFooter,
}

/// Result of scanning one story part.
#[derive(Debug, Default)]
pub(crate) struct Story {
    pub segments: Vec<Segment>,
    pub paragraphs: Vec<Paragraph>,
    pub tables: Vec<Table>,
    /// One entry per `w:sectPr`, in document order
    pub sections: Vec<SectionRefs>,
}

impl Story {
    fn push_raw(&mut self, raw: &str) {
        if !raw.is_empty() {
            self.segments.push(Segment::Raw(raw.to_string()));
        }
    }

    /// Store a paragraph and record its slot.
    fn place(&mut self, location: ParagraphLocation, paragraph: Paragraph) {
        match location {
            ParagraphLocation::Cell { .. } => {
                if let Some(cell) = self.current_cell() {
                    cell.paragraphs.push(paragraph);
                }
            }
            _ => self.paragraphs.push(paragraph),
        }
        self.segments.push(Segment::Paragraph(location));
    }

    fn current_cell(&mut self) -> Option<&mut TableCell> {
        self.tables.last_mut()?.rows.last_mut()?.cells.last_mut()
    }

    fn cell_location(&self) -> Option<ParagraphLocation> {
        let table = self.tables.len().checked_sub(1)?;
        let rows = &self.tables[table].rows;
        let row = rows.len().checked_sub(1)?;
        let cell = rows[row].cells.len().checked_sub(1)?;
        Some(ParagraphLocation::Cell {
            table,
            row,
            cell,
            paragraph: rows[row].cells[cell].paragraphs.len(),
        })
    }
}

/// Element context while scanning.
struct Scope {
    /// Local names of the open elements
    stack: Vec<Vec<u8>>,
    /// Stack depth of the modeled top-level table, if inside one
    table_level: Option<usize>,
}

impl Scope {
    fn top(&self) -> Option<&[u8]> {
        self.stack.last().map(|n| n.as_slice())
    }

    fn at_story_root(&self, kind: StoryKind) -> bool {
        match kind {
            StoryKind::Main => self.stack.len() == 2 && self.top() == Some(b"body"),
            StoryKind::HeaderFooter => {
                self.stack.len() == 1 && matches!(self.top(), Some(b"hdr") | Some(b"ftr"))
            }
        }
    }

    /// Whether the next element is a direct child at `offset` levels below
    /// the modeled table.
    fn in_table_at(&self, offset: usize) -> bool {
        self.table_level
            .map(|level| self.stack.len() == level + offset)
            .unwrap_or(false)
    }
}

/// Split a story part into segments and model objects.
pub(crate) fn scan_story(xml: &str, part: &str, kind: StoryKind) -> Result<Story> {
    let mut cursor = XmlCursor::new(xml, part);
    let mut story = Story::default();
    let mut scope = Scope {
        stack: Vec::new(),
        table_level: None,
    };
    let mut raw_start = 0usize;

    loop {
        let before = cursor.position();
        match cursor.next_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"p" => {
                        if let Some(location) = paragraph_slot(&story, &scope, kind) {
                            story.push_raw(cursor.slice(raw_start, before));
                            let paragraph = read_paragraph(&mut cursor, before, &e, false)?;
                            if paragraph.markup.properties.contains("sectPr") {
                                story
                                    .sections
                                    .push(section_refs(&paragraph.markup.properties, part)?);
                            }
                            story.place(location, paragraph);
                            raw_start = cursor.position();
                            continue;
                        }
                    }
                    b"sectPr" if kind == StoryKind::Main && scope.at_story_root(kind) => {
                        cursor.skip_element()?;
                        let raw = cursor.slice(before, cursor.position());
                        story.sections.push(section_refs(raw, part)?);
                        continue;
                    }
                    b"tbl" if kind == StoryKind::Main && scope.at_story_root(kind) => {
                        scope.table_level = Some(scope.stack.len());
                        story.tables.push(Table::new());
                    }
                    b"tr" if scope.in_table_at(1) => {
                        if let Some(table) = story.tables.last_mut() {
                            table.add_row(TableRow::default());
                        }
                    }
                    b"tc" if scope.in_table_at(2) => {
                        if let Some(row) = story.tables.last_mut().and_then(|t| t.rows.last_mut()) {
                            row.cells.push(TableCell::empty());
                        }
                    }
                    _ => {}
                }
                scope.stack.push(name);
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(location) = paragraph_slot(&story, &scope, kind) {
                        story.push_raw(cursor.slice(raw_start, before));
                        let paragraph = read_paragraph(&mut cursor, before, &e, true)?;
                        story.place(location, paragraph);
                        raw_start = cursor.position();
                    }
                }
                b"sectPr" if kind == StoryKind::Main && scope.at_story_root(kind) => {
                    story.sections.push(SectionRefs::default());
                }
                _ => {}
            },
            Event::End(_) => {
                scope.stack.pop();
                if scope.table_level == Some(scope.stack.len()) {
                    scope.table_level = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    story.push_raw(cursor.slice(raw_start, xml.len()));
    Ok(story)
}

fn paragraph_slot(story: &Story, scope: &Scope, kind: StoryKind) -> Option<ParagraphLocation> {
    if scope.at_story_root(kind) {
        return Some(ParagraphLocation::Body(story.paragraphs.len()));
    }
    if kind == StoryKind::Main && scope.in_table_at(3) && scope.top() == Some(b"tc") {
        return story.cell_location();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
        r#"<w:p><w:r><w:t>One</w:t></w:r></w:p>"#,
        r#"<w:tbl><w:tblPr/><w:tr><w:tc><w:tcPr/><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc>"#,
        r#"<w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p>"#,
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>nested</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        r#"<w:p/></w:tc></w:tr></w:tbl>"#,
        r#"<w:p><w:pPr><w:sectPr><w:headerReference w:type="default" r:id="rId7"/></w:sectPr></w:pPr><w:r><w:t>Two</w:t></w:r></w:p>"#,
        r#"<w:sdt><w:sdtContent><w:p><w:r><w:t>control</w:t></w:r></w:p></w:sdtContent></w:sdt>"#,
        r#"<w:sectPr><w:footerReference w:type="default" r:id="rId8"/></w:sectPr>"#,
        r#"</w:body></w:document>"#
    );

    #[test]
    fn test_scan_main_story() {
        let story = scan_story(MAIN, "word/document.xml", StoryKind::Main).unwrap();

        let texts: Vec<String> = story.paragraphs.iter().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["One", "Two"]);

        assert_eq!(story.tables.len(), 1);
        let row = &story.tables[0].rows[0];
        assert_eq!(row.cells.len(), 2);
        assert_eq!(row.cells[0].plain_text(), "A1");
        // nested table paragraphs stay raw, the trailing empty paragraph is modeled
        assert_eq!(row.cells[1].paragraphs.len(), 2);
        assert_eq!(row.cells[1].paragraphs[0].text(), "B1");

        assert_eq!(story.sections.len(), 2);
        assert_eq!(story.sections[0].header.as_deref(), Some("rId7"));
        assert_eq!(story.sections[1].footer.as_deref(), Some("rId8"));
    }

    #[test]
    fn test_scan_segments_cover_all_text() {
        let story = scan_story(MAIN, "word/document.xml", StoryKind::Main).unwrap();
        let slots = story
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Paragraph(_)))
            .count();
        assert_eq!(slots, 5);

        let raw: String = story
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Raw(r) => Some(r.as_str()),
                _ => None,
            })
            .collect();
        assert!(raw.contains("nested"));
        assert!(raw.contains("control"));
        assert!(raw.ends_with("</w:body></w:document>"));
    }

    #[test]
    fn test_scan_header_story() {
        let xml = r#"<w:hdr xmlns:w="x"><w:p><w:r><w:t>Page header</w:t></w:r></w:p><w:p/></w:hdr>"#;
        let story = scan_story(xml, "word/header1.xml", StoryKind::HeaderFooter).unwrap();
        assert_eq!(story.paragraphs.len(), 2);
        assert_eq!(story.paragraphs[0].text(), "Page header");
        assert!(story.tables.is_empty());
    }
}
