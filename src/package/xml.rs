//! Low-level WordprocessingML scanning and rendering.
//!
//! Parts are scanned with `quick-xml` while tracking byte offsets, so
//! anything the model does not interpret is copied back as the exact
//! source text.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::{
    FontSize, HighlightColor, Paragraph, ParagraphMarkup, RgbColor, Run, RunFormat,
};

/// Event reader over a part that knows its byte offsets.
pub(crate) struct XmlCursor<'a> {
    reader: Reader<&'a [u8]>,
    xml: &'a str,
    part: &'a str,
}

impl<'a> XmlCursor<'a> {
    pub(crate) fn new(xml: &'a str, part: &'a str) -> Self {
        Self {
            reader: Reader::from_str(xml),
            xml,
            part,
        }
    }

    /// Byte offset of the next unread event.
    pub(crate) fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    pub(crate) fn next_event(&mut self) -> Result<Event<'a>> {
        self.reader
            .read_event()
            .map_err(|e| Error::xml(self.part, e))
    }

    /// Consume events up to and including the end tag matching an
    /// already-read start tag.
    pub(crate) fn skip_element(&mut self) -> Result<()> {
        let mut depth = 1usize;
        loop {
            match self.next_event()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Event::Eof => return Err(Error::xml(self.part, "unexpected end of part")),
                _ => {}
            }
        }
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.xml[start..end]
    }

    pub(crate) fn part(&self) -> &'a str {
        self.part
    }
}

/// Value of the attribute with the given local name.
pub(crate) fn attr(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn prefix_of(e: &BytesStart) -> String {
    e.name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
        .unwrap_or_default()
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// Read a `w:p` element. `start` is the offset of its start tag, which has
/// just been consumed from `cursor`.
pub(crate) fn read_paragraph(
    cursor: &mut XmlCursor<'_>,
    start: usize,
    e: &BytesStart,
    empty: bool,
) -> Result<Paragraph> {
    let prefix = prefix_of(e);
    let open = cursor.slice(start, cursor.position());

    if empty {
        let close = format!("</{}>", qualified(&prefix, "p"));
        let open = format!("{}>", open.trim_end_matches("/>").trim_end());
        return Ok(Paragraph {
            runs: Vec::new(),
            markup: ParagraphMarkup {
                prefix,
                open,
                properties: String::new(),
                close,
            },
        });
    }

    let mut markup = ParagraphMarkup {
        prefix,
        open: open.to_string(),
        properties: String::new(),
        close: String::new(),
    };
    let mut runs = Vec::new();

    loop {
        let before = cursor.position();
        match cursor.next_event()? {
            Event::Start(child) => {
                cursor.skip_element()?;
                let raw = cursor.slice(before, cursor.position());
                read_paragraph_child(&child, raw, &mut markup, &mut runs, cursor.part())?;
            }
            Event::Empty(child) => {
                let raw = cursor.slice(before, cursor.position());
                read_paragraph_child(&child, raw, &mut markup, &mut runs, cursor.part())?;
            }
            Event::End(_) => {
                markup.close = cursor.slice(before, cursor.position()).to_string();
                break;
            }
            Event::Eof => return Err(Error::xml(cursor.part(), "unterminated paragraph")),
            // Inter-element whitespace and comments carry no content.
            _ => {}
        }
    }

    Ok(Paragraph { runs, markup })
}

fn read_paragraph_child(
    child: &BytesStart,
    raw: &str,
    markup: &mut ParagraphMarkup,
    runs: &mut Vec<Run>,
    part: &str,
) -> Result<()> {
    match child.local_name().as_ref() {
        b"pPr" => markup.properties = raw.to_string(),
        b"r" => runs.push(parse_run(raw, part)?),
        // Hyperlinks, bookmarks, fields and tracked changes travel as
        // opaque text-less runs.
        _ => runs.push(Run::from_source(
            String::new(),
            RunFormat::default(),
            raw.to_string(),
        )),
    }
    Ok(())
}

/// Text stand-in for `<w:br w:type="page"/>`.
pub(crate) const PAGE_BREAK: char = '\u{c}';

/// Text stand-in for `<w:br w:type="column"/>`.
pub(crate) const COLUMN_BREAK: char = '\u{b}';

/// Parse one `w:r` element from its source text.
pub(crate) fn parse_run(raw: &str, part: &str) -> Result<Run> {
    let mut cursor = XmlCursor::new(raw, part);
    let mut text = String::new();
    let mut format = RunFormat::default();
    let mut depth = 0usize;
    let mut in_props = false;
    let mut in_text = false;

    loop {
        match cursor.next_event()? {
            Event::Start(e) => {
                depth += 1;
                match (depth, e.local_name().as_ref()) {
                    (2, b"rPr") => in_props = true,
                    (2, b"t") => in_text = true,
                    (3, _) if in_props => apply_property(&mut format, &e),
                    _ => {}
                }
            }
            Event::Empty(e) => match (depth + 1, e.local_name().as_ref()) {
                (2, b"tab") => text.push('\t'),
                (2, b"br") => text.push(match attr(&e, b"type").as_deref() {
                    Some("page") => PAGE_BREAK,
                    Some("column") => COLUMN_BREAK,
                    _ => '\n',
                }),
                (2, b"cr") => text.push('\n'),
                (3, _) if in_props => apply_property(&mut format, &e),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let unescaped = t.unescape().map_err(|e| Error::xml(part, e))?;
                text.push_str(&unescaped);
            }
            Event::CData(c) if in_text => text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(_) => {
                if depth == 2 {
                    in_props = false;
                    in_text = false;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(Run::from_source(text, format, raw.to_string()))
}

fn apply_property(format: &mut RunFormat, e: &BytesStart) {
    let val = attr(e, b"val");
    match e.local_name().as_ref() {
        b"b" => format.bold = Some(toggle(val.as_deref())),
        b"i" => format.italic = Some(toggle(val.as_deref())),
        b"u" => format.underline = Some(val.as_deref() != Some("none")),
        b"sz" => format.font_size = val.and_then(|v| v.parse().ok()).map(FontSize),
        b"color" => format.color = val.as_deref().and_then(RgbColor::from_hex),
        b"rFonts" => format.font_name = attr(e, b"ascii"),
        b"highlight" => format.highlight = val.as_deref().and_then(HighlightColor::from_val),
        _ => {}
    }
}

/// ST_OnOff: absent value means on.
fn toggle(val: Option<&str>) -> bool {
    !matches!(val, Some("0") | Some("false") | Some("off"))
}

/// Header and footer references of a `w:sectPr` fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SectionRefs {
    /// Relationship id of the default header
    pub header: Option<String>,
    /// Relationship id of the default footer
    pub footer: Option<String>,
}

/// Collect default header/footer references from markup containing a `w:sectPr`.
pub(crate) fn section_refs(xml: &str, part: &str) -> Result<SectionRefs> {
    let mut cursor = XmlCursor::new(xml, part);
    let mut refs = SectionRefs::default();

    loop {
        match cursor.next_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let kind = attr(&e, b"type");
                if kind.as_deref().unwrap_or("default") != "default" {
                    continue;
                }
                match e.local_name().as_ref() {
                    b"headerReference" => refs.header = attr(&e, b"id"),
                    b"footerReference" => refs.footer = attr(&e, b"id"),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(refs)
}

/// Append the XML of a paragraph.
pub(crate) fn write_paragraph(out: &mut String, paragraph: &Paragraph) {
    let markup = &paragraph.markup;
    if paragraph.runs.is_empty() && markup.properties.is_empty() {
        out.push_str(markup.open.trim_end_matches('>'));
        out.push_str("/>");
        return;
    }
    out.push_str(&markup.open);
    out.push_str(&markup.properties);
    for run in &paragraph.runs {
        match run.verbatim_source() {
            Some(xml) => out.push_str(xml),
            None => write_run(out, &markup.prefix, run),
        }
    }
    out.push_str(&markup.close);
}

/// Append the XML of a run built from its text and formatting.
pub(crate) fn write_run(out: &mut String, prefix: &str, run: &Run) {
    let w = |local: &str| qualified(prefix, local);

    out.push_str(&format!("<{}>", w("r")));
    write_run_properties(out, prefix, &run.format);

    let mut pending = String::new();
    for ch in run.text.chars() {
        match ch {
            '\t' => {
                flush_text(out, prefix, &mut pending);
                out.push_str(&format!("<{}/>", w("tab")));
            }
            '\n' => {
                flush_text(out, prefix, &mut pending);
                out.push_str(&format!("<{}/>", w("br")));
            }
            PAGE_BREAK => {
                flush_text(out, prefix, &mut pending);
                out.push_str(&format!("<{} {}=\"page\"/>", w("br"), w("type")));
            }
            COLUMN_BREAK => {
                flush_text(out, prefix, &mut pending);
                out.push_str(&format!("<{} {}=\"column\"/>", w("br"), w("type")));
            }
            '\r' => {}
            _ => pending.push(ch),
        }
    }
    flush_text(out, prefix, &mut pending);

    out.push_str(&format!("</{}>", w("r")));
}

fn flush_text(out: &mut String, prefix: &str, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let t = qualified(prefix, "t");
    out.push_str(&format!(
        "<{} xml:space=\"preserve\">{}</{}>",
        t,
        escape(pending.as_str()),
        t
    ));
    pending.clear();
}

fn write_run_properties(out: &mut String, prefix: &str, format: &RunFormat) {
    if format.is_empty() {
        return;
    }
    let w = |local: &str| qualified(prefix, local);
    let val = w("val");

    out.push_str(&format!("<{}>", w("rPr")));
    // CT_RPr element order
    if let Some(ref name) = format.font_name {
        let name = escape(name.as_str());
        out.push_str(&format!(
            "<{} {}=\"{}\" {}=\"{}\"/>",
            w("rFonts"),
            w("ascii"),
            name,
            w("hAnsi"),
            name
        ));
    }
    if let Some(bold) = format.bold {
        write_toggle(out, &w("b"), &val, bold);
    }
    if let Some(italic) = format.italic {
        write_toggle(out, &w("i"), &val, italic);
    }
    if let Some(color) = format.color {
        out.push_str(&format!("<{} {}=\"{}\"/>", w("color"), val, color.to_hex()));
    }
    if let Some(size) = format.font_size {
        out.push_str(&format!("<{} {}=\"{}\"/>", w("sz"), val, size.half_points()));
    }
    if let Some(highlight) = format.highlight {
        out.push_str(&format!("<{} {}=\"{}\"/>", w("highlight"), val, highlight.as_val()));
    }
    if let Some(underline) = format.underline {
        let style = if underline { "single" } else { "none" };
        out.push_str(&format!("<{} {}=\"{}\"/>", w("u"), val, style));
    }
    out.push_str(&format!("</{}>", w("rPr")));
}

fn write_toggle(out: &mut String, tag: &str, val: &str, on: bool) {
    if on {
        out.push_str(&format!("<{}/>", tag));
    } else {
        out.push_str(&format!("<{} {}=\"0\"/>", tag, val));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_paragraph(xml: &str) -> Paragraph {
        let mut cursor = XmlCursor::new(xml, "test.xml");
        loop {
            let before = cursor.position();
            match cursor.next_event().unwrap() {
                Event::Start(e) if e.local_name().as_ref() == b"p" => {
                    return read_paragraph(&mut cursor, before, &e, false).unwrap();
                }
                Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                    return read_paragraph(&mut cursor, before, &e, true).unwrap();
                }
                Event::Eof => panic!("no paragraph"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_parse_run_text_and_format() {
        let raw = r#"<w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:b/><w:i w:val="0"/><w:color w:val="FF0000"/><w:sz w:val="28"/><w:highlight w:val="yellow"/><w:u w:val="double"/></w:rPr><w:t xml:space="preserve">A &amp; B</w:t><w:tab/><w:t>C</w:t></w:r>"#;
        let run = parse_run(raw, "test.xml").unwrap();

        assert_eq!(run.text, "A & B\tC");
        assert_eq!(run.format.bold, Some(true));
        assert_eq!(run.format.italic, Some(false));
        assert_eq!(run.format.underline, Some(true));
        assert_eq!(run.format.font_size, Some(FontSize(28)));
        assert_eq!(run.format.color, Some(RgbColor::new(255, 0, 0)));
        assert_eq!(run.format.font_name.as_deref(), Some("Arial"));
        assert_eq!(run.format.highlight, Some(HighlightColor::Yellow));
        assert!(run.is_verbatim());
    }

    #[test]
    fn test_parse_run_ignores_textbox_text() {
        let raw = r#"<w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r>"#;
        let run = parse_run(raw, "test.xml").unwrap();
        assert!(run.text.is_empty());
        assert!(run.is_structural());
    }

    #[test]
    fn test_parse_break_run_is_structural() {
        let run = parse_run("<w:r><w:br/></w:r>", "test.xml").unwrap();
        assert_eq!(run.text, "\n");
        assert!(run.is_structural());
    }

    #[test]
    fn test_read_paragraph_children() {
        let xml = r#"<w:body><w:p w:rsidR="00AB"><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>Hello</w:t></w:r><w:bookmarkStart w:id="0" w:name="x"/><w:hyperlink r:id="rId9"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p></w:body>"#;
        let p = first_paragraph(xml);

        assert_eq!(p.markup.open, r#"<w:p w:rsidR="00AB">"#);
        assert_eq!(p.markup.properties, r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#);
        assert_eq!(p.markup.close, "</w:p>");
        assert_eq!(p.runs.len(), 3);
        assert_eq!(p.text(), "Hello");
        assert!(p.runs[2].is_structural());
    }

    #[test]
    fn test_read_empty_paragraph() {
        let p = first_paragraph(r#"<w:body><w:p w:rsidR="01"/></w:body>"#);
        assert!(p.runs.is_empty());
        assert_eq!(p.markup.open, r#"<w:p w:rsidR="01">"#);
        assert_eq!(p.markup.close, "</w:p>");

        let mut out = String::new();
        write_paragraph(&mut out, &p);
        assert_eq!(out, r#"<w:p w:rsidR="01"/>"#);
    }

    #[test]
    fn test_write_paragraph_keeps_source_runs() {
        let xml = r#"<w:body><w:p><w:r><w:t>Hi</w:t></w:r><w:r><w:br/></w:r></w:p></w:body>"#;
        let p = first_paragraph(xml);
        let mut out = String::new();
        write_paragraph(&mut out, &p);
        assert_eq!(out, "<w:p><w:r><w:t>Hi</w:t></w:r><w:r><w:br/></w:r></w:p>");
    }

    #[test]
    fn test_edited_source_run_is_rendered_from_model() {
        let xml = r#"<w:body><w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>world</w:t></w:r></w:p></w:body>"#;
        let mut p = first_paragraph(xml);
        p.runs[0].text = "Edited ".to_string();
        p.runs[1].format = RunFormat::default();
        assert!(!p.runs[0].is_verbatim());
        assert!(!p.runs[1].is_verbatim());

        let mut out = String::new();
        write_paragraph(&mut out, &p);
        assert_eq!(
            out,
            r#"<w:p><w:r><w:t xml:space="preserve">Edited </w:t></w:r><w:r><w:t xml:space="preserve">world</w:t></w:r></w:p>"#
        );

        // Restoring the parsed values brings the source markup back.
        p.runs[1].format.bold = Some(true);
        assert!(p.runs[1].is_verbatim());
    }

    #[test]
    fn test_typed_breaks() {
        let raw = r#"<w:r><w:t>a</w:t><w:br w:type="page"/><w:t>b</w:t><w:br w:type="column"/><w:br w:type="textWrapping"/></w:r>"#;
        let run = parse_run(raw, "test.xml").unwrap();
        assert_eq!(run.text, format!("a{}b{}\n", PAGE_BREAK, COLUMN_BREAK));
        assert!(parse_run(r#"<w:r><w:br w:type="page"/></w:r>"#, "test.xml")
            .unwrap()
            .is_structural());

        let mut out = String::new();
        write_run(&mut out, "w", &Run::new(run.text.clone()));
        assert_eq!(
            out,
            concat!(
                r#"<w:r><w:t xml:space="preserve">a</w:t><w:br w:type="page"/>"#,
                r#"<w:t xml:space="preserve">b</w:t><w:br w:type="column"/><w:br/></w:r>"#
            )
        );
    }

    #[test]
    fn test_write_run_from_format() {
        let run = Run::with_format(
            "a<b\tc\n",
            RunFormat {
                bold: Some(true),
                italic: Some(false),
                underline: Some(true),
                font_size: Some(FontSize(24)),
                color: Some(RgbColor::new(0, 0x80, 0xFF)),
                font_name: Some("Times New Roman".into()),
                highlight: Some(HighlightColor::Green),
            },
        );
        let mut out = String::new();
        write_run(&mut out, "w", &run);

        assert_eq!(
            out,
            concat!(
                "<w:r><w:rPr>",
                r#"<w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman"/>"#,
                r#"<w:b/><w:i w:val="0"/><w:color w:val="0080FF"/><w:sz w:val="24"/>"#,
                r#"<w:highlight w:val="green"/><w:u w:val="single"/>"#,
                "</w:rPr>",
                r#"<w:t xml:space="preserve">a&lt;b</w:t><w:tab/><w:t xml:space="preserve">c</w:t><w:br/>"#,
                "</w:r>"
            )
        );

        let reparsed = parse_run(&out, "test.xml").unwrap();
        assert_eq!(reparsed, run);
    }

    #[test]
    fn test_section_refs_default_only() {
        let xml = r#"<w:sectPr><w:headerReference w:type="first" r:id="rId1"/><w:headerReference w:type="default" r:id="rId2"/><w:footerReference r:id="rId3"/></w:sectPr>"#;
        let refs = section_refs(xml, "test.xml").unwrap();
        assert_eq!(refs.header.as_deref(), Some("rId2"));
        assert_eq!(refs.footer.as_deref(), Some("rId3"));
    }
}
