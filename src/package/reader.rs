//! DOCX package reader.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use zip::{CompressionMethod, ZipArchive};

use super::props::{parse_core, CORE_PART};
use super::rels::{
    rels_part_for, resolve_target, Relationships, CORE_PROPERTIES, OFFICE_DOCUMENT,
};
use super::story::{scan_story, StoryKind};
use super::{Package, PartContent, PartEntry, Segment};
use crate::detect::{format_from_content_types, is_zip_bytes, CONTENT_TYPES_PART};
use crate::error::{Error, Result};
use crate::model::{Document, HeaderFooter, Metadata, ParagraphLocation, Section};

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const ROOT_RELS: &str = "_rels/.rels";
const BOM: char = '\u{feff}';

/// Raw archive entry before classification.
struct RawEntry {
    name: String,
    compression: CompressionMethod,
    /// `None` for directory entries
    data: Option<Vec<u8>>,
}

struct Archive {
    entries: Vec<RawEntry>,
}

impl Archive {
    fn read(data: &[u8]) -> Result<Self> {
        let mut zip = ZipArchive::new(Cursor::new(data))?;
        let mut entries = Vec::with_capacity(zip.len());

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let name = file.name().to_string();
            let compression = file.compression();
            if file.is_dir() {
                entries.push(RawEntry {
                    name,
                    compression,
                    data: None,
                });
                continue;
            }
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)?;
            entries.push(RawEntry {
                name,
                compression,
                data: Some(buf),
            });
        }

        Ok(Self { entries })
    }

    fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.data.as_deref())
    }

    /// Part content as UTF-8 text, if the part exists.
    fn text(&self, name: &str) -> Result<Option<&str>> {
        match self.bytes(name) {
            Some(bytes) => std::str::from_utf8(bytes)
                .map(Some)
                .map_err(|e| Error::xml(name, e)),
            None => Ok(None),
        }
    }
}

/// Load a document from the bytes of a `.docx` package.
pub(crate) fn read_document(data: &[u8]) -> Result<Document> {
    if !is_zip_bytes(data) {
        return Err(Error::NotDocx);
    }
    let archive = Archive::read(data)?;
    // A zip without a WordprocessingML main part is some other format.
    let content_types = archive.text(CONTENT_TYPES_PART)?.ok_or(Error::NotDocx)?;
    if format_from_content_types(content_types).is_none() {
        return Err(Error::NotDocx);
    }

    let root_rels = match archive.text(ROOT_RELS)? {
        Some(xml) => Relationships::parse(xml, ROOT_RELS)?,
        None => Relationships::default(),
    };

    let main_part = root_rels
        .first_of_type(OFFICE_DOCUMENT)
        .map(|r| resolve_target("", &r.target))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
    let main_xml = archive
        .text(&main_part)?
        .ok_or_else(|| Error::MissingPart(main_part.clone()))?;

    let (bom, body) = split_bom(main_xml);
    let story = scan_story(body, &main_part, StoryKind::Main)?;
    let mut templates: HashMap<String, Vec<Segment>> = HashMap::new();
    templates.insert(main_part.clone(), with_bom(bom, story.segments));

    let doc_rels_part = rels_part_for(&main_part);
    let doc_rels = match archive.text(&doc_rels_part)? {
        Some(xml) => Relationships::parse(xml, &doc_rels_part)?,
        None => Relationships::default(),
    };

    let mut loader = PartLoader {
        archive: &archive,
        rels: &doc_rels,
        main_part: &main_part,
        templates: &mut templates,
    };
    let mut sections = Vec::with_capacity(story.sections.len());
    for (index, refs) in story.sections.iter().enumerate() {
        let mut section = Section::new();
        if let Some(id) = &refs.header {
            section.header = loader.load(id, |paragraph| ParagraphLocation::Header {
                section: index,
                paragraph,
            })?;
        }
        if let Some(id) = &refs.footer {
            section.footer = loader.load(id, |paragraph| ParagraphLocation::Footer {
                section: index,
                paragraph,
            })?;
        }
        sections.push(section);
    }

    let metadata = read_metadata(&archive, &root_rels);

    let parts = archive
        .entries
        .into_iter()
        .map(|entry| {
            let content = match (templates.remove(&entry.name), entry.data) {
                (Some(segments), _) => PartContent::Story(segments),
                (None, Some(bytes)) => PartContent::Binary(bytes),
                (None, None) => PartContent::Directory,
            };
            PartEntry {
                name: entry.name,
                compression: entry.compression,
                content,
            }
        })
        .collect();

    log::debug!(
        "Loaded {}: {} paragraphs, {} tables, {} sections",
        main_part,
        story.paragraphs.len(),
        story.tables.len(),
        sections.len()
    );

    Ok(Document {
        metadata,
        paragraphs: story.paragraphs,
        tables: story.tables,
        sections,
        package: Some(Package { parts }),
    })
}

/// Loads header and footer parts referenced from the main document.
struct PartLoader<'a> {
    archive: &'a Archive,
    rels: &'a Relationships,
    main_part: &'a str,
    templates: &'a mut HashMap<String, Vec<Segment>>,
}

impl PartLoader<'_> {
    /// Load the part behind relationship `id`.
    ///
    /// A part already claimed by an earlier section yields `None`.
    fn load(
        &mut self,
        id: &str,
        locate: impl Fn(usize) -> ParagraphLocation,
    ) -> Result<Option<HeaderFooter>> {
        let Some(rel) = self.rels.by_id(id) else {
            log::warn!("Unresolved header/footer reference {}", id);
            return Ok(None);
        };
        let part = resolve_target(self.main_part, &rel.target);
        if self.templates.contains_key(&part) {
            return Ok(None);
        }
        let Some(xml) = self.archive.text(&part)? else {
            log::warn!("Header/footer part {} is missing", part);
            return Ok(None);
        };

        let (bom, body) = split_bom(xml);
        let story = scan_story(body, &part, StoryKind::HeaderFooter)?;
        let segments = story
            .segments
            .into_iter()
            .map(|segment| match segment {
                Segment::Paragraph(ParagraphLocation::Body(i)) => Segment::Paragraph(locate(i)),
                other => other,
            })
            .collect();
        self.templates.insert(part.clone(), with_bom(bom, segments));

        Ok(Some(HeaderFooter {
            paragraphs: story.paragraphs,
            part: Some(part),
        }))
    }
}

fn read_metadata(archive: &Archive, root_rels: &Relationships) -> Metadata {
    let part = root_rels
        .first_of_type(CORE_PROPERTIES)
        .map(|r| resolve_target("", &r.target))
        .unwrap_or_else(|| CORE_PART.to_string());

    let parsed = archive
        .text(&part)
        .and_then(|xml| xml.map(|x| parse_core(x, &part)).transpose());
    match parsed {
        Ok(metadata) => metadata.unwrap_or_default(),
        Err(e) => {
            log::warn!("Ignoring unreadable core properties: {}", e);
            Metadata::default()
        }
    }
}

fn split_bom(xml: &str) -> (&str, &str) {
    match xml.strip_prefix(BOM) {
        Some(rest) => (&xml[..BOM.len_utf8()], rest),
        None => ("", xml),
    }
}

fn with_bom(bom: &str, mut segments: Vec<Segment>) -> Vec<Segment> {
    if !bom.is_empty() {
        segments.insert(0, Segment::Raw(bom.to_string()));
    }
    segments
}
