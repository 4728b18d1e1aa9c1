//! DOCX package reading and writing.
//!
//! A loaded package keeps every part. Story parts (the main document and
//! the headers/footers the model claims) are split into raw segments and
//! paragraph slots; on save the slots are rendered from the [`Document`]
//! and all other bytes are written back as they were read.
//!
//! [`Document`]: crate::Document

mod props;
mod reader;
mod rels;
mod story;
mod writer;
mod xml;

pub(crate) use reader::read_document;
pub(crate) use writer::write_document;

use crate::model::ParagraphLocation;
use zip::CompressionMethod;

/// Opaque package carried by a loaded document.
#[derive(Debug, Clone, Default)]
pub(crate) struct Package {
    /// Entries in their original archive order
    pub parts: Vec<PartEntry>,
}

impl Package {
    pub(crate) fn story_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p.content, PartContent::Story(_)))
            .count()
    }
}

/// One archive entry.
#[derive(Debug, Clone)]
pub(crate) struct PartEntry {
    pub name: String,
    pub compression: CompressionMethod,
    pub content: PartContent,
}

#[derive(Debug, Clone)]
pub(crate) enum PartContent {
    /// Bytes copied unchanged
    Binary(Vec<u8>),
    /// Story template rendered from the document on save
    Story(Vec<Segment>),
    Directory,
}

/// Piece of a story template.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    /// Source text copied unchanged
    Raw(String),
    /// Slot filled with the paragraph at this location
    Paragraph(ParagraphLocation),
}
