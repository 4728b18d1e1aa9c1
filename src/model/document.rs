//! Document-level types.

use super::{Paragraph, Table};
use crate::error::{Error, Result};
use crate::package::{self, Package};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// A WordprocessingML document.
///
/// Owned by the caller; translation only mutates paragraphs in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Core properties (title, author, dates)
    pub metadata: Metadata,

    /// Top-level body paragraphs in document order
    pub paragraphs: Vec<Paragraph>,

    /// Top-level tables in document order
    pub tables: Vec<Table>,

    /// Sections in document order
    pub sections: Vec<Section>,

    /// Source package, used to write unmodeled content back unchanged
    #[serde(skip)]
    pub(crate) package: Option<Package>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document from a `.docx` file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docxlate::Document;
    ///
    /// let doc = Document::open("report.docx")?;
    /// println!("{} paragraphs", doc.paragraphs.len());
    /// # Ok::<(), docxlate::Error>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Load a document from the bytes of a `.docx` file.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        package::read_document(data)
    }

    /// Load a document from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Serialize the document to a `.docx` file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = self.to_bytes()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Serialize the document to `.docx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        package::write_document(self)
    }

    /// Serialize the model (without package internals) to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| Error::Config(format!("JSON serialization failed: {}", e)))
    }

    /// Add a body paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Add a table.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Add a section.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Whether the document was loaded from a package.
    pub fn has_package(&self) -> bool {
        self.package.is_some()
    }

    /// Look up a paragraph by location.
    pub fn paragraph(&self, location: &ParagraphLocation) -> Option<&Paragraph> {
        match *location {
            ParagraphLocation::Body(i) => self.paragraphs.get(i),
            ParagraphLocation::Cell {
                table,
                row,
                cell,
                paragraph,
            } => self
                .tables
                .get(table)?
                .rows
                .get(row)?
                .cells
                .get(cell)?
                .paragraphs
                .get(paragraph),
            ParagraphLocation::Header { section, paragraph } => self
                .sections
                .get(section)?
                .header
                .as_ref()?
                .paragraphs
                .get(paragraph),
            ParagraphLocation::Footer { section, paragraph } => self
                .sections
                .get(section)?
                .footer
                .as_ref()?
                .paragraphs
                .get(paragraph),
        }
    }

    /// Look up a paragraph by location for mutation.
    pub fn paragraph_mut(&mut self, location: &ParagraphLocation) -> Option<&mut Paragraph> {
        match *location {
            ParagraphLocation::Body(i) => self.paragraphs.get_mut(i),
            ParagraphLocation::Cell {
                table,
                row,
                cell,
                paragraph,
            } => self
                .tables
                .get_mut(table)?
                .rows
                .get_mut(row)?
                .cells
                .get_mut(cell)?
                .paragraphs
                .get_mut(paragraph),
            ParagraphLocation::Header { section, paragraph } => self
                .sections
                .get_mut(section)?
                .header
                .as_mut()?
                .paragraphs
                .get_mut(paragraph),
            ParagraphLocation::Footer { section, paragraph } => self
                .sections
                .get_mut(section)?
                .footer
                .as_mut()?
                .paragraphs
                .get_mut(paragraph),
        }
    }

    /// Get plain text of body paragraphs and tables.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .chain(self.tables.iter().map(|t| t.plain_text()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A document section with its default header and footer.
///
/// A section without its own header (linked to the previous section)
/// has `header: None`, so each header part is owned exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Section {
    /// Default header
    pub header: Option<HeaderFooter>,

    /// Default footer
    pub footer: Option<HeaderFooter>,
}

impl Section {
    /// Create a section without header or footer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header.
    pub fn with_header(mut self, header: HeaderFooter) -> Self {
        self.header = Some(header);
        self
    }

    /// Set the footer.
    pub fn with_footer(mut self, footer: HeaderFooter) -> Self {
        self.footer = Some(footer);
        self
    }
}

/// Header or footer content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderFooter {
    /// Paragraphs directly inside the header or footer
    pub paragraphs: Vec<Paragraph>,

    /// Package part this content was read from
    #[serde(skip)]
    pub(crate) part: Option<String>,
}

impl HeaderFooter {
    /// Create header/footer content from paragraphs.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            part: None,
        }
    }

    /// Create header/footer content with one line of text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![Paragraph::with_text(text)])
    }

    /// Package part name, when read from a file.
    pub fn part_name(&self) -> Option<&str> {
        self.part.as_deref()
    }
}

/// Address of a paragraph inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphLocation {
    /// Top-level body paragraph
    Body(usize),
    /// Paragraph inside a table cell
    Cell {
        /// Table index
        table: usize,
        /// Row index
        row: usize,
        /// Cell index within the row
        cell: usize,
        /// Paragraph index within the cell
        paragraph: usize,
    },
    /// Paragraph in a section's header
    Header {
        /// Section index
        section: usize,
        /// Paragraph index within the header
        paragraph: usize,
    },
    /// Paragraph in a section's footer
    Footer {
        /// Section index
        section: usize,
        /// Paragraph index within the footer
        paragraph: usize,
    },
}

impl fmt::Display for ParagraphLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParagraphLocation::Body(i) => write!(f, "body[{}]", i),
            ParagraphLocation::Cell {
                table,
                row,
                cell,
                paragraph,
            } => write!(f, "table[{}].row[{}].cell[{}][{}]", table, row, cell, paragraph),
            ParagraphLocation::Header { section, paragraph } => {
                write!(f, "section[{}].header[{}]", section, paragraph)
            }
            ParagraphLocation::Footer { section, paragraph } => {
                write!(f, "section[{}].footer[{}]", section, paragraph)
            }
        }
    }
}

/// Document core properties (`docProps/core.xml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Document author
    pub creator: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// Last editor
    pub last_modified_by: Option<String>,

    /// Declared content language
    pub language: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}
