//! Document model for WordprocessingML content.
//!
//! The model covers what translation needs: body paragraphs, tables,
//! section headers and footers, and the runs inside each paragraph.
//! Everything else in the package is carried opaquely and written back
//! unchanged.

mod document;
mod paragraph;
mod table;

pub use document::{Document, HeaderFooter, Metadata, ParagraphLocation, Section};
pub(crate) use paragraph::ParagraphMarkup;
pub use paragraph::{FontSize, HighlightColor, Paragraph, RgbColor, Run, RunFormat};
pub use table::{Table, TableCell, TableRow};
