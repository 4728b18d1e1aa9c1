//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A paragraph: an ordered sequence of runs.
///
/// Concatenating the run texts in order yields the visible text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Runs in document order
    pub runs: Vec<Run>,

    /// Original paragraph markup, kept for serialization
    #[serde(skip)]
    pub(crate) markup: ParagraphMarkup,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a single unformatted run.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::from_runs(vec![Run::new(text)])
    }

    /// Create a paragraph from runs.
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            markup: ParagraphMarkup::default(),
        }
    }

    /// Append a run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Replace the whole run sequence in one assignment.
    pub fn set_runs(&mut self, runs: Vec<Run>) {
        self.runs = runs;
    }

    /// Visible text of the paragraph.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the paragraph has no non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(Run::is_structural)
    }

    /// Number of runs.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

/// Serialized pieces of a `w:p` element that the model does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParagraphMarkup {
    /// Namespace prefix of the WordprocessingML elements (usually `w`)
    pub prefix: String,
    /// Opening tag including attributes
    pub open: String,
    /// Raw `w:pPr` element, empty when absent
    pub properties: String,
    /// Closing tag
    pub close: String,
}

impl Default for ParagraphMarkup {
    fn default() -> Self {
        Self {
            prefix: "w".to_string(),
            open: "<w:p>".to_string(),
            properties: String::new(),
            close: "</w:p>".to_string(),
        }
    }
}

/// A unit of text sharing one formatting profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    /// Text content; tabs are `\t`, line breaks are `\n`, page breaks are
    /// `\u{c}` and column breaks are `\u{b}`
    pub text: String,

    /// Character formatting
    pub format: RunFormat,

    /// Original element markup for runs read from a package
    #[serde(skip)]
    pub(crate) source: Option<RunSource>,
}

/// Markup of a run as read, with the text and format parsed from it.
#[derive(Debug, Clone)]
pub(crate) struct RunSource {
    xml: String,
    text: String,
    format: RunFormat,
}

impl Run {
    /// Create an unformatted run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: RunFormat::default(),
            source: None,
        }
    }

    /// Create a run with the given formatting.
    pub fn with_format(text: impl Into<String>, format: RunFormat) -> Self {
        Self {
            text: text.into(),
            format,
            source: None,
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::with_format(
            text,
            RunFormat {
                bold: Some(true),
                ..Default::default()
            },
        )
    }

    /// Create an italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::with_format(
            text,
            RunFormat {
                italic: Some(true),
                ..Default::default()
            },
        )
    }

    /// Create a line-break run.
    pub fn line_break() -> Self {
        Self::new("\n")
    }

    pub(crate) fn from_source(text: String, format: RunFormat, xml: String) -> Self {
        Self {
            source: Some(RunSource {
                xml,
                text: text.clone(),
                format: format.clone(),
            }),
            text,
            format,
        }
    }

    /// Source markup, if the text and format still match what was read.
    pub(crate) fn verbatim_source(&self) -> Option<&str> {
        self.source
            .as_ref()
            .filter(|source| source.text == self.text && source.format == self.format)
            .map(|source| source.xml.as_str())
    }

    /// A structural run carries no non-whitespace text and is never translated.
    pub fn is_structural(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether the run was read from a package and will be written back verbatim.
    ///
    /// Editing the text or format of a loaded run turns this off; the run is
    /// then rendered from the model.
    pub fn is_verbatim(&self) -> bool {
        self.verbatim_source().is_some()
    }
}

impl PartialEq for Run {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.format == other.format
    }
}

/// Character formatting of a run.
///
/// `None` means "inherited from the style hierarchy".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFormat {
    /// Bold
    pub bold: Option<bool>,

    /// Italic
    pub italic: Option<bool>,

    /// Underline (any underline style reads as `true`)
    pub underline: Option<bool>,

    /// Font size
    pub font_size: Option<FontSize>,

    /// Font color
    pub color: Option<RgbColor>,

    /// Font family (ASCII slot)
    pub font_name: Option<String>,

    /// Highlight color
    pub highlight: Option<HighlightColor>,
}

impl RunFormat {
    /// Check if any property is set.
    pub fn is_empty(&self) -> bool {
        *self == RunFormat::default()
    }
}

/// Font size stored in half points, as WordprocessingML does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FontSize(pub u32);

impl FontSize {
    /// Create a size from points, rounded to the nearest half point.
    pub fn from_points(points: f32) -> Self {
        FontSize((points * 2.0).round().max(0.0) as u32)
    }

    /// Size in half points.
    pub fn half_points(self) -> u32 {
        self.0
    }

    /// Size in points.
    pub fn points(self) -> f32 {
        self.0 as f32 / 2.0
    }
}

/// An RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl RgbColor {
    /// Create a new color.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a six-digit hex string such as `FF0000` or `#ff0000`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Upper-case hex representation without `#`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Highlight colors available in WordprocessingML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightColor {
    Black,
    Blue,
    Cyan,
    Green,
    Magenta,
    Red,
    Yellow,
    White,
    DarkBlue,
    DarkCyan,
    DarkGreen,
    DarkMagenta,
    DarkRed,
    DarkYellow,
    DarkGray,
    LightGray,
    /// Explicitly no highlight
    None,
}

impl HighlightColor {
    const ALL: [HighlightColor; 17] = [
        HighlightColor::Black,
        HighlightColor::Blue,
        HighlightColor::Cyan,
        HighlightColor::Green,
        HighlightColor::Magenta,
        HighlightColor::Red,
        HighlightColor::Yellow,
        HighlightColor::White,
        HighlightColor::DarkBlue,
        HighlightColor::DarkCyan,
        HighlightColor::DarkGreen,
        HighlightColor::DarkMagenta,
        HighlightColor::DarkRed,
        HighlightColor::DarkYellow,
        HighlightColor::DarkGray,
        HighlightColor::LightGray,
        HighlightColor::None,
    ];

    /// Parse a `w:highlight/@w:val` value.
    pub fn from_val(val: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_val() == val)
    }

    /// The `w:val` spelling.
    pub fn as_val(self) -> &'static str {
        match self {
            HighlightColor::Black => "black",
            HighlightColor::Blue => "blue",
            HighlightColor::Cyan => "cyan",
            HighlightColor::Green => "green",
            HighlightColor::Magenta => "magenta",
            HighlightColor::Red => "red",
            HighlightColor::Yellow => "yellow",
            HighlightColor::White => "white",
            HighlightColor::DarkBlue => "darkBlue",
            HighlightColor::DarkCyan => "darkCyan",
            HighlightColor::DarkGreen => "darkGreen",
            HighlightColor::DarkMagenta => "darkMagenta",
            HighlightColor::DarkRed => "darkRed",
            HighlightColor::DarkYellow => "darkYellow",
            HighlightColor::DarkGray => "darkGray",
            HighlightColor::LightGray => "lightGray",
            HighlightColor::None => "none",
        }
    }
}
