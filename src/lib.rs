//! # docxlate
//!
//! Translate Word (`.docx`) documents while keeping run formatting.
//!
//! Each text-bearing paragraph (body, table cells, headers and footers) is
//! translated as one unit: the text of its runs is merged, sent to a
//! [`Translator`] in a single call, and the paragraph is rebuilt as one
//! translated run carrying the formatting of its last text run. Spacing,
//! breaks and other text-less runs are kept. Everything the document model
//! does not cover is written back unchanged.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docxlate::{translate_file, GoogleTranslator};
//!
//! fn main() -> docxlate::Result<()> {
//!     let translator = GoogleTranslator::new()?;
//!     let summary = translate_file("report.docx", "report.fr.docx", "fr", &translator)?;
//!     println!("{} paragraphs translated", summary.translated);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Run merging**: one service call per paragraph, not per run
//! - **Formatting**: bold, italic, underline, size, color, font and highlight
//! - **Script variants**: `sr_Latn` output is transliterated to Latin script
//! - **Bounded concurrency**: paragraphs are translated on a Rayon pool
//! - **Lossless container**: untouched parts and markup are copied verbatim

pub mod detect;
pub mod error;
pub mod model;
pub mod translate;

mod package;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, DocxFormat};
pub use error::{Error, Result, TranslateError};
pub use model::{
    Document, FontSize, HeaderFooter, HighlightColor, Metadata, Paragraph, ParagraphLocation,
    RgbColor, Run, RunFormat, Section, Table, TableCell, TableRow,
};
#[cfg(feature = "google")]
pub use translate::{GoogleConfig, GoogleTranslator};
pub use translate::{
    collect_fragments, normalize_trailing_space, to_latin, translate_document,
    translate_paragraph, translate_paragraph_outcome, FailurePolicy, ParagraphOutcome, RunLayout,
    ScriptVariant, TranslateOptions, TranslationEvent, TranslationSummary, Translator,
};

use crossbeam_channel::Sender;
use std::path::Path;

/// Translate a `.docx` file and write the result to `output`.
///
/// # Arguments
///
/// * `input` - Path to the source document
/// * `output` - Path of the translated document
/// * `target_lang` - Target language code (`fr`, `de`, `sr_Latn`, ...)
/// * `translator` - Translation service
///
/// # Example
///
/// ```no_run
/// use docxlate::{translate_file, TranslateError};
///
/// let shout = |text: &str, _: &str| -> Result<String, TranslateError> {
///     Ok(text.to_uppercase())
/// };
/// translate_file("in.docx", "out.docx", "en", &shout).unwrap();
/// ```
pub fn translate_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    target_lang: &str,
    translator: &dyn Translator,
) -> Result<TranslationSummary> {
    translate_file_with_options(
        input,
        output,
        target_lang,
        translator,
        &TranslateOptions::default(),
    )
}

/// Translate a `.docx` file with custom options.
///
/// Empty paths and malformed language codes are rejected before any file
/// is touched.
///
/// # Example
///
/// ```no_run
/// use docxlate::{translate_file_with_options, GoogleTranslator, TranslateOptions};
///
/// let translator = GoogleTranslator::new().unwrap();
/// let options = TranslateOptions::new().with_concurrency(4).positional_runs();
/// translate_file_with_options("in.docx", "out.docx", "sr_Latn", &translator, &options).unwrap();
/// ```
pub fn translate_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    target_lang: &str,
    translator: &dyn Translator,
    options: &TranslateOptions,
) -> Result<TranslationSummary> {
    let (input, output) = (input.as_ref(), output.as_ref());
    check_paths(input, output)?;
    translate::validate_lang_code(target_lang)?;

    let mut doc = Document::open(input)?;
    let summary = translate_document(&mut doc, target_lang, translator, options)?;
    doc.save(output)?;
    Ok(summary)
}

/// Translate a `.docx` held in memory and return the new bytes.
///
/// # Example
///
/// ```no_run
/// use docxlate::{translate_bytes, TranslateError, TranslateOptions};
///
/// let data = std::fs::read("in.docx").unwrap();
/// let echo = |text: &str, _: &str| -> Result<String, TranslateError> { Ok(text.to_string()) };
/// let (bytes, _summary) = translate_bytes(&data, "de", &echo, &TranslateOptions::default()).unwrap();
/// std::fs::write("out.docx", bytes).unwrap();
/// ```
pub fn translate_bytes(
    data: &[u8],
    target_lang: &str,
    translator: &dyn Translator,
    options: &TranslateOptions,
) -> Result<(Vec<u8>, TranslationSummary)> {
    translate::validate_lang_code(target_lang)?;
    let mut doc = Document::from_bytes(data)?;
    let summary = translate_document(&mut doc, target_lang, translator, options)?;
    Ok((doc.to_bytes()?, summary))
}

/// Extract plain text from a `.docx` file.
///
/// # Example
///
/// ```no_run
/// let text = docxlate::extract_text("report.docx").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = Document::open(path)?;
    Ok(doc.plain_text())
}

fn check_paths(input: &Path, output: &Path) -> Result<()> {
    if input.as_os_str().is_empty() {
        return Err(Error::Config("input path is required".to_string()));
    }
    if output.as_os_str().is_empty() {
        return Err(Error::Config("output path is required".to_string()));
    }
    Ok(())
}

/// Builder for translating documents.
///
/// # Example
///
/// ```no_run
/// use docxlate::{Docxlate, GoogleTranslator};
///
/// let translator = GoogleTranslator::new()?;
/// let summary = Docxlate::new()
///     .with_concurrency(4)
///     .keep_source_on_error()
///     .translate_file("report.docx", "report.de.docx", "de", &translator)?;
/// println!("{} failed", summary.failed);
/// # Ok::<(), docxlate::Error>(())
/// ```
pub struct Docxlate {
    options: TranslateOptions,
}

impl Docxlate {
    /// Create a new Docxlate builder.
    pub fn new() -> Self {
        Self {
            options: TranslateOptions::default(),
        }
    }

    /// Set the number of concurrent translation calls.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.options = self.options.with_concurrency(concurrency);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Keep structural runs in their original positions.
    pub fn positional_runs(mut self) -> Self {
        self.options = self.options.positional_runs();
        self
    }

    /// Leave paragraphs untouched when their translation fails.
    pub fn keep_source_on_error(mut self) -> Self {
        self.options = self.options.keep_source_on_error();
        self
    }

    /// Report progress on a channel.
    pub fn with_progress(mut self, sender: Sender<TranslationEvent>) -> Self {
        self.options = self.options.with_progress(sender);
        self
    }

    /// Options this builder will use.
    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate a file and write the result.
    pub fn translate_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        target_lang: &str,
        translator: &dyn Translator,
    ) -> Result<TranslationSummary> {
        translate_file_with_options(input, output, target_lang, translator, &self.options)
    }

    /// Translate a document held in memory.
    pub fn translate_document(
        &self,
        doc: &mut Document,
        target_lang: &str,
        translator: &dyn Translator,
    ) -> Result<TranslationSummary> {
        translate_document(doc, target_lang, translator, &self.options)
    }

    /// Translate `.docx` bytes.
    pub fn translate_bytes(
        &self,
        data: &[u8],
        target_lang: &str,
        translator: &dyn Translator,
    ) -> Result<(Vec<u8>, TranslationSummary)> {
        translate_bytes(data, target_lang, translator, &self.options)
    }
}

impl Default for Docxlate {
    fn default() -> Self {
        Self::new()
    }
}
