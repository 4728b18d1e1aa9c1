//! DOCX container detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// DOCX package information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Whether the main part is declared as macro-enabled (`.docm`)
    pub macro_enabled: bool,
    /// Whether the main part is a template (`.dotx` / `.dotm`)
    pub template: bool,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ext = match (self.template, self.macro_enabled) {
            (false, false) => "docx",
            (false, true) => "docm",
            (true, false) => "dotx",
            (true, true) => "dotm",
        };
        write!(f, "WordprocessingML ({})", ext)
    }
}

/// Local file header signature of a zip archive: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const MAIN_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml";
const MACRO_CONTENT_TYPE: &str = "application/vnd.ms-word.";

/// Detect a DOCX package from a file path.
///
/// # Example
/// ```no_run
/// use docxlate::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("report.docx").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    detect_format_from_bytes(&data)
}

/// Detect a DOCX package from the complete file content.
///
/// # Returns
/// * `Ok(DocxFormat)` if the data is a zip archive declaring a
///   WordprocessingML main document
/// * `Err(Error::NotDocx)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if !is_zip_bytes(data) {
        return Err(Error::NotDocx);
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(|_| Error::NotDocx)?;
    let mut content_types = String::new();
    archive
        .by_name(CONTENT_TYPES_PART)
        .map_err(|_| Error::NotDocx)?
        .read_to_string(&mut content_types)?;

    format_from_content_types(&content_types).ok_or(Error::NotDocx)
}

/// Inspect `[Content_Types].xml` for a WordprocessingML main part.
pub(crate) fn format_from_content_types(content_types: &str) -> Option<DocxFormat> {
    let main_declared = content_types.contains(&format!("{}.document.main+xml", MAIN_CONTENT_TYPE))
        || content_types.contains(&format!("{}.template.main+xml", MAIN_CONTENT_TYPE));
    let macro_declared = content_types.contains(&format!("{}document.macroEnabled", MACRO_CONTENT_TYPE))
        || content_types.contains(&format!("{}template.macroEnabledTemplate", MACRO_CONTENT_TYPE));

    if !main_declared && !macro_declared {
        return None;
    }

    Some(DocxFormat {
        macro_enabled: macro_declared,
        template: content_types.contains("template.main+xml")
            || content_types.contains("macroEnabledTemplate"),
    })
}

/// Check if a file is a DOCX package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start with a zip local file header.
pub fn is_zip_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCX_TYPES: &str = r#"<?xml version="1.0"?><Types><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    #[test]
    fn test_detect_not_zip() {
        let result = detect_format_from_bytes(b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::NotDocx)));
    }

    #[test]
    fn test_detect_truncated_zip() {
        let result = detect_format_from_bytes(b"PK\x03\x04garbage");
        assert!(matches!(result, Err(Error::NotDocx)));
    }

    #[test]
    fn test_is_zip_bytes() {
        assert!(is_zip_bytes(b"PK\x03\x04rest"));
        assert!(!is_zip_bytes(b"%PDF-1.7"));
        assert!(!is_zip_bytes(b""));
    }

    #[test]
    fn test_content_types_document() {
        let format = format_from_content_types(DOCX_TYPES).unwrap();
        assert!(!format.macro_enabled);
        assert!(!format.template);
        assert_eq!(format.to_string(), "WordprocessingML (docx)");
    }

    #[test]
    fn test_content_types_macro_enabled() {
        let types = r#"<Types><Override PartName="/word/document.xml" ContentType="application/vnd.ms-word.document.macroEnabled.main+xml"/></Types>"#;
        let format = format_from_content_types(types).unwrap();
        assert!(format.macro_enabled);
        assert_eq!(format.to_string(), "WordprocessingML (docm)");
    }

    #[test]
    fn test_content_types_spreadsheet() {
        let types = r#"<Types><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;
        assert!(format_from_content_types(types).is_none());
    }
}
