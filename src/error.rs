//! Error types for docxlate.

use std::io;
use thiserror::Error;

/// Result type alias for docxlate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort loading, translating or saving a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip container could not be read or written.
    #[error("Zip container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A package part is not well-formed XML.
    #[error("XML error in {part}: {message}")]
    Xml {
        /// Part name inside the package
        part: String,
        /// Parser message
        message: String,
    },

    /// The input is not a WordprocessingML package.
    #[error("Unknown file format: not a valid DOCX package")]
    NotDocx,

    /// A part referenced by the package is absent.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Invalid or missing user input, raised before any I/O.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A translation service failure that was not recovered.
    #[error("Translation error: {0}")]
    Translation(#[from] TranslateError),
}

impl Error {
    pub(crate) fn xml(part: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Error::Xml {
            part: part.into(),
            message: err.to_string(),
        }
    }
}

/// Failure of a single translation call.
///
/// These never abort a document; the collector logs them per paragraph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Transport-level failure (DNS, TLS, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}")]
    Http {
        /// HTTP status code
        status: u16,
    },

    /// The service refused the call because of quota or rate limits.
    #[error("rate limit exceeded")]
    RateLimited,

    /// The response body could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Nothing to translate.
    #[error("empty input")]
    EmptyInput,
}

impl TranslateError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TranslateError::Network(_)
                | TranslateError::RateLimited
                | TranslateError::Http { status: 500..=599 }
        )
    }
}
