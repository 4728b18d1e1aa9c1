//! Paragraph and document translation.
//!
//! [`translate_paragraph`] merges the text runs of one paragraph, sends
//! them to a [`Translator`] in one call and rebuilds the paragraph around
//! the result. [`translate_document`] does this for every text-bearing
//! paragraph of a [`Document`](crate::Document) on a bounded worker pool.

mod collector;
#[cfg(feature = "google")]
mod google;
mod lang;
mod options;
mod runs;
mod script;
mod service;

pub use collector::{collect_fragments, translate_document, TranslationEvent, TranslationSummary};
#[cfg(feature = "google")]
pub use google::{GoogleConfig, GoogleTranslator, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use lang::{service_lang_code, validate_lang_code};
pub use options::{FailurePolicy, RunLayout, TranslateOptions, DEFAULT_CONCURRENCY};
pub use runs::{
    normalize_trailing_space, translate_paragraph, translate_paragraph_outcome, ParagraphOutcome,
};
pub use script::{to_latin, ScriptVariant};
pub use service::Translator;
