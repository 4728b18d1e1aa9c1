//! Translation service abstraction.

use crate::error::TranslateError;

/// A translation service.
///
/// One instance is shared by every concurrently processed paragraph, so
/// implementations must be safe to call from several threads at once.
///
/// Closures with the matching signature implement the trait:
///
/// ```
/// use docxlate::{TranslateError, Translator};
///
/// let upper = |text: &str, _lang: &str| -> Result<String, TranslateError> {
///     Ok(text.to_uppercase())
/// };
/// assert_eq!(upper.translate("hi", "en").unwrap(), "HI");
/// ```
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_lang`.
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError>;

    /// Short service name for logs.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Translator for F
where
    F: Fn(&str, &str) -> Result<String, TranslateError> + Send + Sync,
{
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        self(text, target_lang)
    }
}
