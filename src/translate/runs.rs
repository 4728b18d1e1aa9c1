//! Run merging, translation and paragraph rebuild.

use serde::Serialize;

use super::options::{FailurePolicy, RunLayout, TranslateOptions};
use super::script::ScriptVariant;
use super::service::Translator;
use crate::error::TranslateError;
use crate::model::{Paragraph, Run};

/// What happened to one paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum ParagraphOutcome {
    /// The paragraph now carries translated text
    Translated,
    /// Nothing to translate; the paragraph was not modified
    Unchanged,
    /// The service call failed; the failure policy decided the result
    Failed(#[serde(serialize_with = "serialize_error")] TranslateError),
}

impl ParagraphOutcome {
    /// Whether the translation call failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, ParagraphOutcome::Failed(_))
    }
}

fn serialize_error<S: serde::Serializer>(
    err: &TranslateError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// Translate one paragraph in place and return it.
///
/// The text of all non-blank runs is merged and sent to `translator` in a
/// single call. The result replaces those runs as one run carrying the
/// formatting of the last non-blank run; blank runs (spaces, breaks,
/// drawings) are kept. Failures are logged, never returned.
///
/// # Example
///
/// ```
/// use docxlate::{translate_paragraph, Paragraph, Run, TranslateError, TranslateOptions};
///
/// let mut paragraph = Paragraph::from_runs(vec![Run::new("Hello "), Run::new("world")]);
/// let translator = |text: &str, _: &str| -> Result<String, TranslateError> {
///     Ok(text.to_uppercase())
/// };
/// translate_paragraph(&mut paragraph, "fr", &translator, &TranslateOptions::default());
/// assert_eq!(paragraph.text(), "HELLO WORLD ");
/// ```
pub fn translate_paragraph<'p>(
    paragraph: &'p mut Paragraph,
    target_lang: &str,
    translator: &dyn Translator,
    options: &TranslateOptions,
) -> &'p mut Paragraph {
    translate_paragraph_outcome(paragraph, target_lang, translator, options);
    paragraph
}

/// Translate one paragraph in place and report the outcome.
pub fn translate_paragraph_outcome(
    paragraph: &mut Paragraph,
    target_lang: &str,
    translator: &dyn Translator,
    options: &TranslateOptions,
) -> ParagraphOutcome {
    let mut buffer = String::new();
    let mut first_text = None;
    let mut last_text = None;

    for (i, run) in paragraph.runs.iter().enumerate() {
        if run.is_structural() {
            continue;
        }
        buffer.push_str(&run.text);
        first_text.get_or_insert(i);
        last_text = Some(i);
    }

    let (Some(first), Some(last)) = (first_text, last_text) else {
        return ParagraphOutcome::Unchanged;
    };

    log::debug!(
        "Translating {} chars from {} runs to {}",
        buffer.chars().count(),
        paragraph.runs.len(),
        target_lang
    );

    let translated = match translator.translate(&buffer, target_lang) {
        Ok(text) => text,
        Err(err) => {
            log::warn!(
                "{} failed on {:?}: {}",
                translator.name(),
                preview(&buffer),
                err
            );
            if options.failure_policy == FailurePolicy::DropText {
                let runs = paragraph
                    .runs
                    .iter()
                    .filter(|r| r.is_structural())
                    .cloned()
                    .collect();
                paragraph.set_runs(runs);
            }
            return ParagraphOutcome::Failed(err);
        }
    };

    let text = match ScriptVariant::from_lang_code(target_lang) {
        Some(variant) => variant.apply(&translated),
        None => translated,
    };
    let translated_run = Run::with_format(
        normalize_trailing_space(&text),
        paragraph.runs[last].format.clone(),
    );

    let runs = rebuild(&paragraph.runs, translated_run, first, options.run_layout);
    paragraph.set_runs(runs);
    ParagraphOutcome::Translated
}

/// Build the new run sequence around the translated run.
fn rebuild(runs: &[Run], translated: Run, first_text: usize, layout: RunLayout) -> Vec<Run> {
    let mut rebuilt = Vec::with_capacity(runs.len() + 1);
    match layout {
        RunLayout::TranslatedFirst => {
            rebuilt.push(translated);
            rebuilt.extend(runs.iter().filter(|r| r.is_structural()).cloned());
        }
        RunLayout::Positional => {
            let mut translated = Some(translated);
            for (i, run) in runs.iter().enumerate() {
                if run.is_structural() {
                    rebuilt.push(run.clone());
                } else if i == first_text {
                    rebuilt.extend(translated.take());
                }
            }
        }
    }
    rebuilt
}

/// Append one space unless the text is empty or already ends with one.
///
/// ```
/// use docxlate::normalize_trailing_space;
///
/// assert_eq!(normalize_trailing_space("Bonjour"), "Bonjour ");
/// assert_eq!(normalize_trailing_space("Bonjour "), "Bonjour ");
/// assert_eq!(normalize_trailing_space(""), "");
/// ```
pub fn normalize_trailing_space(text: &str) -> String {
    let mut out = text.to_string();
    if !out.is_empty() && !out.ends_with(' ') {
        out.push(' ');
    }
    out
}

fn preview(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
