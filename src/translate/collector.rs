//! Fragment collection and concurrent document translation.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;

use super::lang::validate_lang_code;
use super::options::TranslateOptions;
use super::runs::{translate_paragraph_outcome, ParagraphOutcome};
use super::service::Translator;
use crate::error::{Error, Result};
use crate::model::{Document, Paragraph, ParagraphLocation};

/// Counts for one document translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TranslationSummary {
    /// Paragraphs handed to the run translator
    pub dispatched: usize,
    /// Paragraphs that now carry translated text
    pub translated: usize,
    /// Paragraphs whose translation call failed
    pub failed: usize,
}

impl TranslationSummary {
    /// Dispatched paragraphs that were neither translated nor failed.
    pub fn unchanged(&self) -> usize {
        self.dispatched
            .saturating_sub(self.translated)
            .saturating_sub(self.failed)
    }
}

/// Progress of a running document translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationEvent {
    /// Translation started for `total` paragraphs
    Started { total: usize },
    /// One paragraph is done
    ParagraphDone {
        location: ParagraphLocation,
        outcome: ParagraphOutcome,
    },
    /// Every paragraph is done
    Finished(TranslationSummary),
}

/// Locations of every paragraph [`translate_document`] would translate,
/// in dispatch order.
///
/// Order: body paragraphs, then table cells (table, row, cell), then per
/// section the header paragraphs followed by the footer paragraphs.
/// Blank paragraphs are left out.
pub fn collect_fragments(doc: &Document) -> Vec<ParagraphLocation> {
    let mut locations = Vec::new();

    for (i, paragraph) in doc.paragraphs.iter().enumerate() {
        if !paragraph.is_blank() {
            locations.push(ParagraphLocation::Body(i));
        }
    }

    for (t, table) in doc.tables.iter().enumerate() {
        for (r, row) in table.rows.iter().enumerate() {
            for (c, cell) in row.cells.iter().enumerate() {
                for (p, paragraph) in cell.paragraphs.iter().enumerate() {
                    if !paragraph.is_blank() {
                        locations.push(ParagraphLocation::Cell {
                            table: t,
                            row: r,
                            cell: c,
                            paragraph: p,
                        });
                    }
                }
            }
        }
    }

    for (s, section) in doc.sections.iter().enumerate() {
        if let Some(header) = &section.header {
            for (p, paragraph) in header.paragraphs.iter().enumerate() {
                if !paragraph.is_blank() {
                    locations.push(ParagraphLocation::Header {
                        section: s,
                        paragraph: p,
                    });
                }
            }
        }
        if let Some(footer) = &section.footer {
            for (p, paragraph) in footer.paragraphs.iter().enumerate() {
                if !paragraph.is_blank() {
                    locations.push(ParagraphLocation::Footer {
                        section: s,
                        paragraph: p,
                    });
                }
            }
        }
    }

    locations
}

/// Mutable borrows of the same paragraphs [`collect_fragments`] lists.
fn fragments_mut(doc: &mut Document) -> Vec<(ParagraphLocation, &mut Paragraph)> {
    let mut units = Vec::new();
    let Document {
        paragraphs,
        tables,
        sections,
        ..
    } = doc;

    for (i, paragraph) in paragraphs.iter_mut().enumerate() {
        if !paragraph.is_blank() {
            units.push((ParagraphLocation::Body(i), paragraph));
        }
    }

    for (t, table) in tables.iter_mut().enumerate() {
        for (r, row) in table.rows.iter_mut().enumerate() {
            for (c, cell) in row.cells.iter_mut().enumerate() {
                for (p, paragraph) in cell.paragraphs.iter_mut().enumerate() {
                    if !paragraph.is_blank() {
                        let location = ParagraphLocation::Cell {
                            table: t,
                            row: r,
                            cell: c,
                            paragraph: p,
                        };
                        units.push((location, paragraph));
                    }
                }
            }
        }
    }

    for (s, section) in sections.iter_mut().enumerate() {
        if let Some(header) = section.header.as_mut() {
            for (p, paragraph) in header.paragraphs.iter_mut().enumerate() {
                if !paragraph.is_blank() {
                    let location = ParagraphLocation::Header {
                        section: s,
                        paragraph: p,
                    };
                    units.push((location, paragraph));
                }
            }
        }
        if let Some(footer) = section.footer.as_mut() {
            for (p, paragraph) in footer.paragraphs.iter_mut().enumerate() {
                if !paragraph.is_blank() {
                    let location = ParagraphLocation::Footer {
                        section: s,
                        paragraph: p,
                    };
                    units.push((location, paragraph));
                }
            }
        }
    }

    units
}

/// Translate every text-bearing paragraph of a document in place.
///
/// Paragraphs are processed on a pool of at most
/// [`TranslateOptions::concurrency`] threads, and the call returns once all
/// of them are done. Per-paragraph failures are counted in the summary;
/// only an invalid target language or a pool setup failure is an error.
pub fn translate_document(
    doc: &mut Document,
    target_lang: &str,
    translator: &dyn Translator,
    options: &TranslateOptions,
) -> Result<TranslationSummary> {
    validate_lang_code(target_lang)?;

    let units = fragments_mut(doc);
    let total = units.len();
    let workers = options.worker_count().min(total.max(1));
    log::info!(
        "Translating {} paragraphs to {} with {} ({} workers)",
        total,
        target_lang,
        translator.name(),
        workers
    );
    notify(options, TranslationEvent::Started { total });

    let translated = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let process = |(location, paragraph): (ParagraphLocation, &mut Paragraph)| {
        let outcome = translate_paragraph_outcome(paragraph, target_lang, translator, options);
        match outcome {
            ParagraphOutcome::Translated => {
                translated.fetch_add(1, Ordering::Relaxed);
            }
            ParagraphOutcome::Failed(_) => {
                failed.fetch_add(1, Ordering::Relaxed);
            }
            ParagraphOutcome::Unchanged => {}
        }
        notify(options, TranslationEvent::ParagraphDone { location, outcome });
    };

    if workers > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("docxlate-worker-{}", i))
            .build()
            .map_err(|e| Error::Config(format!("failed to start worker pool: {}", e)))?;
        pool.install(|| units.into_par_iter().for_each(process));
    } else {
        units.into_iter().for_each(process);
    }

    let summary = TranslationSummary {
        dispatched: total,
        translated: translated.into_inner(),
        failed: failed.into_inner(),
    };
    log::info!(
        "Translated {} of {} paragraphs ({} failed)",
        summary.translated,
        summary.dispatched,
        summary.failed
    );
    notify(options, TranslationEvent::Finished(summary));

    Ok(summary)
}

fn notify(options: &TranslateOptions, event: TranslationEvent) {
    if let Some(sender) = &options.progress {
        // A dropped receiver only means nobody is watching.
        let _ = sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslateError;
    use crate::model::{HeaderFooter, Run, Section, Table, TableRow};

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("one"));
        doc.add_paragraph(Paragraph::from_runs(vec![Run::new("  ")]));
        doc.add_paragraph(Paragraph::with_text("two"));
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["a", ""]));
        doc.add_table(table);
        doc.add_section(
            Section::new()
                .with_header(HeaderFooter::with_text("head"))
                .with_footer(HeaderFooter::with_text("foot")),
        );
        doc
    }

    fn upper(text: &str, _: &str) -> std::result::Result<String, TranslateError> {
        Ok(text.to_uppercase())
    }

    #[test]
    fn test_collect_fragments_order() {
        let locations = collect_fragments(&sample());
        assert_eq!(
            locations,
            vec![
                ParagraphLocation::Body(0),
                ParagraphLocation::Body(2),
                ParagraphLocation::Cell {
                    table: 0,
                    row: 0,
                    cell: 0,
                    paragraph: 0
                },
                ParagraphLocation::Header {
                    section: 0,
                    paragraph: 0
                },
                ParagraphLocation::Footer {
                    section: 0,
                    paragraph: 0
                },
            ]
        );
    }

    #[test]
    fn test_fragments_mut_matches_collect() {
        let mut doc = sample();
        let expected = collect_fragments(&doc);
        let actual: Vec<_> = fragments_mut(&mut doc).into_iter().map(|(l, _)| l).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_translate_document_sequential() {
        let mut doc = sample();
        let options = TranslateOptions::new().sequential();
        let summary = translate_document(&mut doc, "de", &upper, &options).unwrap();

        assert_eq!(
            summary,
            TranslationSummary {
                dispatched: 5,
                translated: 5,
                failed: 0
            }
        );
        assert_eq!(doc.paragraphs[0].text(), "ONE ");
        assert_eq!(doc.paragraphs[1].text(), "  ");
        assert_eq!(
            doc.sections[0].footer.as_ref().unwrap().paragraphs[0].text(),
            "FOOT "
        );
    }

    #[test]
    fn test_translate_document_rejects_bad_language() {
        let mut doc = sample();
        let result = translate_document(&mut doc, "", &upper, &TranslateOptions::default());
        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(doc.paragraphs[0].text(), "one");
    }

    #[test]
    fn test_progress_events() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut doc = sample();
        let options = TranslateOptions::new().with_concurrency(2).with_progress(tx);
        translate_document(&mut doc, "de", &upper, &options).unwrap();
        drop(options);

        let events: Vec<TranslationEvent> = rx.iter().collect();
        assert_eq!(events.first(), Some(&TranslationEvent::Started { total: 5 }));
        assert!(matches!(events.last(), Some(TranslationEvent::Finished(s)) if s.translated == 5));
        let done = events
            .iter()
            .filter(|e| matches!(e, TranslationEvent::ParagraphDone { .. }))
            .count();
        assert_eq!(done, 5);
    }

    #[test]
    fn test_summary_unchanged() {
        let summary = TranslationSummary {
            dispatched: 5,
            translated: 3,
            failed: 1,
        };
        assert_eq!(summary.unchanged(), 1);
    }
}
