//! docxlate CLI - Word document translation tool

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docxlate::translate::{validate_lang_code, DEFAULT_CONCURRENCY};
use docxlate::{
    collect_fragments, translate_document, Document, GoogleConfig, GoogleTranslator,
    ParagraphOutcome, TranslateError, TranslateOptions, TranslationEvent, TranslationSummary,
};

#[derive(Parser)]
#[command(name = "docxlate")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Translate Word documents while preserving formatting", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Input .docx file
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output .docx file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Target language code (e.g. fr, de, sr_Latn)
    #[arg(value_name = "LANG")]
    lang: Option<String>,

    #[command(flatten)]
    translate: TranslateArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct TranslateArgs {
    /// Maximum number of concurrent translation requests
    #[arg(short, long, env = "DOCXLATE_JOBS", default_value_t = DEFAULT_CONCURRENCY)]
    jobs: usize,

    /// Translate paragraphs one at a time
    #[arg(long)]
    sequential: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "DOCXLATE_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Translation endpoint URL
    #[arg(long, env = "DOCXLATE_ENDPOINT")]
    endpoint: Option<String>,

    /// Source language code
    #[arg(long, default_value = "auto")]
    source: String,

    /// Keep the original text of paragraphs whose translation fails
    #[arg(long)]
    keep_source_on_error: bool,

    /// Keep line breaks and spacing runs in their original positions
    #[arg(long)]
    positional_runs: bool,

    /// Do not show a progress bar
    #[arg(long)]
    no_progress: bool,
}

impl TranslateArgs {
    fn options(&self) -> TranslateOptions {
        let mut options = TranslateOptions::new().with_concurrency(self.jobs);
        if self.sequential {
            options = options.sequential();
        }
        if self.keep_source_on_error {
            options = options.keep_source_on_error();
        }
        if self.positional_runs {
            options = options.positional_runs();
        }
        options
    }

    fn translator(&self) -> docxlate::Result<GoogleTranslator> {
        let mut config = GoogleConfig::new()
            .with_timeout(Duration::from_secs(self.timeout.max(1)))
            .with_source_lang(self.source.as_str());
        if let Some(ref endpoint) = self.endpoint {
            config = config.with_endpoint(endpoint.as_str());
        }
        GoogleTranslator::with_config(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a document (same as the positional form)
    #[command(alias = "t")]
    Translate {
        /// Input .docx file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output .docx file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Target language code
        #[arg(value_name = "LANG")]
        lang: String,

        #[command(flatten)]
        translate: TranslateArgs,
    },

    /// Show document information
    Info {
        /// Input .docx file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// A fatal error labelled with the stage it happened in.
#[derive(Debug)]
struct CliError {
    stage: &'static str,
    source: docxlate::Error,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.source)
    }
}

impl std::error::Error for CliError {}

fn at_stage<T>(stage: &'static str, result: docxlate::Result<T>) -> Result<T, CliError> {
    result.map_err(|source| CliError { stage, source })
}

fn config_error(message: impl Into<String>) -> CliError {
    CliError {
        stage: "config",
        source: docxlate::Error::Config(message.into()),
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Translate {
            input,
            output,
            lang,
            translate,
        }) => cmd_translate(&input, &output, &lang, &translate),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match (cli.input, cli.output, cli.lang) {
            (None, None, None) => {
                println!("{}", "Usage: docxlate <INPUT> <OUTPUT> <LANG>".yellow());
                println!("       docxlate --help for more information");
                Ok(())
            }
            (input, output, lang) => cmd_translate(
                &input.unwrap_or_default(),
                &output.unwrap_or_default(),
                &lang.unwrap_or_default(),
                &cli.translate,
            ),
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Reject missing arguments before touching any file.
fn check_arguments(input: &Path, output: &Path, lang: &str) -> Result<(), CliError> {
    if input.as_os_str().is_empty() {
        return Err(config_error("input path is required"));
    }
    if output.as_os_str().is_empty() {
        return Err(config_error("output path is required"));
    }
    at_stage("config", validate_lang_code(lang))
}

fn cmd_translate(
    input: &Path,
    output: &Path,
    lang: &str,
    args: &TranslateArgs,
) -> Result<(), CliError> {
    check_arguments(input, output, lang)?;
    let translator = at_stage("config", args.translator())?;

    let mut doc = at_stage("load", Document::open(input))?;
    let total = collect_fragments(&doc).len();
    log::info!("{}: {} paragraphs to translate", input.display(), total);

    let (summary, failures) = translate_with_progress(&mut doc, lang, &translator, args, total)?;
    check_outcome(&summary, failures.first)?;
    if failures.transient > 0 {
        println!(
            "{} {} paragraphs failed with temporary errors; running again may translate them",
            "note:".yellow(),
            failures.transient
        );
    }

    at_stage("save", doc.save(output))?;

    print_summary(&summary);
    println!("{} {}", "Saved to".green(), output.display());
    Ok(())
}

/// Paragraph failures seen while translating.
#[derive(Debug, Default)]
struct FailureLog {
    /// First failure reported
    first: Option<TranslateError>,
    /// Failures worth retrying (network, rate limit, 5xx)
    transient: usize,
}

/// A document where no paragraph could be translated is not saved.
fn check_outcome(
    summary: &TranslationSummary,
    first_failure: Option<TranslateError>,
) -> Result<(), CliError> {
    match first_failure {
        Some(err) if summary.translated == 0 && summary.failed == summary.dispatched => {
            Err(CliError {
                stage: "translate",
                source: docxlate::Error::Translation(err),
            })
        }
        _ => Ok(()),
    }
}

fn translate_with_progress(
    doc: &mut Document,
    lang: &str,
    translator: &GoogleTranslator,
    args: &TranslateArgs,
    total: usize,
) -> Result<(TranslationSummary, FailureLog), CliError> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let options = args.options().with_progress(tx);

    let pb = if args.no_progress || total == 0 {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message("Translating...");
        pb
    };

    let (result, failures) = std::thread::scope(|scope| {
        let bar = pb.clone();
        let watcher = scope.spawn(move || {
            let mut failures = FailureLog::default();
            for event in rx {
                match event {
                    TranslationEvent::Started { .. } => {}
                    TranslationEvent::ParagraphDone { location, outcome } => {
                        if let ParagraphOutcome::Failed(err) = outcome {
                            let message = format!(
                                "{} {} was not translated: {}",
                                "warning:".yellow(),
                                location,
                                err
                            );
                            if bar.is_hidden() {
                                eprintln!("{}", message);
                            } else {
                                bar.println(message);
                            }
                            if err.is_transient() {
                                failures.transient += 1;
                            }
                            failures.first.get_or_insert(err);
                        }
                        bar.inc(1);
                    }
                    TranslationEvent::Finished(_) => bar.finish_with_message("Done!"),
                }
            }
            failures
        });

        let result = translate_document(doc, lang, translator, &options);
        // Closing the channel ends the watcher thread.
        drop(options);
        (result, watcher.join().unwrap_or_default())
    });

    pb.finish_and_clear();
    Ok((at_stage("translate", result)?, failures))
}

fn print_summary(summary: &TranslationSummary) {
    println!("{}", "Translation Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Paragraphs".bold(), summary.dispatched);
    println!("{}: {}", "Translated".bold(), summary.translated);
    if summary.failed > 0 {
        println!("{}: {}", "Failed".bold(), summary.failed.to_string().red());
    } else {
        println!("{}: {}", "Failed".bold(), summary.failed);
    }
}

fn cmd_info(input: &Path, json: bool) -> Result<(), CliError> {
    let doc = at_stage("load", Document::open(input))?;

    let headers = doc.sections.iter().filter(|s| s.header.is_some()).count();
    let footers = doc.sections.iter().filter(|s| s.footer.is_some()).count();
    let fragments = collect_fragments(&doc).len();
    let text = doc.plain_text();
    let words = text.split_whitespace().count();

    if json {
        let value = serde_json::json!({
            "file": input.display().to_string(),
            "metadata": doc.metadata,
            "paragraphs": doc.paragraphs.len(),
            "tables": doc.tables.len(),
            "sections": doc.sections.len(),
            "headers": headers,
            "footers": footers,
            "fragments": fragments,
            "words": words,
        });
        let rendered = serde_json::to_string_pretty(&value)
            .map_err(|e| config_error(format!("JSON serialization failed: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref creator) = doc.metadata.creator {
        println!("{}: {}", "Author".bold(), creator);
    }
    if let Some(ref modified_by) = doc.metadata.last_modified_by {
        println!("{}: {}", "Last modified by".bold(), modified_by);
    }
    if let Some(ref language) = doc.metadata.language {
        println!("{}: {}", "Language".bold(), language);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Paragraphs".bold(), doc.paragraphs.len());
    println!("{}: {}", "Tables".bold(), doc.tables.len());
    println!("{}: {}", "Sections".bold(), doc.sections.len());
    println!("{}: {} / {}", "Headers / footers".bold(), headers, footers);
    println!("{}: {}", "Translatable paragraphs".bold(), fragments);
    println!("{}: {}", "Words".bold(), words);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docxlate".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Word document translation tool");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/iyulab/docxlate".dimmed()
    );
    println!("License: MIT");
}
