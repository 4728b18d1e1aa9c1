//! Translation options and configuration.

use crossbeam_channel::Sender;

use super::collector::TranslationEvent;

/// Default number of paragraphs translated at the same time.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Options for translating paragraphs and documents.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Maximum number of concurrent translation calls (at least 1)
    pub concurrency: usize,

    /// Whether to use the worker pool at all
    pub parallel: bool,

    /// Where the translated run goes in the rebuilt paragraph
    pub run_layout: RunLayout,

    /// What happens to a paragraph whose translation failed
    pub failure_policy: FailurePolicy,

    /// Receiver side of this channel gets progress events
    pub progress: Option<Sender<TranslationEvent>>,
}

impl TranslateOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency limit. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enable or disable the worker pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Translate paragraphs one after another on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the run layout.
    pub fn with_run_layout(mut self, layout: RunLayout) -> Self {
        self.run_layout = layout;
        self
    }

    /// Keep structural runs in their original positions.
    pub fn positional_runs(mut self) -> Self {
        self.run_layout = RunLayout::Positional;
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Leave paragraphs untouched when their translation fails.
    pub fn keep_source_on_error(mut self) -> Self {
        self.failure_policy = FailurePolicy::KeepSource;
        self
    }

    /// Send progress events to `sender`.
    pub fn with_progress(mut self, sender: Sender<TranslationEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Number of worker threads to use.
    pub fn worker_count(&self) -> usize {
        if self.parallel {
            self.concurrency.max(1)
        } else {
            1
        }
    }
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            parallel: true,
            run_layout: RunLayout::default(),
            failure_policy: FailurePolicy::default(),
            progress: None,
        }
    }
}

/// Placement of the translated run when a paragraph is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunLayout {
    /// Translated run first, then every structural run in original order
    #[default]
    TranslatedFirst,
    /// Translated run takes the place of the first text run; structural
    /// runs keep their positions around it
    Positional,
}

/// Handling of a paragraph whose translation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Rebuild the paragraph from its structural runs only
    #[default]
    DropText,
    /// Leave the paragraph exactly as it was
    KeepSource,
}
