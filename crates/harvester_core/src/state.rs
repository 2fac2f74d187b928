use chrono::NaiveDate;

use crate::{
    CompletionReason, CutoffPolicy, FailureReason, Fingerprint, Granularity, HarvestRecord,
    NormalizeRules, Normalizer, Observation, StalenessDetector, DEFAULT_REPEAT_THRESHOLD,
};

/// Everything a session needs to know about the site and the harvest policy.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub source_id: String,
    pub rules: NormalizeRules,
    pub cutoff: CutoffPolicy,
    pub granularity: Granularity,
    pub repeat_threshold: u32,
    /// Fail the session when a page yields no admissible records,
    /// instead of moving on to the next page.
    pub empty_page_is_error: bool,
    pub max_pages: Option<u32>,
    /// Reference day for relative dates such as "2 weeks ago".
    pub captured_on: NaiveDate,
}

impl SessionConfig {
    pub fn new(source_id: impl Into<String>, captured_on: NaiveDate) -> Self {
        Self {
            source_id: source_id.into(),
            rules: NormalizeRules::default(),
            cutoff: CutoffPolicy::default(),
            granularity: Granularity::default(),
            repeat_threshold: DEFAULT_REPEAT_THRESHOLD,
            empty_page_is_error: false,
            max_pages: None,
            captured_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Init,
    Navigating,
    ExtractingPage,
    Accumulating,
    Paginating,
    Completed(CompletionReason),
    Failed(FailureReason),
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed(_) | Phase::Failed(_))
    }
}

/// Bookkeeping for the most recently processed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageReport {
    pub page: u32,
    pub raw: usize,
    pub admitted: usize,
    pub kept: usize,
    pub observation: Observation,
    pub cutoff_triggered: bool,
}

/// One traversal attempt. Never reused: a retry builds a new session.
#[derive(Debug, Clone)]
pub struct HarvestSession {
    pub(crate) config: SessionConfig,
    pub(crate) phase: Phase,
    pub(crate) normalizer: Option<Normalizer>,
    pub(crate) subject_name: Option<String>,
    pub(crate) pages: Vec<u32>,
    pub(crate) accumulated: Vec<HarvestRecord>,
    pub(crate) detector: StalenessDetector,
    pub(crate) last_page: Option<PageReport>,
}

impl HarvestSession {
    pub fn new(config: SessionConfig) -> Self {
        let detector = StalenessDetector::new(config.granularity, config.repeat_threshold);
        Self {
            config,
            phase: Phase::Init,
            normalizer: None,
            subject_name: None,
            pages: Vec::new(),
            accumulated: Vec::new(),
            detector,
            last_page: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn subject_name(&self) -> Option<&str> {
        self.subject_name.as_deref()
    }

    /// Page indices visited so far, 1-based and increasing.
    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    pub fn current_page(&self) -> Option<u32> {
        self.pages.last().copied()
    }

    pub fn accumulated(&self) -> &[HarvestRecord] {
        &self.accumulated
    }

    pub fn repeat_count(&self) -> u32 {
        self.detector.repeat_count()
    }

    pub fn last_fingerprint(&self) -> Option<Fingerprint> {
        self.detector.last_fingerprint()
    }

    pub fn last_page_report(&self) -> Option<PageReport> {
        self.last_page
    }

    pub fn into_records(self) -> Vec<HarvestRecord> {
        self.accumulated
    }
}
