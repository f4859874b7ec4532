//! Core types for crawl runs.
//!
//! Error types, per-search classification, per-term outcomes and the report
//! a run returns.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::automation::AutomationError;
use crate::config::ConfigError;
use crate::record::BidRecord;

/// Custom error type for crawl operations
#[derive(Debug, Clone, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Browser error: {0}")]
    Browser(String),

    /// Listing navigation (page load or menu chain) failed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Crawl error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        Self::Other(format!("{err:#}"))
    }
}

impl From<AutomationError> for CrawlError {
    fn from(err: AutomationError) -> Self {
        match err {
            AutomationError::Browser(msg) => Self::Browser(msg),
            other => Self::Navigation(other.to_string()),
        }
    }
}

impl From<ConfigError> for CrawlError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// What a search left on the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The grid reported that nothing matched.
    NoResults,
    /// Neither a no-results marker nor the results table is present.
    TableMissing,
    /// The table is present with this many rows (already capped).
    ResultsFound(usize),
}

/// How a term ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TermOutcome {
    /// Completed in an earlier run.
    Skipped,
    /// The search matched nothing. Marks the term completed.
    NoResults,
    /// All rows processed. Marks the term completed.
    Completed { extracted: usize, kept: usize },
    /// Stop observed between rows. The term stays pending.
    Stopped { extracted: usize, kept: usize },
    /// Recovery could not restore the results table. The term stays pending.
    Abandoned { reason: String },
    /// An error escaped the term. The term stays pending.
    Failed { error: String },
}

impl TermOutcome {
    /// Whether the term joins the completed set.
    #[must_use]
    pub fn completes_term(&self) -> bool {
        matches!(self, Self::NoResults | Self::Completed { .. })
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// Every term was visited.
    Exhausted,
    /// A stop signal ended the run early.
    Stopped,
}

/// Result of one orchestrator run.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub term_outcomes: Vec<(String, TermOutcome)>,
    /// Validated records accumulated over the run, including restored ones.
    pub records: Vec<BidRecord>,
    pub completion_status: CompletionStatus,
    pub duration: Duration,
    pub checkpoint_path: Option<PathBuf>,
    pub final_path: Option<PathBuf>,
}

impl CrawlReport {
    #[must_use]
    pub fn outcome(&self, term: &str) -> Option<&TermOutcome> {
        self.term_outcomes
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, o)| o)
    }

    #[must_use]
    pub fn records_for(&self, term: &str) -> Vec<&BidRecord> {
        self.records
            .iter()
            .filter(|r| r.search_term == term)
            .collect()
    }
}
