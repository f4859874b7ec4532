//! Event type definitions for the crawl event system

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::crawl_engine::{CompletionStatus, CrawlStatus, TermOutcome};

/// Reason for event bus shutdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShutdownReason {
    /// Crawl ran through every term
    CrawlCompleted,
    /// Crawl encountered an error
    Error(String),
    /// Crawl was stopped by the caller
    Cancelled,
}

/// Event types emitted during a crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CrawlEvent {
    /// Emitted when a run starts
    CrawlStarted {
        total_terms: usize,
        pending_terms: usize,
        output_dir: PathBuf,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Emitted before a term's search is issued
    TermStarted {
        term: String,
        index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Emitted once a term has an outcome
    TermFinished {
        term: String,
        outcome: TermOutcome,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Status snapshot after a state change
    Progress {
        status: CrawlStatus,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// A snapshot file was written
    CheckpointSaved {
        path: PathBuf,
        record_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Emitted when the run returns
    CrawlCompleted {
        completion: CompletionStatus,
        total_records: usize,
        duration: std::time::Duration,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Signals that the event bus is shutting down
    ///
    /// Subscribers should exit their event loops when receiving this event.
    Shutdown {
        reason: ShutdownReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Helper functions for creating common events
impl CrawlEvent {
    #[must_use]
    pub fn crawl_started(total_terms: usize, pending_terms: usize, output_dir: PathBuf) -> Self {
        Self::CrawlStarted {
            total_terms,
            pending_terms,
            output_dir,
            timestamp: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn term_started(term: String, index: usize) -> Self {
        Self::TermStarted {
            term,
            index,
            timestamp: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn term_finished(term: String, outcome: TermOutcome) -> Self {
        Self::TermFinished {
            term,
            outcome,
            timestamp: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn progress(status: CrawlStatus) -> Self {
        Self::Progress {
            status,
            timestamp: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn checkpoint_saved(path: PathBuf, record_count: usize) -> Self {
        Self::CheckpointSaved {
            path,
            record_count,
            timestamp: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn crawl_completed(
        completion: CompletionStatus,
        total_records: usize,
        duration: std::time::Duration,
    ) -> Self {
        Self::CrawlCompleted {
            completion,
            total_records,
            duration,
            timestamp: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn shutdown(reason: ShutdownReason) -> Self {
        Self::Shutdown {
            reason,
            timestamp: chrono::Utc::now(),
        }
    }
}
