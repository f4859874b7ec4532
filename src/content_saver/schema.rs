//! On-disk snapshot documents

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::crawl_engine::{CompletionStatus, CrawlState};
use crate::record::BidRecord;

/// Format of the `timestamp` field inside snapshot documents.
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_keywords: usize,
    pub total_results: usize,
    pub processed_count: usize,
}

/// Periodic progress snapshot. Enough to resume a run in another process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointFile {
    pub timestamp: String,
    pub summary: RunSummary,
    pub results: Vec<BidRecord>,
    #[serde(default)]
    pub completed_terms: Vec<String>,
    #[serde(default)]
    pub remaining_terms: Vec<String>,
}

impl CheckpointFile {
    #[must_use]
    pub fn from_state(state: &CrawlState) -> Self {
        Self {
            timestamp: chrono::Local::now()
                .format(SNAPSHOT_TIMESTAMP_FORMAT)
                .to_string(),
            summary: RunSummary {
                total_keywords: state.terms.len(),
                total_results: state.records.len(),
                processed_count: state.completed.len(),
            },
            results: state.records.clone(),
            completed_terms: state.completed.clone(),
            remaining_terms: state.remaining_terms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub completion_status: CompletionStatus,
    /// Seconds.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_directory: Option<PathBuf>,
}

/// End-of-run snapshot: the checkpoint fields plus run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResultFile {
    #[serde(flatten)]
    pub snapshot: CheckpointFile,
    pub metadata: RunMetadata,
}

impl FinalResultFile {
    #[must_use]
    pub fn new(
        snapshot: CheckpointFile,
        completion_status: CompletionStatus,
        duration: Duration,
        download_directory: Option<PathBuf>,
    ) -> Self {
        Self {
            snapshot,
            metadata: RunMetadata {
                completion_status,
                duration: duration.as_secs_f64(),
                download_directory,
            },
        }
    }
}
