//! Crawl Engine Module
//!
//! This module contains the sequential crawl pipeline: listing navigation,
//! row and detail extraction, recovery, validation and the orchestrator that
//! drives them term by term.

// Sub-modules
pub mod attempt;
pub mod cleanup;
pub mod crawl_types;
pub mod detail_extractor;
pub mod navigation;
pub mod orchestrator;
pub mod recovery;
pub mod row_extractor;
pub mod state;
pub mod validation;

// Re-export orchestration types
pub use orchestrator::CrawlOrchestrator;
pub use state::{CrawlState, CrawlStatus, StopSignal};

// Re-export pipeline components
pub use detail_extractor::DetailExtractor;
pub use navigation::ListingNavigator;
pub use recovery::{RecoveryController, RecoveryState};
pub use row_extractor::RowExtractor;
pub use validation::{ValidationEngine, dedupe, has_required_fields, is_relevant};

// Re-export cleanup
pub use cleanup::{CleanupResult, cleanup_browser_and_data};

// Re-export crawl types
pub use crawl_types::{
    CompletionStatus, CrawlError, CrawlReport, CrawlResult, SearchOutcome, TermOutcome,
};
