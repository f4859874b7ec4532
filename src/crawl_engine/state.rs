//! Crawl state, status snapshots and the stop signal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::record::BidRecord;

/// Read-only view of a run, safe to hand to any observer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStatus {
    pub is_running: bool,
    pub current_term: Option<String>,
    pub completed_terms: Vec<String>,
    pub remaining_terms: Vec<String>,
    pub accumulated_record_count: usize,
    pub last_checkpoint_time: Option<DateTime<Utc>>,
}

/// Mutable state owned by the orchestrator for the duration of a run.
#[derive(Debug, Default)]
pub struct CrawlState {
    pub is_running: bool,
    pub current_term: Option<String>,
    pub current_term_index: usize,
    pub terms: Vec<String>,
    /// Completion order is kept for checkpoints.
    pub completed: Vec<String>,
    completed_set: HashSet<String>,
    pub records: Vec<BidRecord>,
    pub last_checkpoint_time: Option<DateTime<Utc>>,
    pub last_checkpoint_instant: Option<Instant>,
    pub started: Option<Instant>,
}

impl CrawlState {
    pub fn begin(&mut self, terms: &[String]) {
        self.is_running = true;
        self.terms = terms.to_vec();
        self.current_term = None;
        self.current_term_index = 0;
        self.started = Some(Instant::now());
        self.last_checkpoint_instant = Some(Instant::now());
    }

    #[must_use]
    pub fn is_completed(&self, term: &str) -> bool {
        self.completed_set.contains(term)
    }

    pub fn mark_completed(&mut self, term: &str) {
        if self.completed_set.insert(term.to_string()) {
            self.completed.push(term.to_string());
        }
    }

    pub fn restore_completed(&mut self, terms: impl IntoIterator<Item = String>) {
        for term in terms {
            self.mark_completed(&term);
        }
    }

    pub fn reset_completed(&mut self) {
        self.completed.clear();
        self.completed_set.clear();
        self.current_term_index = 0;
    }

    /// Terms of the current run not yet completed, in run order.
    #[must_use]
    pub fn remaining_terms(&self) -> Vec<String> {
        self.terms
            .iter()
            .filter(|t| !self.is_completed(t))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn status(&self) -> CrawlStatus {
        CrawlStatus {
            is_running: self.is_running,
            current_term: self.current_term.clone(),
            completed_terms: self.completed.clone(),
            remaining_terms: self.remaining_terms(),
            accumulated_record_count: self.records.len(),
            last_checkpoint_time: self.last_checkpoint_time,
        }
    }
}

/// Cooperative stop request shared between a controller and a running crawl.
///
/// The crawl polls it before each term, before each row and after delays.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
