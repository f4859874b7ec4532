//! Record validation
//!
//! Pure filters over extracted records. A term's batch always passes through
//! them in the same order: required fields, then relevance, then dedupe.

use log::{debug, warn};
use std::collections::HashSet;

use crate::config::ValidationRules;
use crate::record::BidRecord;

/// True iff every required field is present and non-empty.
#[must_use]
pub fn has_required_fields(record: &BidRecord, rules: &ValidationRules) -> bool {
    rules
        .required_fields
        .iter()
        .all(|field| record.field(field).is_some())
}

/// Loose, recall-favoring match of `term` against title and general notice.
///
/// Matches when the whole term, or any whitespace-separated token of it, is
/// a case-insensitive substring of either text.
#[must_use]
pub fn is_relevant(term: &str, record: &BidRecord, rules: &ValidationRules) -> bool {
    let term = term.to_lowercase();
    let title = record
        .field(&rules.title_field)
        .unwrap_or_default()
        .to_lowercase();
    let notice = record
        .section_text(&rules.notice_section)
        .unwrap_or_default()
        .to_lowercase();

    title.contains(&term)
        || notice.contains(&term)
        || term
            .split_whitespace()
            .any(|token| title.contains(token) || notice.contains(token))
}

/// Stable first-seen-wins filter keyed by bid number. Records without a bid
/// number are all kept.
#[must_use]
pub fn dedupe(records: Vec<BidRecord>, bid_number_field: &str) -> Vec<BidRecord> {
    let mut seen = HashSet::new();
    dedupe_against(records, bid_number_field, &mut seen)
}

fn dedupe_against(
    records: Vec<BidRecord>,
    bid_number_field: &str,
    seen: &mut HashSet<String>,
) -> Vec<BidRecord> {
    records
        .into_iter()
        .filter(|record| match record.field(bid_number_field) {
            Some(bid) => seen.insert(bid.to_string()),
            None => true,
        })
        .collect()
}

/// Run-wide validation: dedupe state spans every term of a run.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    rules: ValidationRules,
    seen: HashSet<String>,
}

impl ValidationEngine {
    #[must_use]
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            rules,
            seen: HashSet::new(),
        }
    }

    /// Mark already-accepted records as seen (resume).
    pub fn seed<'r>(&mut self, records: impl IntoIterator<Item = &'r BidRecord>) {
        for record in records {
            if let Some(bid) = record.field(&self.rules.bid_number_field) {
                self.seen.insert(bid.to_string());
            }
        }
    }

    /// Filter one term's batch.
    pub fn validate_batch(&mut self, term: &str, batch: Vec<BidRecord>) -> Vec<BidRecord> {
        let total = batch.len();
        let complete: Vec<BidRecord> = batch
            .into_iter()
            .filter(|record| {
                let ok = has_required_fields(record, &self.rules);
                if !ok {
                    warn!("[VALIDATE] Row {} missing required fields", record.row_index);
                }
                ok
            })
            .collect();
        let relevant: Vec<BidRecord> = complete
            .into_iter()
            .filter(|record| {
                let ok = is_relevant(term, record, &self.rules);
                if !ok {
                    debug!(
                        "[VALIDATE] Row {} not relevant to '{}'",
                        record.row_index, term
                    );
                }
                ok
            })
            .collect();
        let kept = dedupe_against(relevant, &self.rules.bid_number_field, &mut self.seen);
        debug!("[VALIDATE] '{}': kept {}/{}", term, kept.len(), total);
        kept
    }

    /// Forget everything seen so far.
    pub fn reset(&mut self) {
        self.seen.clear();
    }
}
