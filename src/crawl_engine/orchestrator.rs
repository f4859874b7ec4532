//! Main crawl orchestration logic
//!
//! Drives one sequential pass over the search terms:
//! - Listing navigation and search per term
//! - Recovery when the results table goes missing
//! - Row and detail extraction up to the per-term cap
//! - Batch validation and accumulation
//! - Periodic checkpoints and the final snapshot
//! - Status snapshots and event publishing

use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use super::attempt::{attempt, pause};
use super::crawl_types::{
    CompletionStatus, CrawlReport, CrawlResult, SearchOutcome, TermOutcome,
};
use super::detail_extractor::DetailExtractor;
use super::navigation::ListingNavigator;
use super::recovery::RecoveryController;
use super::row_extractor::RowExtractor;
use super::state::{CrawlState, CrawlStatus, StopSignal};
use super::validation::ValidationEngine;
use crate::automation::PageAutomation;
use crate::config::CrawlConfig;
use crate::content_saver::{CheckpointFile, FinalResultFile, PersistenceLayer};
use crate::crawl_events::CrawlEvent;
use crate::lookup::DetailLookup;
use crate::record::BidRecord;

/// Sequential crawl over a list of search terms on one page.
///
/// The orchestrator exclusively owns the crawl state; observers see it only
/// through [`CrawlStatus`] snapshots (`subscribe_status`) and the optional
/// event bus on the config.
pub struct CrawlOrchestrator<A: PageAutomation + ?Sized> {
    page: Arc<A>,
    config: Arc<CrawlConfig>,
    state: CrawlState,
    validator: ValidationEngine,
    persistence: PersistenceLayer,
    lookup: Option<Arc<dyn DetailLookup>>,
    stop: StopSignal,
    status_tx: watch::Sender<CrawlStatus>,
}

impl<A: PageAutomation + ?Sized> CrawlOrchestrator<A> {
    pub fn new(page: Arc<A>, config: CrawlConfig) -> Self {
        let persistence = PersistenceLayer::new(config.storage_dir().clone());
        let validator = ValidationEngine::new(config.site().validation.clone());
        let (status_tx, _) = watch::channel(CrawlStatus::default());
        Self {
            page,
            config: Arc::new(config),
            state: CrawlState::default(),
            validator,
            persistence,
            lookup: None,
            stop: StopSignal::new(),
            status_tx,
        }
    }

    /// Attach a secondary detail lookup, queried once per accepted row.
    #[must_use]
    pub fn with_lookup(mut self, lookup: Arc<dyn DetailLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    #[must_use]
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Handle for requesting a cooperative stop.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<CrawlStatus> {
        self.status_tx.subscribe()
    }

    #[must_use]
    pub fn status(&self) -> CrawlStatus {
        self.state.status()
    }

    /// Records accumulated so far and not yet drained by an exhausted run.
    #[must_use]
    pub fn records(&self) -> &[BidRecord] {
        &self.state.records
    }

    /// Restore completed terms and accumulated records from a checkpoint.
    ///
    /// Returns the number of restored records.
    pub fn resume_from(&mut self, checkpoint: CheckpointFile) -> usize {
        self.state.restore_completed(checkpoint.completed_terms);
        self.validator.seed(&checkpoint.results);
        let restored = checkpoint.results.len();
        self.state.records.extend(checkpoint.results);
        self.status_tx.send_replace(self.state.status());
        info!(
            "[RESUME] Restored {} completed term(s) and {} record(s)",
            self.state.completed.len(),
            restored
        );
        restored
    }

    /// Crawl `terms` in order.
    ///
    /// Terms already completed are skipped. Term-level failures are logged
    /// and the run moves on; persistence failures never end the run. The
    /// completed set is reset only when every term was visited.
    pub async fn run(&mut self, terms: &[String]) -> CrawlResult<CrawlReport> {
        self.config.validate()?;

        self.state.begin(terms);
        let pending = self.state.remaining_terms().len();
        info!(
            "Starting crawl: {} term(s), {} pending, output {}",
            terms.len(),
            pending,
            self.persistence.dir().display()
        );
        self.publish(CrawlEvent::crawl_started(
            terms.len(),
            pending,
            self.persistence.dir().to_path_buf(),
        ))
        .await;
        self.publish_status().await;

        let mut checkpoint_path = self.checkpoint().await;
        let mut outcomes = Vec::with_capacity(terms.len());
        let mut completion = CompletionStatus::Exhausted;

        for (index, term) in terms.iter().enumerate() {
            if self.stop.is_requested() {
                info!("Stop requested before '{}'", term);
                completion = CompletionStatus::Stopped;
                break;
            }
            self.state.current_term_index = index;

            if self.state.is_completed(term) {
                debug!("Skipping completed term '{}'", term);
                outcomes.push((term.clone(), TermOutcome::Skipped));
                continue;
            }

            info!("Term {}/{}: '{}'", index + 1, terms.len(), term);
            self.state.current_term = Some(term.clone());
            self.publish(CrawlEvent::term_started(term.clone(), index))
                .await;
            self.publish_status().await;

            let outcome = match self.process_term(term).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Term '{}' failed: {e}", term);
                    self.renavigate().await;
                    TermOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            if outcome.completes_term() {
                self.state.mark_completed(term);
            }
            let stopped = matches!(outcome, TermOutcome::Stopped { .. });
            self.publish(CrawlEvent::term_finished(term.clone(), outcome.clone()))
                .await;
            outcomes.push((term.clone(), outcome));
            self.publish_status().await;

            if stopped {
                completion = CompletionStatus::Stopped;
                break;
            }

            if let Some(path) = self.checkpoint_if_due().await {
                checkpoint_path = Some(path);
            }

            if index + 1 < terms.len() {
                pause(self.config.inter_term_delay()).await;
            }
        }

        self.state.current_term = None;
        if let Some(path) = self.checkpoint().await {
            checkpoint_path = Some(path);
        }

        let duration = self
            .state
            .started
            .map_or(Duration::ZERO, |at| at.elapsed());
        let download_dir = self
            .config
            .download_notices()
            .then(|| self.config.download_dir());
        let final_file = FinalResultFile::new(
            CheckpointFile::from_state(&self.state),
            completion,
            duration,
            download_dir,
        );
        let final_path = match self.persistence.final_save(&final_file).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("[CHECKPOINT] Failed to save final results: {e:#}");
                None
            }
        };

        let records = if completion == CompletionStatus::Exhausted {
            info!("All terms visited, resetting completed set");
            self.state.reset_completed();
            self.validator.reset();
            std::mem::take(&mut self.state.records)
        } else {
            self.state.records.clone()
        };

        self.state.is_running = false;
        self.publish_status().await;
        self.publish(CrawlEvent::crawl_completed(
            completion,
            records.len(),
            duration,
        ))
        .await;

        info!(
            "Crawl finished ({:?}): {} record(s) in {:.1}s",
            completion,
            records.len(),
            duration.as_secs_f64()
        );

        Ok(CrawlReport {
            term_outcomes: outcomes,
            records,
            completion_status: completion,
            duration,
            checkpoint_path,
            final_path,
        })
    }

    async fn process_term(&mut self, term: &str) -> CrawlResult<TermOutcome> {
        let page = Arc::clone(&self.page);
        let config = Arc::clone(&self.config);
        let navigator = ListingNavigator::new(page.as_ref(), &config);

        navigator.navigate_to_listing().await?;
        navigator.search(term).await?;

        let mut outcome = navigator.classify().await;
        if outcome == SearchOutcome::TableMissing {
            let recovery = RecoveryController::new(page.as_ref(), &config);
            if !recovery.recover(term).await {
                self.renavigate().await;
                return Ok(TermOutcome::Abandoned {
                    reason: "results table could not be restored".to_string(),
                });
            }
            outcome = navigator.classify().await;
        }

        let rows = match outcome {
            SearchOutcome::NoResults | SearchOutcome::ResultsFound(0) => {
                info!("No results for '{}'", term);
                return Ok(TermOutcome::NoResults);
            }
            SearchOutcome::TableMissing => {
                self.renavigate().await;
                return Ok(TermOutcome::Abandoned {
                    reason: "results table vanished after recovery".to_string(),
                });
            }
            SearchOutcome::ResultsFound(rows) => rows,
        };
        info!("'{}': processing {} row(s)", term, rows);

        let mut batch = Vec::with_capacity(rows);
        let mut stopped = false;
        for row in 0..rows {
            if self.stop.is_requested() {
                info!("Stop requested at row {} of '{}'", row, term);
                stopped = true;
                break;
            }
            if let Some(record) = self.process_row(page.as_ref(), &config, term, row).await {
                batch.push(record);
            }
        }

        let extracted = batch.len();
        let accepted = self.validator.validate_batch(term, batch);
        let kept = accepted.len();
        self.state.records.extend(accepted);
        info!("'{}': kept {}/{} record(s)", term, kept, extracted);

        Ok(if stopped {
            TermOutcome::Stopped { extracted, kept }
        } else {
            TermOutcome::Completed { extracted, kept }
        })
    }

    /// Extract one row. The row is the unit of atomicity for stop requests.
    async fn process_row(
        &self,
        page: &A,
        config: &CrawlConfig,
        term: &str,
        row: usize,
    ) -> Option<BidRecord> {
        let fields = RowExtractor::new(page, config).extract(row).await;
        if fields.is_empty() {
            debug!("Row {} of '{}' skipped", row, term);
            return None;
        }
        let mut record = BidRecord::new(term, row, fields);

        if config.extract_details() {
            record.detail_sections = DetailExtractor::new(page, config).extract_detail(row).await;
        }

        if let Some(lookup) = &self.lookup
            && let Some(bid) = record.field(&config.site().validation.bid_number_field)
        {
            let bid = bid.to_string();
            record.api_detail = Some(lookup.lookup(&bid).await);
        }

        Some(record)
    }

    /// Best-effort return to a known listing state.
    async fn renavigate(&self) {
        let navigator = ListingNavigator::new(self.page.as_ref(), &self.config);
        attempt(navigator.navigate_to_listing(), "re-navigation").await;
    }

    async fn checkpoint_if_due(&mut self) -> Option<PathBuf> {
        let due = self
            .state
            .last_checkpoint_instant
            .is_none_or(|at| at.elapsed() >= self.config.checkpoint_interval());
        if due { self.checkpoint().await } else { None }
    }

    async fn checkpoint(&mut self) -> Option<PathBuf> {
        let file = CheckpointFile::from_state(&self.state);
        let result = self.persistence.checkpoint(&file).await;
        self.state.last_checkpoint_instant = Some(Instant::now());
        match result {
            Ok(path) => {
                self.state.last_checkpoint_time = Some(chrono::Utc::now());
                self.publish(CrawlEvent::checkpoint_saved(path.clone(), file.results.len()))
                    .await;
                Some(path)
            }
            Err(e) => {
                warn!("[CHECKPOINT] Failed to save checkpoint: {e:#}");
                None
            }
        }
    }

    async fn publish_status(&self) {
        let status = self.state.status();
        self.status_tx.send_replace(status.clone());
        self.publish(CrawlEvent::progress(status)).await;
    }

    async fn publish(&self, event: CrawlEvent) {
        if let Some(bus) = self.config.event_bus()
            && let Err(e) = bus.publish(event).await
        {
            debug!("Event not delivered: {e}");
        }
    }
}
