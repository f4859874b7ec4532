//! Listing recovery
//!
//! When a search leaves neither a results table nor a no-results marker, the
//! page is treated as broken and walked through a bounded state machine:
//!
//! ```text
//! Broken -> BackNavigated -> Verified
//!                         -> Reattempt(1) -> Verified
//!                                         -> Reattempt(2) -> ... -> Failed
//! ```
//!
//! A permanently broken page sees exactly one history-back plus
//! `max_retries` reset-and-search attempts.

use log::{debug, info, warn};

use super::attempt::{attempt, pause};
use super::navigation::ListingNavigator;
use crate::automation::PageAutomation;
use crate::config::CrawlConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    Broken,
    BackNavigated,
    /// n-th reset-and-search attempt, 1-based.
    Reattempt(u32),
    Verified,
    Failed,
}

pub struct RecoveryController<'a, A: PageAutomation + ?Sized> {
    page: &'a A,
    config: &'a CrawlConfig,
    navigator: ListingNavigator<'a, A>,
    max_retries: u32,
}

impl<'a, A: PageAutomation + ?Sized> RecoveryController<'a, A> {
    pub fn new(page: &'a A, config: &'a CrawlConfig) -> Self {
        Self {
            page,
            config,
            navigator: ListingNavigator::new(page, config),
            max_retries: config.max_recovery_retries(),
        }
    }

    /// Try to bring back the results table for `term`.
    ///
    /// Returns true once the table is verified present.
    pub async fn recover(&self, term: &str) -> bool {
        let mut state = RecoveryState::Broken;
        loop {
            debug!("[RECOVERY] '{}' state {:?}", term, state);
            state = match state {
                RecoveryState::Broken => {
                    warn!("[RECOVERY] Results table missing for '{}', navigating back", term);
                    attempt(self.page.navigate_back(), "recovery back").await;
                    pause(self.config.step_delay()).await;
                    RecoveryState::BackNavigated
                }
                RecoveryState::BackNavigated => {
                    if self.navigator.table_present().await {
                        RecoveryState::Verified
                    } else {
                        self.next_attempt(0)
                    }
                }
                RecoveryState::Reattempt(n) => {
                    info!(
                        "[RECOVERY] Reset attempt {}/{} for '{}'",
                        n, self.max_retries, term
                    );
                    if let Err(e) = self.reset_and_search(term).await {
                        warn!("[RECOVERY] Reset attempt {} failed: {e}", n);
                    }
                    if self.navigator.table_present().await {
                        RecoveryState::Verified
                    } else {
                        self.next_attempt(n)
                    }
                }
                RecoveryState::Verified => {
                    info!("[RECOVERY] Results table restored for '{}'", term);
                    return true;
                }
                RecoveryState::Failed => {
                    warn!("[RECOVERY] Giving up on '{}'", term);
                    return false;
                }
            };
        }
    }

    fn next_attempt(&self, done: u32) -> RecoveryState {
        if done < self.max_retries {
            RecoveryState::Reattempt(done + 1)
        } else {
            RecoveryState::Failed
        }
    }

    async fn reset_and_search(&self, term: &str) -> crate::automation::AutomationResult<()> {
        self.navigator.navigate_to_listing().await?;
        self.navigator.search(term).await
    }
}
