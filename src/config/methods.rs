//! Builder methods available for all states
//!
//! This module contains methods that can be called on the builder
//! regardless of its current type state.

use std::path::PathBuf;

use super::builder::CrawlConfigBuilder;
use crate::lookup::LookupConfig;

impl<State> CrawlConfigBuilder<State> {
    #[must_use]
    pub fn search_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft.search_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.draft.download_dir = Some(dir.into());
        self
    }

    /// Cap on rows processed per term (default: 10)
    #[must_use]
    pub fn max_rows_per_term(mut self, rows: usize) -> Self {
        self.draft.max_rows_per_term = rows;
        self
    }

    #[must_use]
    pub fn inter_term_delay_ms(mut self, ms: u64) -> Self {
        self.draft.inter_term_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn step_delay_ms(mut self, ms: u64) -> Self {
        self.draft.step_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.draft.settle_delay_ms = ms;
        self
    }

    /// Zero every courtesy delay. Used against local or scripted pages.
    #[must_use]
    pub fn without_delays(self) -> Self {
        self.inter_term_delay_ms(0).step_delay_ms(0).settle_delay_ms(0)
    }

    #[must_use]
    pub fn element_timeout_secs(mut self, secs: u64) -> Self {
        self.draft.element_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.draft.navigation_timeout_secs = secs;
        self
    }

    /// Interval between periodic checkpoints (default: 300 seconds)
    #[must_use]
    pub fn checkpoint_interval_secs(mut self, secs: u64) -> Self {
        self.draft.checkpoint_interval_secs = secs;
        self
    }

    /// Reset-and-search attempts after the navigate-back (default: 2)
    #[must_use]
    pub fn max_recovery_retries(mut self, retries: u32) -> Self {
        self.draft.max_recovery_retries = retries;
        self
    }

    #[must_use]
    pub fn extract_details(mut self, enabled: bool) -> Self {
        self.draft.extract_details = enabled;
        self
    }

    #[must_use]
    pub fn download_notices(mut self, enabled: bool) -> Self {
        self.draft.download_notices = enabled;
        self
    }

    /// Set browser headless mode (visible vs invisible browser window)
    ///
    /// Headless is the default. A visible window helps when adjusting a site
    /// profile's locators.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.draft.headless = headless;
        self
    }

    /// Enable the request-based detail lookup session.
    #[must_use]
    pub fn lookup(mut self, lookup: LookupConfig) -> Self {
        self.draft.lookup = Some(lookup);
        self
    }
}
