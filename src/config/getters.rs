//! Getter methods for `CrawlConfig`

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::profile::SiteProfile;
use super::types::CrawlConfig;
use crate::lookup::LookupConfig;

impl CrawlConfig {
    #[must_use]
    pub fn storage_dir(&self) -> &PathBuf {
        &self.storage_dir
    }

    /// Notice download directory, `<storage_dir>/downloads` when unset.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| self.storage_dir.join("downloads"))
    }

    #[must_use]
    pub fn search_terms(&self) -> &[String] {
        &self.search_terms
    }

    #[must_use]
    pub fn max_rows_per_term(&self) -> usize {
        self.max_rows_per_term
    }

    #[must_use]
    pub fn inter_term_delay(&self) -> Duration {
        Duration::from_millis(self.inter_term_delay_ms)
    }

    #[must_use]
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    #[must_use]
    pub fn checkpoint_interval(&self) -> Duration {
        Duration::from_secs(self.checkpoint_interval_secs)
    }

    #[must_use]
    pub fn max_recovery_retries(&self) -> u32 {
        self.max_recovery_retries
    }

    #[must_use]
    pub fn extract_details(&self) -> bool {
        self.extract_details
    }

    #[must_use]
    pub fn download_notices(&self) -> bool {
        self.download_notices
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn lookup(&self) -> Option<&LookupConfig> {
        self.lookup.as_ref()
    }

    #[must_use]
    pub fn site(&self) -> &SiteProfile {
        &self.site
    }

    /// Override the storage directory, e.g. from a command line flag.
    pub fn set_storage_dir(&mut self, dir: impl AsRef<Path>) {
        self.storage_dir = dir.as_ref().to_path_buf();
    }
}
