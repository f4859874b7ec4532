//! Core configuration types for bid crawling
//!
//! `CrawlConfig` carries every tunable of a crawl run. It deserializes from a
//! JSON file with per-field defaults, so a config file only names what it
//! changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::errors::ConfigError;
use super::profile::{SectionKind, SiteProfile};
use crate::lookup::LookupConfig;
use crate::utils::{
    DEFAULT_CHECKPOINT_INTERVAL_SECS, DEFAULT_ELEMENT_TIMEOUT_SECS, DEFAULT_INTER_TERM_DELAY_MS,
    DEFAULT_MAX_RECOVERY_RETRIES, DEFAULT_MAX_ROWS_PER_TERM, DEFAULT_NAVIGATION_TIMEOUT_SECS,
    DEFAULT_SEARCH_TERMS, DEFAULT_SETTLE_DELAY_MS, DEFAULT_STEP_DELAY_MS,
};

/// Main configuration struct for crawl runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Directory receiving checkpoint and final snapshots.
    pub(crate) storage_dir: PathBuf,
    /// Directory the browser saves notice files into.
    pub(crate) download_dir: Option<PathBuf>,
    pub(crate) search_terms: Vec<String>,
    pub(crate) max_rows_per_term: usize,
    pub(crate) inter_term_delay_ms: u64,
    pub(crate) step_delay_ms: u64,
    pub(crate) settle_delay_ms: u64,
    pub(crate) element_timeout_secs: u64,
    pub(crate) navigation_timeout_secs: u64,
    pub(crate) checkpoint_interval_secs: u64,
    pub(crate) max_recovery_retries: u32,
    /// Open each row's detail view.
    pub(crate) extract_details: bool,
    /// Request official notice files during detail excursions.
    pub(crate) download_notices: bool,
    pub(crate) headless: bool,
    pub(crate) lookup: Option<LookupConfig>,
    pub(crate) site: SiteProfile,

    /// Chrome user data directory, chosen per launch
    #[serde(skip)]
    pub(crate) chrome_data_dir: Option<PathBuf>,

    /// Optional event bus for publishing crawl events
    #[serde(skip)]
    pub(crate) event_bus: Option<Arc<crate::crawl_events::CrawlEventBus>>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./output"),
            download_dir: None,
            search_terms: DEFAULT_SEARCH_TERMS.iter().map(|t| (*t).to_string()).collect(),
            max_rows_per_term: DEFAULT_MAX_ROWS_PER_TERM,
            inter_term_delay_ms: DEFAULT_INTER_TERM_DELAY_MS,
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            element_timeout_secs: DEFAULT_ELEMENT_TIMEOUT_SECS,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            checkpoint_interval_secs: DEFAULT_CHECKPOINT_INTERVAL_SECS,
            max_recovery_retries: DEFAULT_MAX_RECOVERY_RETRIES,
            extract_details: true,
            download_notices: false,
            headless: true,
            lookup: None,
            site: SiteProfile::default(),
            chrome_data_dir: None,
            event_bus: None,
        }
    }
}

impl CrawlConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rows_per_term == 0 {
            return Err(ConfigError::Invalid(
                "max_rows_per_term must be at least 1".to_string(),
            ));
        }
        if let Err(e) = url::Url::parse(&self.site.start_url) {
            return Err(ConfigError::Invalid(format!(
                "site.start_url '{}' is not a valid URL: {e}",
                self.site.start_url
            )));
        }
        if let Some(lookup) = &self.lookup
            && let Err(e) = url::Url::parse(&lookup.base_url)
        {
            return Err(ConfigError::Invalid(format!(
                "lookup.base_url '{}' is not a valid URL: {e}",
                lookup.base_url
            )));
        }
        if self.site.row_fields.is_empty() {
            return Err(ConfigError::Invalid("site.row_fields is empty".to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        for field in &self.site.row_fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate row field '{}'",
                    field.name
                )));
            }
        }
        if let Some(download) = &self.site.file_download {
            match self.site.section(&download.section).map(|s| &s.kind) {
                Some(SectionKind::DocumentList { .. }) => {}
                Some(SectionKind::Text { .. }) => {
                    return Err(ConfigError::Invalid(format!(
                        "file_download section '{}' is not a document list",
                        download.section
                    )));
                }
                None => {
                    return Err(ConfigError::Invalid(format!(
                        "file_download section '{}' is not registered",
                        download.section
                    )));
                }
            }
        }
        Ok(())
    }

    /// Attach an event bus for real-time crawl events
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<crate::crawl_events::CrawlEventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    #[must_use]
    pub fn event_bus(&self) -> Option<&Arc<crate::crawl_events::CrawlEventBus>> {
        self.event_bus.as_ref()
    }

    #[must_use]
    pub fn with_chrome_data_dir(mut self, dir: PathBuf) -> Self {
        self.chrome_data_dir = Some(dir);
        self
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&PathBuf> {
        self.chrome_data_dir.as_ref()
    }
}
