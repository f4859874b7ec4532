//! Type-safe builder for `CrawlConfig` using the typestate pattern
//!
//! `storage_dir` and `site` must be set, in that order, before `build()` is
//! available. Every other knob can be set at any state.

use std::marker::PhantomData;
use std::path::PathBuf;

use super::errors::ConfigError;
use super::profile::SiteProfile;
use super::types::CrawlConfig;

// Type states for the builder
pub struct WithStorageDir;
pub struct Complete;

pub struct CrawlConfigBuilder<State = ()> {
    pub(crate) draft: CrawlConfig,
    pub(crate) storage_dir: Option<PathBuf>,
    pub(crate) site: Option<SiteProfile>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for CrawlConfigBuilder<()> {
    fn default() -> Self {
        Self {
            draft: CrawlConfig::default(),
            storage_dir: None,
            site: None,
            _phantom: PhantomData,
        }
    }
}

impl CrawlConfig {
    /// Create a builder for configuring a `CrawlConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CrawlConfigBuilder<()> {
        CrawlConfigBuilder::default()
    }
}

impl<State> CrawlConfigBuilder<State> {
    fn into_state<Next>(self) -> CrawlConfigBuilder<Next> {
        CrawlConfigBuilder {
            draft: self.draft,
            storage_dir: self.storage_dir,
            site: self.site,
            _phantom: PhantomData,
        }
    }
}

impl CrawlConfigBuilder<()> {
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> CrawlConfigBuilder<WithStorageDir> {
        self.storage_dir = Some(dir.into());
        self.into_state()
    }
}

impl CrawlConfigBuilder<WithStorageDir> {
    pub fn site(mut self, site: SiteProfile) -> CrawlConfigBuilder<Complete> {
        self.site = Some(site);
        self.into_state()
    }
}

// Build method only available when all required fields are set
impl CrawlConfigBuilder<Complete> {
    pub fn build(self) -> Result<CrawlConfig, ConfigError> {
        let storage_dir = self
            .storage_dir
            .ok_or(ConfigError::Missing("storage_dir"))?;
        let storage_dir = if storage_dir.is_absolute() {
            storage_dir
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&storage_dir))
                .unwrap_or(storage_dir)
        };

        let config = CrawlConfig {
            storage_dir,
            site: self.site.ok_or(ConfigError::Missing("site"))?,
            ..self.draft
        };
        config.validate()?;
        Ok(config)
    }
}
