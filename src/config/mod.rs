//! Configuration module for bid crawling
//!
//! This module provides the `CrawlConfig` struct, its type-safe builder and
//! the site profile describing where everything sits on the target pages.

// Sub-modules
pub mod builder;
pub mod errors;
pub mod getters;
pub mod methods;
pub mod profile;
pub mod types;

// Re-exports for public API
pub use builder::{Complete, CrawlConfigBuilder, WithStorageDir};
pub use errors::ConfigError;
pub use profile::{
    CellTemplate, FileDownloadSpec, PageSizeSpec, RowField, SectionKind, SectionSpec, SiteProfile,
    ValidationRules,
};
pub use types::CrawlConfig;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builder_requires_storage_and_site() {
        let config = CrawlConfig::builder()
            .storage_dir("/tmp/bids")
            .site(SiteProfile::default())
            .without_delays()
            .max_rows_per_term(3)
            .build()
            .unwrap();
        assert_eq!(config.max_rows_per_term(), 3);
        assert_eq!(config.step_delay().as_millis(), 0);
        assert_eq!(config.checkpoint_interval().as_secs(), 300);
        assert_eq!(config.download_dir(), std::path::PathBuf::from("/tmp/bids/downloads"));
    }

    #[test]
    fn zero_row_cap_is_rejected() {
        let err = CrawlConfig::builder()
            .storage_dir("/tmp/bids")
            .site(SiteProfile::default())
            .max_rows_per_term(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn partial_json_takes_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "storage_dir": "/data/out", "search_terms": ["VR"], "download_notices": true }}"#
        )
        .unwrap();
        let config = CrawlConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.search_terms(), ["VR".to_string()]);
        assert!(config.download_notices());
        assert_eq!(config.max_rows_per_term(), 10);
        assert_eq!(config.max_recovery_retries(), 2);
        assert_eq!(config.site().title_column, 6);
    }

    #[test]
    fn unknown_download_section_is_rejected() {
        let mut site = SiteProfile::default();
        if let Some(download) = site.file_download.as_mut() {
            download.section = "missing".into();
        }
        let result = CrawlConfig::builder()
            .storage_dir("/tmp/bids")
            .site(site)
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_start_url_is_rejected() {
        let site = SiteProfile {
            start_url: "not a url".into(),
            ..SiteProfile::default()
        };
        let result = CrawlConfig::builder()
            .storage_dir("/tmp/bids")
            .site(site)
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
