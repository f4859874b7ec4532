pub mod automation;
pub mod browser_setup;
pub mod config;
pub mod content_saver;
pub mod crawl_engine;
pub mod crawl_events;
pub mod lookup;
pub mod record;
pub mod session;
pub mod utils;

pub use automation::{AutomationError, AutomationResult, ChromiumAutomation, Locator, PageAutomation};
pub use browser_setup::{
    configure_downloads, download_managed_browser, find_browser_executable, launch_browser,
};
pub use config::{CrawlConfig, SiteProfile};
pub use content_saver::{CheckpointFile, FinalResultFile, PersistenceLayer, load_latest_checkpoint};
pub use crawl_engine::{
    CompletionStatus, CrawlError, CrawlOrchestrator, CrawlReport, CrawlResult, CrawlStatus,
    StopSignal, TermOutcome,
};
pub use crawl_events::{CrawlEvent, CrawlEventBus};
pub use lookup::{BidLookupClient, DetailLookup, LookupConfig};
pub use record::{BidRecord, DocumentDescriptor, SectionContent};
pub use session::{CrawlController, StartOutcome};
