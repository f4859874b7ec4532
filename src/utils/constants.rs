//! Shared configuration constants for bidscrape
//!
//! Default values used by `CrawlConfig` and the builder so the two never
//! drift apart.

/// Rows processed per search term, regardless of how many the grid shows.
pub const DEFAULT_MAX_ROWS_PER_TERM: usize = 10;

/// Courtesy pause between two search terms.
pub const DEFAULT_INTER_TERM_DELAY_MS: u64 = 3_000;

/// Pause after a navigation or search step, letting the grid render.
pub const DEFAULT_STEP_DELAY_MS: u64 = 2_000;

/// Pause after a click (menu entry, popup button, checkbox).
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1_000;

/// Upper bound for a single element wait.
pub const DEFAULT_ELEMENT_TIMEOUT_SECS: u64 = 10;

/// Upper bound for a page load.
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// Wall-clock interval between periodic checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL_SECS: u64 = 300;

/// Reset-and-search attempts after the initial navigate-back.
pub const DEFAULT_MAX_RECOVERY_RETRIES: u32 = 2;

/// Upper bound for serializing and writing one snapshot.
pub const SNAPSHOT_WRITE_TIMEOUT_SECS: u64 = 10;

/// Keywords crawled when the configuration names none.
pub const DEFAULT_SEARCH_TERMS: &[&str] = &[
    "LMS",
    "증강현실",
    "가상현실",
    "메타버스",
    "교재 개발",
    "교육과정 개발",
];

/// Chrome user agent presented by the launched browser.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
