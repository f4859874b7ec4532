//! Event system for push-style crawl progress
//!
//! The orchestrator publishes lifecycle events and status snapshots here;
//! presentation layers subscribe without touching crawl state.

pub mod bus;
pub mod errors;
pub mod types;

// Re-exports for public API
pub use bus::{CrawlEventBus, next_event};
pub use errors::EventBusError;
pub use types::{CrawlEvent, ShutdownReason};
