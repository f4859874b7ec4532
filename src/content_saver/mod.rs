//! Snapshot persistence for crawl runs

// Module declarations
mod json_saver;
mod schema;

// Re-export public API from json_saver module
pub use json_saver::{CHECKPOINT_PREFIX, FINAL_PREFIX, PersistenceLayer, load_latest_checkpoint};

// Re-export public API from schema module
pub use schema::{CheckpointFile, FinalResultFile, RunMetadata, RunSummary, SNAPSHOT_TIMESTAMP_FORMAT};
