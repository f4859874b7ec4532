use anyhow::{Context, Result};
use log::{debug, info};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::time::timeout;

use super::schema::{CheckpointFile, FinalResultFile};
use crate::utils::SNAPSHOT_WRITE_TIMEOUT_SECS;

pub const CHECKPOINT_PREFIX: &str = "crawling_progress_";
pub const FINAL_PREFIX: &str = "final_results_";

/// Collision suffixes tried before giving up on a name.
const MAX_NAME_SUFFIX: u32 = 100;

/// Writes timestamp-named JSON snapshots into one directory.
///
/// Every write goes to a temp file in the target directory and is then
/// renamed into place without clobbering, so an interrupted write never
/// leaves a truncated snapshot and an existing snapshot is never replaced.
#[derive(Debug, Clone)]
pub struct PersistenceLayer {
    dir: PathBuf,
    write_timeout: Duration,
}

impl PersistenceLayer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_timeout: Duration::from_secs(SNAPSHOT_WRITE_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save a progress checkpoint.
    pub async fn checkpoint(&self, file: &CheckpointFile) -> Result<PathBuf> {
        let path = self.save(CHECKPOINT_PREFIX, file).await?;
        info!(
            "[CHECKPOINT] Saved {} record(s) to {}",
            file.results.len(),
            path.display()
        );
        Ok(path)
    }

    /// Save the end-of-run snapshot.
    pub async fn final_save(&self, file: &FinalResultFile) -> Result<PathBuf> {
        let path = self.save(FINAL_PREFIX, file).await?;
        info!(
            "[CHECKPOINT] Final results ({} record(s)) saved to {}",
            file.snapshot.results.len(),
            path.display()
        );
        Ok(path)
    }

    async fn save<T: serde::Serialize>(&self, prefix: &str, document: &T) -> Result<PathBuf> {
        let json = serde_json::to_vec_pretty(document).context("Failed to serialize snapshot")?;
        let dir = self.dir.clone();
        let stem = format!(
            "{prefix}{}",
            chrono::Local::now().format("%Y%m%d_%H%M%S_%6f")
        );

        let blocking_task = tokio::task::spawn_blocking(move || write_new_file(&dir, &stem, &json));
        match timeout(self.write_timeout, blocking_task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(anyhow::anyhow!("Snapshot write task panicked: {}", e)),
            Err(_) => {
                log::warn!("Snapshot write timeout (timeout: {:?})", self.write_timeout);
                Err(anyhow::anyhow!(
                    "Snapshot write timed out after {:?}",
                    self.write_timeout
                ))
            }
        }
    }
}

fn write_new_file(dir: &Path, stem: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir).context("Failed to create temp file")?;
    tmp.write_all(bytes).context("Failed to write snapshot")?;
    tmp.as_file().sync_all().context("Failed to sync snapshot")?;

    let mut suffix = 0;
    loop {
        let name = if suffix == 0 {
            format!("{stem}.json")
        } else {
            format!("{stem}_{suffix}.json")
        };
        let target = dir.join(name);
        match tmp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists && suffix < MAX_NAME_SUFFIX => {
                debug!("{} exists, trying next suffix", target.display());
                tmp = e.file;
                suffix += 1;
            }
            Err(e) => {
                return Err(e.error)
                    .with_context(|| format!("Failed to persist {}", target.display()));
            }
        }
    }
}

/// Load the newest checkpoint in `dir`, if any.
///
/// Names embed a sortable timestamp, so the lexically greatest one is the
/// newest.
pub async fn load_latest_checkpoint(dir: &Path) -> Result<Option<(PathBuf, CheckpointFile)>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", dir.display())),
    };

    let mut latest: Option<PathBuf> = None;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_checkpoint = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(CHECKPOINT_PREFIX) && n.ends_with(".json"));
        if is_checkpoint && latest.as_ref().is_none_or(|best| path > *best) {
            latest = Some(path);
        }
    }

    let Some(path) = latest else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let checkpoint: CheckpointFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("Malformed checkpoint {}", path.display()))?;
    Ok(Some((path, checkpoint)))
}
