//! Control surface for a crawl running in the background
//!
//! `start` and `stop` are idempotent; `status` never blocks on the running
//! crawl because it reads the latest published snapshot.

use log::info;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::automation::PageAutomation;
use crate::content_saver::CheckpointFile;
use crate::crawl_engine::{
    CrawlError, CrawlOrchestrator, CrawlReport, CrawlResult, CrawlStatus, StopSignal,
};

/// What a call to [`CrawlController::start`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A run was already in progress; carries its current status.
    AlreadyRunning(CrawlStatus),
}

impl StartOutcome {
    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }
}

pub struct CrawlController<A: PageAutomation + ?Sized + 'static> {
    orchestrator: Arc<Mutex<CrawlOrchestrator<A>>>,
    status_rx: watch::Receiver<CrawlStatus>,
    stop: StopSignal,
    task: Mutex<Option<JoinHandle<CrawlResult<CrawlReport>>>>,
}

impl<A: PageAutomation + ?Sized + 'static> CrawlController<A> {
    pub fn new(orchestrator: CrawlOrchestrator<A>) -> Self {
        Self {
            status_rx: orchestrator.subscribe_status(),
            stop: orchestrator.stop_signal(),
            orchestrator: Arc::new(Mutex::new(orchestrator)),
            task: Mutex::new(None),
        }
    }

    /// Start a run over `terms` in the background.
    ///
    /// When a run is already in progress it is left untouched and its
    /// status is returned instead.
    pub async fn start(&self, terms: Vec<String>) -> StartOutcome {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            info!("Crawl already running, start ignored");
            return StartOutcome::AlreadyRunning(self.status());
        }

        self.stop.reset();
        let orchestrator = Arc::clone(&self.orchestrator);
        *task = Some(tokio::spawn(async move {
            orchestrator.lock().await.run(&terms).await
        }));
        StartOutcome::Started
    }

    /// Request a cooperative stop. The run ends at its next checkpoint
    /// boundary (before a term or a row).
    ///
    /// Returns false when nothing is running.
    pub async fn stop(&self) -> bool {
        let task = self.task.lock().await;
        let active = task.as_ref().is_some_and(|handle| !handle.is_finished())
            || self.status_rx.borrow().is_running;
        if active {
            info!("Stop requested");
            self.stop.request();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn status(&self) -> CrawlStatus {
        self.status_rx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CrawlStatus> {
        self.status_rx.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Wait for the current run and return its report. `None` when no run
    /// was started since the last `wait`.
    pub async fn wait(&self) -> Option<CrawlResult<CrawlReport>> {
        let handle = self.task.lock().await.take()?;
        Some(match handle.await {
            Ok(result) => result,
            Err(e) => Err(CrawlError::Other(format!("Crawl task failed: {e}"))),
        })
    }

    /// Restore progress from a checkpoint. Refused (`None`) while a run is
    /// in progress.
    pub fn resume_from(&self, checkpoint: CheckpointFile) -> Option<usize> {
        self.orchestrator
            .try_lock()
            .ok()
            .map(|mut orchestrator| orchestrator.resume_from(checkpoint))
    }
}
