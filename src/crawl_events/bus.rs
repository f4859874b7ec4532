//! Event bus for publishing and subscribing to crawl events
//!
//! A thin layer over `tokio::sync::broadcast`. Publishing is best-effort: a
//! crawl never waits on, or fails because of, its observers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Notify, broadcast};

use super::errors::EventBusError;
use super::types::{CrawlEvent, ShutdownReason};

/// Event bus for publishing and subscribing to crawl events
#[derive(Debug)]
pub struct CrawlEventBus {
    sender: broadcast::Sender<CrawlEvent>,
    shutdown: Arc<Notify>,
    shutdown_flag: Arc<AtomicBool>,
    events_published: AtomicU64,
    events_dropped: AtomicU64,
}

impl CrawlEventBus {
    /// Create a new event bus buffering up to `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            shutdown: Arc::new(Notify::new()),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            events_published: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
        }
    }

    /// Publish an event to all subscribers
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of active subscribers that received the event
    /// * `Err(EventBusError)` - No subscribers, or the bus was shut down
    pub async fn publish(&self, event: CrawlEvent) -> Result<usize, EventBusError> {
        if self.is_shutdown() && !matches!(event, CrawlEvent::Shutdown { .. }) {
            return Err(EventBusError::Shutdown);
        }
        match self.sender.send(event) {
            Ok(subscribers) => {
                self.events_published.fetch_add(1, Ordering::Relaxed);
                Ok(subscribers)
            }
            Err(_) => {
                self.events_dropped.fetch_add(1, Ordering::Relaxed);
                log::debug!("Published event but no active subscribers");
                Err(EventBusError::NoSubscribers)
            }
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events delivered to at least one subscriber
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Events published while nobody was listening
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    /// Publish a shutdown event and wake everyone waiting on
    /// [`wait_for_shutdown`](Self::wait_for_shutdown). Idempotent.
    pub async fn shutdown(&self, reason: ShutdownReason) {
        if self.shutdown_flag.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("Event bus shutdown: {reason:?}");
        let _ = self.publish(CrawlEvent::shutdown(reason)).await;
        self.shutdown.notify_waiters();
    }

    pub async fn wait_for_shutdown(&self) {
        if self.is_shutdown() {
            return;
        }
        self.shutdown.notified().await;
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }
}

/// Receive the next event, mapping channel conditions to [`EventBusError`].
pub async fn next_event(
    receiver: &mut broadcast::Receiver<CrawlEvent>,
) -> Result<CrawlEvent, EventBusError> {
    match receiver.recv().await {
        Ok(event) => Ok(event),
        Err(broadcast::error::RecvError::Lagged(missed)) => {
            Err(EventBusError::ReceiverLagged(missed))
        }
        Err(broadcast::error::RecvError::Closed) => Err(EventBusError::Shutdown),
    }
}
