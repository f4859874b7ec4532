//! Attempt combinators for page operations
//!
//! Transient UI failures are absorbed at the smallest enclosing unit (one
//! field, one section, one document row). These helpers give that policy a
//! single shape instead of a hand-written match at every call site.

use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

use crate::automation::{AutomationError, AutomationResult};

/// Run `operation`, turning a failure into `None`.
///
/// `scope` names the unit in the debug log, e.g. `row 3 / title`.
pub async fn attempt<T, F>(operation: F, scope: &str) -> Option<T>
where
    F: Future<Output = AutomationResult<T>>,
{
    match operation.await {
        Ok(value) => Some(value),
        Err(e) if e.is_transient() => {
            debug!(target: "bidscrape::attempt", "{scope}: {e}");
            None
        }
        Err(e) => {
            warn!(target: "bidscrape::attempt", "{scope}: {e}");
            None
        }
    }
}

/// Run `operation`, turning a failure into `T::default()`.
pub async fn attempt_or_default<T, F>(operation: F, scope: &str) -> T
where
    T: Default,
    F: Future<Output = AutomationResult<T>>,
{
    attempt(operation, scope).await.unwrap_or_default()
}

/// Wrap a page operation with an explicit deadline.
///
/// Backends apply their own waits; this bounds operations that have none,
/// such as a click that triggers a slow synchronous handler.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> AutomationResult<T>
where
    F: Future<Output = AutomationResult<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(AutomationError::timeout(operation_name, timeout)),
    }
}

/// Sleep for `duration`; zero returns immediately.
pub async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
