//! Error types for page automation

use std::time::Duration;
use thiserror::Error;

/// Result type alias for page automation calls
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Failures reported by a [`PageAutomation`](super::PageAutomation) backend
#[derive(Debug, Clone, Error)]
pub enum AutomationError {
    /// Locator matched nothing on the current page
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Wait or operation exceeded its deadline
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// Page navigation failed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// In-page script failed or returned an unexpected shape
    #[error("Script evaluation failed: {0}")]
    Script(String),

    /// Browser communication failure
    #[error("Browser error: {0}")]
    Browser(String),
}

impl AutomationError {
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Whether the failure leaves the page usable (a missing element or a slow
    /// wait) as opposed to a broken browser connection.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound(_) | Self::Timeout { .. } | Self::Script(_)
        )
    }
}

impl From<chromiumoxide::error::CdpError> for AutomationError {
    fn from(error: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(error.to_string())
    }
}
