//! Page automation client
//!
//! The crawl engine never talks to a browser directly. It drives a page
//! through [`PageAutomation`], which keeps every component testable against a
//! scripted page and lets the real backend stay a thin chromiumoxide adapter.

pub mod chromium;
pub mod errors;
pub mod js_scripts;
pub mod locator;

use async_trait::async_trait;
use std::time::Duration;

pub use chromium::ChromiumAutomation;
pub use errors::{AutomationError, AutomationResult};
pub use locator::Locator;

/// Element-level operations against the current page.
///
/// Implementations report missing elements as
/// [`AutomationError::ElementNotFound`] and never panic on absent markup.
#[async_trait]
pub trait PageAutomation: Send + Sync {
    /// Load `url` and wait for the navigation to settle.
    async fn goto(&self, url: &str) -> AutomationResult<()>;

    /// Wait until `locator` matches something, or fail with
    /// [`AutomationError::Timeout`].
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> AutomationResult<()>;

    /// Whether `locator` matches a visible element. Absence is `Ok(false)`.
    async fn is_displayed(&self, locator: &Locator) -> AutomationResult<bool>;

    /// Number of nodes matched by `locator`.
    async fn count(&self, locator: &Locator) -> AutomationResult<usize>;

    async fn click(&self, locator: &Locator) -> AutomationResult<()>;

    /// Replace the content of an input with `text`.
    async fn type_text(&self, locator: &Locator, text: &str) -> AutomationResult<()>;

    /// Press Enter on an input.
    async fn submit(&self, locator: &Locator) -> AutomationResult<()>;

    /// Choose the `<option>` of a `<select>` whose visible text is `option`.
    async fn select_option(&self, locator: &Locator, option: &str) -> AutomationResult<()>;

    async fn read_text(&self, locator: &Locator) -> AutomationResult<String>;

    async fn read_attribute(&self, locator: &Locator, name: &str) -> AutomationResult<Option<String>>;

    /// Checked state of a checkbox or radio input.
    async fn is_selected(&self, locator: &Locator) -> AutomationResult<bool>;

    /// Browser history back.
    async fn navigate_back(&self) -> AutomationResult<()>;

    /// Identifiers of the open top-level windows.
    async fn window_handles(&self) -> AutomationResult<Vec<String>>;
}
