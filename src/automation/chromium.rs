//! chromiumoxide-backed page automation
//!
//! Reads and clicks go through in-page XPath evaluation; typing and key
//! presses go through element handles so the page sees trusted input events.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::target::GetTargetsParams;
use chromiumoxide::page::Page;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::errors::{AutomationError, AutomationResult};
use super::js_scripts;
use super::locator::Locator;
use super::PageAutomation;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Deserialize)]
struct Probe<T> {
    found: bool,
    value: Option<T>,
}

/// [`PageAutomation`] over a single chromiumoxide [`Page`].
#[derive(Clone)]
pub struct ChromiumAutomation {
    page: Page,
    navigation_timeout: Duration,
}

impl ChromiumAutomation {
    #[must_use]
    pub fn new(page: Page, navigation_timeout: Duration) -> Self {
        Self {
            page,
            navigation_timeout,
        }
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> AutomationResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| AutomationError::Script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| AutomationError::Script(e.to_string()))
    }

    async fn probe<T: DeserializeOwned>(
        &self,
        locator: &Locator,
        script: String,
    ) -> AutomationResult<Option<T>> {
        let probe: Probe<T> = self.eval(script).await?;
        if !probe.found {
            return Err(AutomationError::ElementNotFound(locator.to_string()));
        }
        Ok(probe.value)
    }

    async fn element(&self, locator: &Locator) -> AutomationResult<chromiumoxide::element::Element> {
        self.page
            .find_xpath(locator.as_xpath())
            .await
            .map_err(|_| AutomationError::ElementNotFound(locator.to_string()))
    }
}

/// Current page URL, `about:blank` when unavailable.
pub async fn page_url_with_fallback(page: &Page) -> String {
    match page.url().await {
        Ok(Some(url)) => url,
        Ok(None) => "about:blank".to_string(),
        Err(e) => {
            trace!("Failed to get page URL: {}", e);
            "about:blank".to_string()
        }
    }
}

/// Poll `check` until it succeeds or `timeout` elapses.
///
/// Transient failures keep polling. That covers a script evaluated while a
/// navigation tears down the execution context. A broken browser
/// connection ends the wait at once.
async fn poll_until_present<T, F, Fut>(
    operation: &str,
    timeout: Duration,
    mut check: F,
) -> AutomationResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = AutomationResult<T>>,
{
    let start = tokio::time::Instant::now();
    loop {
        match check().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                if start.elapsed() >= timeout {
                    trace!("{operation}: last failure {e}");
                    return Err(AutomationError::timeout(operation, timeout));
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[async_trait]
impl PageAutomation for ChromiumAutomation {
    async fn goto(&self, url: &str) -> AutomationResult<()> {
        debug!("Navigating to {}", url);
        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| AutomationError::Navigation(e.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| AutomationError::Navigation(e.to_string()))?;
            Ok(())
        };
        match tokio::time::timeout(self.navigation_timeout, navigation).await {
            Ok(result) => result,
            Err(_) => Err(AutomationError::timeout(
                format!("navigation to {url}"),
                self.navigation_timeout,
            )),
        }
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> AutomationResult<()> {
        let start = Instant::now();
        poll_until_present(&format!("waiting for {locator}"), timeout, || async move {
            self.probe::<bool>(locator, js_scripts::exists(locator)).await
        })
        .await?;
        trace!("{} present after {:?}", locator, start.elapsed());
        Ok(())
    }

    async fn is_displayed(&self, locator: &Locator) -> AutomationResult<bool> {
        match self
            .probe::<bool>(locator, js_scripts::is_displayed(locator))
            .await
        {
            Ok(visible) => Ok(visible.unwrap_or(false)),
            Err(AutomationError::ElementNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn count(&self, locator: &Locator) -> AutomationResult<usize> {
        self.eval::<usize>(js_scripts::count(locator)).await
    }

    async fn click(&self, locator: &Locator) -> AutomationResult<()> {
        self.probe::<bool>(locator, js_scripts::click(locator))
            .await
            .map(|_| ())
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> AutomationResult<()> {
        self.probe::<bool>(locator, js_scripts::clear_value(locator))
            .await?;
        let element = self.element(locator).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn submit(&self, locator: &Locator) -> AutomationResult<()> {
        let element = self.element(locator).await?;
        element.press_key("Enter").await?;
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, option: &str) -> AutomationResult<()> {
        let selected = self
            .probe::<bool>(locator, js_scripts::select_option(locator, option))
            .await?
            .unwrap_or(false);
        if selected {
            Ok(())
        } else {
            Err(AutomationError::ElementNotFound(format!(
                "option '{option}' in {locator}"
            )))
        }
    }

    async fn read_text(&self, locator: &Locator) -> AutomationResult<String> {
        Ok(self
            .probe::<String>(locator, js_scripts::inner_text(locator))
            .await?
            .unwrap_or_default())
    }

    async fn read_attribute(&self, locator: &Locator, name: &str) -> AutomationResult<Option<String>> {
        self.probe::<String>(locator, js_scripts::attribute(locator, name))
            .await
    }

    async fn is_selected(&self, locator: &Locator) -> AutomationResult<bool> {
        Ok(self
            .probe::<bool>(locator, js_scripts::is_checked(locator))
            .await?
            .unwrap_or(false))
    }

    async fn navigate_back(&self) -> AutomationResult<()> {
        let before = page_url_with_fallback(&self.page).await;
        self.eval::<bool>(js_scripts::HISTORY_BACK.to_string())
            .await
            .map_err(|e| AutomationError::Navigation(e.to_string()))?;
        debug!("History back from {}", before);
        Ok(())
    }

    async fn window_handles(&self) -> AutomationResult<Vec<String>> {
        let targets = self.page.execute(GetTargetsParams::default()).await?;
        Ok(targets
            .result
            .target_infos
            .iter()
            .filter(|info| info.r#type == "page")
            .map(|info| info.target_id.inner().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn script_failures_keep_polling_until_present() {
        let calls = AtomicUsize::new(0);
        let result = poll_until_present("waiting for grid", Duration::from_secs(5), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                match n {
                    0 => Err(AutomationError::Script(
                        "Execution context was destroyed".into(),
                    )),
                    1 => Err(AutomationError::ElementNotFound("grid".into())),
                    _ => Ok(()),
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_script_failure_times_out() {
        let result: AutomationResult<()> =
            poll_until_present("waiting for grid", Duration::from_secs(1), || async {
                Err(AutomationError::Script("Cannot find context".into()))
            })
            .await;

        assert!(matches!(result, Err(AutomationError::Timeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn browser_failure_ends_the_wait() {
        let calls = AtomicUsize::new(0);
        let result: AutomationResult<()> =
            poll_until_present("waiting for grid", Duration::from_secs(5), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AutomationError::Browser("connection closed".into())) }
            })
            .await;

        assert!(matches!(result, Err(AutomationError::Browser(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
