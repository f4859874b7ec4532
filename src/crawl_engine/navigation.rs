//! Listing navigation
//!
//! Brings the page to the listing grid, issues searches, classifies what a
//! search left behind and dismisses modal popups.

use log::{debug, info, warn};

use super::attempt::{attempt, pause, with_page_timeout};
use super::crawl_types::SearchOutcome;
use crate::automation::{AutomationResult, PageAutomation};
use crate::config::CrawlConfig;

pub struct ListingNavigator<'a, A: PageAutomation + ?Sized> {
    page: &'a A,
    config: &'a CrawlConfig,
}

impl<'a, A: PageAutomation + ?Sized> ListingNavigator<'a, A> {
    pub fn new(page: &'a A, config: &'a CrawlConfig) -> Self {
        Self { page, config }
    }

    /// Load the start page and walk the menu chain to the listing.
    ///
    /// Safe to call at any point, including right after a detail excursion.
    /// A failed menu step is returned to the caller.
    pub async fn navigate_to_listing(&self) -> AutomationResult<()> {
        let site = self.config.site();
        info!("[NAVIGATE] Opening listing from {}", site.start_url);
        self.page.goto(&site.start_url).await?;
        pause(self.config.step_delay()).await;

        let steps = site.menu_path.len();
        for (i, menu) in site.menu_path.iter().enumerate() {
            debug!("[NAVIGATE] Menu step {}/{}: {}", i + 1, steps, menu);
            self.page
                .wait_for(menu, self.config.element_timeout())
                .await
                .inspect_err(|e| warn!("[NAVIGATE] Menu step {} not found: {e}", i + 1))?;
            with_page_timeout(
                self.page.click(menu),
                self.config.element_timeout(),
                "menu click",
            )
            .await
            .inspect_err(|e| warn!("[NAVIGATE] Menu step {} click failed: {e}", i + 1))?;
            pause(self.config.settle_delay()).await;
        }
        pause(self.config.step_delay()).await;

        if let Some(page_size) = &site.page_size {
            let applied = attempt(
                self.page.select_option(&page_size.select, &page_size.option),
                "page size",
            )
            .await;
            if applied.is_some() {
                debug!("[NAVIGATE] Page size set to {}", page_size.option);
                pause(self.config.step_delay()).await;
            } else {
                warn!("[NAVIGATE] Page size selector unavailable, keeping site default");
            }
        }

        info!("[NAVIGATE] Listing ready");
        Ok(())
    }

    /// Type `term` into the search box and submit it.
    pub async fn search(&self, term: &str) -> AutomationResult<()> {
        let input = &self.config.site().search_input;
        info!("[SEARCH] Searching for '{}'", term);
        self.page
            .wait_for(input, self.config.element_timeout())
            .await?;
        self.page.type_text(input, term).await?;
        self.page.submit(input).await?;
        pause(self.config.step_delay()).await;
        Ok(())
    }

    /// Whether the results table is present and visible.
    pub async fn table_present(&self) -> bool {
        let table = &self.config.site().results_table;
        if self
            .page
            .wait_for(table, self.config.element_timeout())
            .await
            .is_err()
        {
            return false;
        }
        self.page.is_displayed(table).await.unwrap_or(false)
    }

    /// Classify the page after a search.
    pub async fn classify(&self) -> SearchOutcome {
        let site = self.config.site();
        if self.page.is_displayed(&site.no_results).await.unwrap_or(false) {
            return SearchOutcome::NoResults;
        }
        if !self.table_present().await {
            return SearchOutcome::TableMissing;
        }
        SearchOutcome::ResultsFound(self.count_rows().await)
    }

    /// Consecutive visible rows, probed through the anchor column up to the
    /// per-term cap.
    pub async fn count_rows(&self) -> usize {
        let site = self.config.site();
        let cap = self.config.max_rows_per_term();
        let mut rows = 0;
        while rows < cap {
            let anchor = site.cell(rows, site.anchor_column);
            if !self.page.is_displayed(&anchor).await.unwrap_or(false) {
                break;
            }
            rows += 1;
        }
        rows
    }

    /// Try each popup dismisser in order. Returns the index of the one that
    /// worked, `None` when no popup was showing.
    pub async fn dismiss_popups(&self) -> Option<usize> {
        for (i, dismisser) in self.config.site().popup_dismissers.iter().enumerate() {
            if !self.page.is_displayed(dismisser).await.unwrap_or(false) {
                continue;
            }
            if attempt(self.page.click(dismisser), "popup dismiss")
                .await
                .is_some()
            {
                debug!("[POPUP] Dismissed with strategy {}", i + 1);
                pause(self.config.settle_delay()).await;
                return Some(i);
            }
        }
        None
    }
}
