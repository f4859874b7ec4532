//! Detail excursions
//!
//! Opens one row's detail view, reads the registered sections, optionally
//! requests the official notice file, and always returns to the listing.

use log::{debug, info, warn};

use super::attempt::{attempt, attempt_or_default, pause};
use super::navigation::ListingNavigator;
use crate::automation::{AutomationResult, Locator, PageAutomation};
use crate::config::{CrawlConfig, FileDownloadSpec, SectionKind, SectionSpec};
use crate::record::{DetailSections, DocumentDescriptor, SectionContent, clean_text};

pub struct DetailExtractor<'a, A: PageAutomation + ?Sized> {
    page: &'a A,
    config: &'a CrawlConfig,
    navigator: ListingNavigator<'a, A>,
}

impl<'a, A: PageAutomation + ?Sized> DetailExtractor<'a, A> {
    pub fn new(page: &'a A, config: &'a CrawlConfig) -> Self {
        Self {
            page,
            config,
            navigator: ListingNavigator::new(page, config),
        }
    }

    /// Visit the detail view of `row_index` and collect its sections.
    ///
    /// The return to the listing runs whether or not the visit succeeded; a
    /// failed visit yields an empty map.
    pub async fn extract_detail(&self, row_index: usize) -> DetailSections {
        let windows_before = attempt_or_default(self.page.window_handles(), "window handles").await;

        let visit = self.visit(row_index).await;

        self.inspect_windows(&windows_before).await;
        self.return_to_list().await;

        match visit {
            Ok(sections) => {
                info!(
                    "[DETAIL] Row {}: {} section(s) collected",
                    row_index,
                    sections.len()
                );
                sections
            }
            Err(e) => {
                warn!("[DETAIL] Row {} detail view failed: {e}", row_index);
                DetailSections::new()
            }
        }
    }

    async fn visit(&self, row_index: usize) -> AutomationResult<DetailSections> {
        let site = self.config.site();
        let title = site.cell(row_index, site.title_column);
        self.page
            .wait_for(&title, self.config.element_timeout())
            .await?;
        self.page.click(&title).await?;
        pause(self.config.step_delay()).await;

        self.navigator.dismiss_popups().await;

        let mut sections = DetailSections::new();
        for spec in &site.sections {
            if let Some(content) = self.read_section(spec).await {
                sections.insert(spec.name.clone(), content);
            }
        }
        Ok(sections)
    }

    async fn read_section(&self, spec: &SectionSpec) -> Option<SectionContent> {
        match &spec.kind {
            SectionKind::Text { locator } => {
                let raw = attempt(self.page.read_text(locator), &spec.name).await?;
                Some(SectionContent::Text(clean_text(&raw)))
            }
            SectionKind::DocumentList {
                locator,
                row_locator,
                label_cell,
                link,
                button,
            } => {
                let present = attempt_or_default(self.page.count(locator), &spec.name).await;
                if present == 0 {
                    debug!("[DETAIL] Section {} absent", spec.name);
                    return None;
                }
                let rows = locator.join(row_locator);
                let row_count = attempt_or_default(self.page.count(&rows), &spec.name).await;
                let download = self.download_spec_for(&spec.name);

                let mut documents = Vec::with_capacity(row_count);
                for i in 0..row_count {
                    let row = rows.nth(i);
                    let mut doc = self
                        .read_document(&row, label_cell.as_deref(), link, button)
                        .await;
                    if doc.is_blank() {
                        continue;
                    }
                    if let Some(download) = download
                        && download.matches(&doc.label)
                    {
                        doc.download_requested = self.request_download(&row, download).await;
                    }
                    documents.push(doc);
                }
                Some(SectionContent::Documents(documents))
            }
        }
    }

    async fn read_document(
        &self,
        row: &Locator,
        label_cell: Option<&str>,
        link: &str,
        button: &str,
    ) -> DocumentDescriptor {
        let label_locator = label_cell.map_or_else(|| row.clone(), |cell| row.join(cell));
        let label = attempt_or_default(self.page.read_text(&label_locator), "document label").await;

        let link = row.join(link);
        let file_name = match attempt(self.page.read_text(&link), "document link").await {
            Some(name) => name,
            None => attempt_or_default(self.page.read_text(&row.join(button)), "document button").await,
        };
        let download_link = attempt(self.page.read_attribute(&link, "href"), "document href")
            .await
            .flatten()
            .filter(|href| !href.trim().is_empty());

        DocumentDescriptor {
            label: label.trim().to_string(),
            file_name: file_name.trim().to_string(),
            download_link,
            download_requested: false,
        }
    }

    fn download_spec_for(&self, section: &str) -> Option<&'a FileDownloadSpec> {
        if !self.config.download_notices() {
            return None;
        }
        self.config
            .site()
            .file_download
            .as_ref()
            .filter(|spec| spec.section == section)
    }

    /// Tick the row checkbox and press the download button. Completion is
    /// not awaited; the browser writes the file on its own schedule.
    async fn request_download(&self, row: &Locator, spec: &FileDownloadSpec) -> bool {
        let checkbox = row.join(&spec.checkbox);
        let result: AutomationResult<()> = async {
            if !self.page.is_selected(&checkbox).await? {
                self.page.click(&checkbox).await?;
                pause(self.config.settle_delay()).await;
            }
            self.page
                .wait_for(&spec.download_button, self.config.element_timeout())
                .await?;
            self.page.click(&spec.download_button).await?;
            pause(self.config.step_delay()).await;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("[DOWNLOAD] Notice download requested");
                true
            }
            Err(e) => {
                warn!("[DOWNLOAD] Notice download failed: {e}");
                false
            }
        }
    }

    async fn inspect_windows(&self, before: &[String]) {
        let Some(after) = attempt(self.page.window_handles(), "window handles").await else {
            return;
        };
        let opened: Vec<&String> = after.iter().filter(|h| !before.contains(h)).collect();
        if !opened.is_empty() {
            info!("[DETAIL] Excursion opened {} extra window(s)", opened.len());
        }
    }

    async fn return_to_list(&self) {
        if let Err(e) = self.page.navigate_back().await {
            warn!("[DETAIL] Navigate back failed: {e}");
        }
        pause(self.config.step_delay()).await;
    }
}
