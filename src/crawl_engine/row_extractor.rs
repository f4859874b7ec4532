//! Grid row extraction

use log::{debug, info};

use super::attempt::attempt;
use crate::automation::PageAutomation;
use crate::config::CrawlConfig;
use crate::record::{BasicFields, normalize_date};

pub struct RowExtractor<'a, A: PageAutomation + ?Sized> {
    page: &'a A,
    config: &'a CrawlConfig,
}

impl<'a, A: PageAutomation + ?Sized> RowExtractor<'a, A> {
    pub fn new(page: &'a A, config: &'a CrawlConfig) -> Self {
        Self { page, config }
    }

    /// Read the configured fields of row `row_index`.
    ///
    /// Each field is read independently; a failed read records `None`. An
    /// empty map means the row is unreadable and should be skipped.
    pub async fn extract(&self, row_index: usize) -> BasicFields {
        let site = self.config.site();

        let anchor = site.cell(row_index, site.anchor_column);
        if !self.page.is_displayed(&anchor).await.unwrap_or(false) {
            debug!("[EXTRACT] Row {} has no anchor cell", row_index);
            return BasicFields::new();
        }

        let mut fields = BasicFields::new();
        let mut any_read = false;
        for field in &site.row_fields {
            let cell = site.cell(row_index, field.column);
            let scope = format!("row {row_index} / {}", field.name);
            let value = attempt(self.page.read_text(&cell), &scope)
                .await
                .map(|text| {
                    let text = text.trim();
                    if site.date_fields.contains(&field.name) {
                        normalize_date(text)
                    } else {
                        text.to_string()
                    }
                });
            any_read |= value.is_some();
            fields.insert(field.name.clone(), value);
        }

        if !any_read {
            debug!("[EXTRACT] Row {} unreadable", row_index);
            return BasicFields::new();
        }

        let rules = &site.validation;
        info!(
            "[EXTRACT] Row {}: {} / {}",
            row_index,
            fields
                .get(&rules.bid_number_field)
                .and_then(Option::as_deref)
                .unwrap_or("-"),
            fields
                .get(&rules.title_field)
                .and_then(Option::as_deref)
                .unwrap_or("-"),
        );
        fields
    }
}
