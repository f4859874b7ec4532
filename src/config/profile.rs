//! Site profiles
//!
//! Everything site-specific the crawl engine touches lives here: the menu
//! chain leading to the listing, the grid cell layout, the field list, the
//! detail section registry, popup dismissal strategies and the notice file
//! download controls. [`SiteProfile::default`] is the public procurement
//! portal preset; other listings are described by a JSON profile.

use serde::{Deserialize, Serialize};

use crate::automation::Locator;
use crate::record::{BID_NUMBER_FIELD, GENERAL_NOTICE_SECTION, TITLE_FIELD};

const PORTAL_URL: &str = "https://www.g2b.go.kr";
const GRID_PREFIX: &str = "mf_wfm_container_tacBidPbancLst_contents_tab2_body";
const DETAIL_BASE: &str = "/html/body/div[1]/div[3]/div/div[2]/div/div[2]/div[4]/div[1]";
const SEARCH_INPUT_XPATH: &str = "/html/body/div[1]/div[3]/div/div[2]/div/div[2]/div[2]/div/div/div[2]/div/div[1]/div[1]/div[1]/div[1]/table/tbody/tr[1]/td[3]/input";

/// Grid cell id pattern with `{row}` and `{col}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellTemplate(String);

impl CellTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Locator of the cell at (`row`, `col`), both 0-based.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Locator {
        Locator::id(
            &self
                .0
                .replace("{row}", &row.to_string())
                .replace("{col}", &col.to_string()),
        )
    }
}

/// One named grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowField {
    pub name: String,
    pub column: usize,
}

impl RowField {
    fn new(name: &str, column: usize) -> Self {
        Self {
            name: name.to_string(),
            column,
        }
    }
}

/// A detail page section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: SectionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionKind {
    /// Free text read from `locator`.
    Text { locator: Locator },
    /// Rows under `locator` matched by the relative `row_locator`.
    DocumentList {
        locator: Locator,
        row_locator: String,
        /// Relative cell holding the row label. The whole row text when unset.
        #[serde(default)]
        label_cell: Option<String>,
        #[serde(default = "default_link")]
        link: String,
        #[serde(default = "default_button")]
        button: String,
    },
}

fn default_link() -> String {
    ".//a".to_string()
}

fn default_button() -> String {
    ".//button".to_string()
}

impl SectionSpec {
    pub fn text(name: &str, locator: Locator) -> Self {
        Self {
            name: name.to_string(),
            kind: SectionKind::Text { locator },
        }
    }

    pub fn document_list(name: &str, locator: Locator, row_locator: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SectionKind::DocumentList {
                locator,
                row_locator: row_locator.to_string(),
                label_cell: None,
                link: default_link(),
                button: default_button(),
            },
        }
    }

    #[must_use]
    pub fn with_label_cell(mut self, cell: &str) -> Self {
        if let SectionKind::DocumentList { label_cell, .. } = &mut self.kind {
            *label_cell = Some(cell.to_string());
        }
        self
    }
}

/// Controls used to request an official notice file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDownloadSpec {
    /// Document list section whose rows are download candidates.
    pub section: String,
    /// Checkbox relative to the document row.
    pub checkbox: String,
    pub download_button: Locator,
    /// Case-insensitive label substrings marking an official notice.
    pub keywords: Vec<String>,
}

impl FileDownloadSpec {
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| label.contains(&keyword.to_lowercase()))
    }
}

/// Listing page-size selector applied after navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizeSpec {
    pub select: Locator,
    pub option: String,
}

/// Which fields identify and qualify a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub required_fields: Vec<String>,
    pub bid_number_field: String,
    pub title_field: String,
    pub notice_section: String,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            required_fields: vec![TITLE_FIELD.to_string()],
            bid_number_field: BID_NUMBER_FIELD.to_string(),
            title_field: TITLE_FIELD.to_string(),
            notice_section: GENERAL_NOTICE_SECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    pub start_url: String,
    /// Clicked in order after loading `start_url`.
    pub menu_path: Vec<Locator>,
    #[serde(default)]
    pub page_size: Option<PageSizeSpec>,
    pub search_input: Locator,
    pub results_table: Locator,
    pub no_results: Locator,
    pub cell_template: CellTemplate,
    /// Column probed to decide whether a row exists.
    #[serde(default)]
    pub anchor_column: usize,
    /// Column clicked to open the detail view.
    pub title_column: usize,
    pub row_fields: Vec<RowField>,
    /// Fields reduced to their date part.
    #[serde(default)]
    pub date_fields: Vec<String>,
    pub sections: Vec<SectionSpec>,
    /// Tried in order, first success wins.
    #[serde(default)]
    pub popup_dismissers: Vec<Locator>,
    #[serde(default)]
    pub file_download: Option<FileDownloadSpec>,
    #[serde(default)]
    pub validation: ValidationRules,
}

impl Default for SiteProfile {
    fn default() -> Self {
        let detail = |path: &str| Locator::xpath(format!("{DETAIL_BASE}/{path}"));
        Self {
            start_url: PORTAL_URL.to_string(),
            menu_path: vec![
                Locator::id("mf_wfm_gnb_wfm_gnbMenu_genDepth1_1_btn_menuLvl1_span"),
                Locator::id("mf_wfm_gnb_wfm_gnbMenu_genDepth1_1_genDepth2_0_btn_menuLvl2_span"),
                Locator::id(
                    "mf_wfm_gnb_wfm_gnbMenu_genDepth1_1_genDepth2_0_genDepth3_0_btn_menuLvl3_span",
                ),
            ],
            page_size: Some(PageSizeSpec {
                select: Locator::id(&format!("{GRID_PREFIX}_sbxRecordCountPerPage1")),
                option: "100".to_string(),
            }),
            search_input: Locator::xpath(SEARCH_INPUT_XPATH),
            results_table: Locator::id(&format!("{GRID_PREFIX}_gridView1_dataLayer")),
            no_results: Locator::containing_text("td", "검색된 데이터가 없습니다"),
            cell_template: CellTemplate::new(format!("{GRID_PREFIX}_gridView1_cell_{{row}}_{{col}}")),
            anchor_column: 0,
            title_column: 6,
            row_fields: vec![
                RowField::new("no", 0),
                RowField::new("business_type", 1),
                RowField::new("business_status", 2),
                RowField::new("bid_category", 4),
                RowField::new(BID_NUMBER_FIELD, 5),
                RowField::new(TITLE_FIELD, 6),
                RowField::new("announce_agency", 7),
                RowField::new("agency", 8),
                RowField::new("post_date", 9),
                RowField::new("progress_stage", 10),
                RowField::new("detail_process", 11),
                RowField::new("process_status", 12),
                RowField::new("bid_progress", 14),
            ],
            date_fields: vec!["post_date".to_string()],
            sections: vec![
                SectionSpec::text(GENERAL_NOTICE_SECTION, detail("div[3]")),
                SectionSpec::text("bid_qualification", detail("div[5]")),
                SectionSpec::text("bid_restriction", detail("div[6]/div[2]")),
                SectionSpec::text("bid_progress", detail("div[9]")),
                SectionSpec::text("presentation_order", detail("div[12]")),
                SectionSpec::document_list(
                    "proposal_info",
                    detail("div[13]/div[2]"),
                    "./div/div[2]/div/table/tbody/tr",
                ),
                SectionSpec::text("negotiation_contract", detail("div[13]/div[4]")),
                SectionSpec::document_list(
                    "bid_notice_files",
                    detail("div[35]/div"),
                    ".//table//tbody/tr",
                )
                .with_label_cell(".//td[4]//nobr"),
            ],
            popup_dismissers: vec![
                Locator::xpath(
                    "//div[contains(@id, '_close') and contains(@class, 'w2window_close')]",
                ),
                Locator::xpath("//input[@type='button' and @value='확인']"),
            ],
            file_download: Some(FileDownloadSpec {
                section: "bid_notice_files".to_string(),
                checkbox: ".//td[1]//input[@type='checkbox']".to_string(),
                download_button: Locator::xpath("//input[contains(@id, 'btnFileDown')]"),
                keywords: vec!["입찰공고문".to_string(), "공고서".to_string()],
            }),
            validation: ValidationRules::default(),
        }
    }
}

impl SiteProfile {
    /// Locator of a grid cell.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Locator {
        self.cell_template.cell(row, col)
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.name == name)
    }
}
