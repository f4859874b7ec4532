//! Bid records
//!
//! A [`BidRecord`] is what one result row turns into: the grid's basic fields,
//! the sections read during the detail excursion, and the row position it
//! was read from.

pub mod normalize;
pub mod ordered;

use serde::{Deserialize, Serialize};

pub use normalize::{clean_text, normalize_date};
pub use ordered::FieldMap;

/// Named grid fields in declaration order. `None` records a failed read.
pub type BasicFields = FieldMap<Option<String>>;

/// Detail sections keyed by section name.
pub type DetailSections = FieldMap<SectionContent>;

/// Field name conventionally holding the bid number.
pub const BID_NUMBER_FIELD: &str = "bid_number";
/// Field name conventionally holding the announcement title.
pub const TITLE_FIELD: &str = "title";
/// Section name holding the general notice text.
pub const GENERAL_NOTICE_SECTION: &str = "general_notice";

/// Content of one detail section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionContent {
    Text(String),
    Documents(Vec<DocumentDescriptor>),
}

impl SectionContent {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Documents(_) => None,
        }
    }

    #[must_use]
    pub fn as_documents(&self) -> Option<&[DocumentDescriptor]> {
        match self {
            Self::Text(_) => None,
            Self::Documents(docs) => Some(docs),
        }
    }
}

/// One row of a document list section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub download_link: Option<String>,
    /// A notice download was triggered for this row.
    #[serde(default)]
    pub download_requested: bool,
}

impl DocumentDescriptor {
    /// True when no field carries any content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.label.is_empty()
            && self.file_name.is_empty()
            && self.download_link.as_deref().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecord {
    pub search_term: String,
    pub basic_fields: BasicFields,
    #[serde(default)]
    pub detail_sections: DetailSections,
    pub row_index: usize,
    /// Response of the request-based detail lookup, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_detail: Option<serde_json::Value>,
}

impl BidRecord {
    #[must_use]
    pub fn new(search_term: impl Into<String>, row_index: usize, basic_fields: BasicFields) -> Self {
        Self {
            search_term: search_term.into(),
            basic_fields,
            detail_sections: DetailSections::new(),
            row_index,
            api_detail: None,
        }
    }

    /// Non-empty value of a basic field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.basic_fields
            .get(name)
            .and_then(Option::as_deref)
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn bid_number(&self) -> Option<&str> {
        self.field(BID_NUMBER_FIELD)
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.field(TITLE_FIELD)
    }

    /// Text of a detail section, if present and textual.
    #[must_use]
    pub fn section_text(&self, name: &str) -> Option<&str> {
        self.detail_sections.get(name).and_then(SectionContent::as_text)
    }
}
