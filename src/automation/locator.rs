//! Element locators
//!
//! Every element the crawler touches is addressed by an XPath expression.
//! Locators are plain data so a site profile can carry them in JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// XPath-backed element locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// Locator from a raw XPath expression.
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    /// Locator for the element with the given `id` attribute.
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self(format!("//*[@id='{id}']"))
    }

    /// Locator for the element containing the given text.
    #[must_use]
    pub fn containing_text(tag: &str, text: &str) -> Self {
        Self(format!("//{tag}[contains(text(), '{text}')]"))
    }

    #[must_use]
    pub fn as_xpath(&self) -> &str {
        &self.0
    }

    /// Resolve `relative` against this locator.
    ///
    /// Accepts `./a`, `.//a`, `a` and `//a` forms. The result stays a single
    /// XPath expression so it can be evaluated without an element handle.
    #[must_use]
    pub fn join(&self, relative: &str) -> Self {
        let base = &self.0;
        let rel = relative.trim();
        let joined = if let Some(rest) = rel.strip_prefix(".//") {
            format!("{base}//{rest}")
        } else if let Some(rest) = rel.strip_prefix("./") {
            format!("{base}/{rest}")
        } else if rel.starts_with('/') {
            format!("{base}{rel}")
        } else {
            format!("{base}/{rel}")
        };
        Self(joined)
    }

    /// The `index`-th (0-based) node matched by this locator.
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        Self(format!("({})[{}]", self.0, index + 1))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(expr: &str) -> Self {
        Self::xpath(expr)
    }
}
