//! Value normalization applied to extracted text

/// Marker left in section text by the portal's grid widgets.
const GRID_ARTIFACT: &str = "Grid";

/// Reduce a timestamp-like cell to its date part with `-` separators.
///
/// `2025/01/03 10:00` becomes `2025-01-03`. Blank input stays blank.
#[must_use]
pub fn normalize_date(raw: &str) -> String {
    raw.split_whitespace()
        .next()
        .map(|date| date.replace('/', "-"))
        .unwrap_or_default()
}

/// Drop blank lines and grid artefacts, then join the remaining trimmed
/// lines with single spaces.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains(GRID_ARTIFACT))
        .collect::<Vec<_>>()
        .join(" ")
}
