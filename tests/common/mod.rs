//! Scripted listing site for crawl tests
//!
//! `FakeSite` implements `PageAutomation` over a tiny page model: a home
//! page with one menu entry, a listing with a search box, a results grid
//! and per-row detail views. Per-term scenarios decide what a search shows.

#![allow(dead_code)]

use async_trait::async_trait;
use bidscrape::automation::{AutomationError, AutomationResult, Locator, PageAutomation};
use bidscrape::config::{
    CellTemplate, CrawlConfig, FileDownloadSpec, RowField, SectionSpec, SiteProfile,
    ValidationRules,
};
use bidscrape::crawl_engine::StopSignal;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

pub const START_URL: &str = "https://bids.test/";
pub const TITLE_COLUMN: usize = 1;

pub fn test_profile() -> SiteProfile {
    SiteProfile {
        start_url: START_URL.to_string(),
        menu_path: vec![Locator::id("menu")],
        page_size: None,
        search_input: Locator::id("search"),
        results_table: Locator::id("grid"),
        no_results: Locator::id("empty"),
        cell_template: CellTemplate::new("cell_{row}_{col}"),
        anchor_column: 0,
        title_column: TITLE_COLUMN,
        row_fields: vec![
            RowField {
                name: "bid_number".into(),
                column: 0,
            },
            RowField {
                name: "title".into(),
                column: 1,
            },
            RowField {
                name: "post_date".into(),
                column: 2,
            },
        ],
        date_fields: vec!["post_date".into()],
        sections: vec![
            SectionSpec::text("general_notice", Locator::id("notice")),
            SectionSpec::document_list("files", Locator::id("files"), ".//tr")
                .with_label_cell("./td[1]"),
        ],
        popup_dismissers: vec![Locator::id("popup_close")],
        file_download: Some(FileDownloadSpec {
            section: "files".into(),
            checkbox: ".//input".into(),
            download_button: Locator::id("download"),
            keywords: vec!["notice".into()],
        }),
        validation: ValidationRules::default(),
    }
}

pub fn test_config(dir: &Path) -> CrawlConfig {
    CrawlConfig::builder()
        .storage_dir(dir)
        .site(test_profile())
        .without_delays()
        .checkpoint_interval_secs(3600)
        .build()
        .unwrap()
}

pub fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| (*t).to_string()).collect()
}

#[derive(Debug, Clone, Default)]
pub struct FakeRow {
    pub bid_number: Option<String>,
    pub title: String,
    pub post_date: String,
    pub notice: Option<String>,
    /// (label, file name)
    pub files: Vec<(String, String)>,
}

impl FakeRow {
    pub fn new(bid: &str, title: &str) -> Self {
        Self {
            bid_number: Some(bid.to_string()),
            title: title.to_string(),
            post_date: "2025/01/03 10:00".to_string(),
            notice: None,
            files: Vec::new(),
        }
    }

    pub fn without_number(title: &str) -> Self {
        Self {
            bid_number: None,
            ..Self::new("", title)
        }
    }

    pub fn notice(mut self, text: &str) -> Self {
        self.notice = Some(text.to_string());
        self
    }

    pub fn file(mut self, label: &str, name: &str) -> Self {
        self.files.push((label.to_string(), name.to_string()));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub rows: Vec<FakeRow>,
    /// Searches for this term that leave the grid missing before one works.
    pub broken_searches: usize,
    /// A history-back on a broken result page restores the grid.
    pub heal_on_back: bool,
}

impl Scenario {
    pub fn rows(rows: Vec<FakeRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn no_results() -> Self {
        Self::default()
    }

    pub fn permanently_broken() -> Self {
        Self {
            broken_searches: usize::MAX,
            ..Self::default()
        }
    }

    pub fn broken_until_back(rows: Vec<FakeRow>) -> Self {
        Self {
            rows,
            broken_searches: 1,
            heal_on_back: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum View {
    Blank,
    Home,
    Listing,
    Results { term: String, grid: bool },
    Detail { term: String, row: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Target {
    Menu,
    Search,
    Grid,
    Empty,
    Cell(usize, usize),
    Popup(String),
    Notice,
    Files,
    FileRows,
    FileRow(usize, String),
    Download,
    Unknown,
}

fn parse(locator: &Locator) -> Target {
    let xpath = locator.as_xpath();
    if let Some(rest) = xpath.strip_prefix("(//*[@id='files']//tr)[") {
        if let Some((index, tail)) = rest.split_once(']')
            && let Ok(k) = index.parse::<usize>()
        {
            return Target::FileRow(k - 1, tail.to_string());
        }
        return Target::Unknown;
    }
    if xpath == "//*[@id='files']//tr" {
        return Target::FileRows;
    }
    let Some(id) = xpath
        .strip_prefix("//*[@id='")
        .and_then(|s| s.strip_suffix("']"))
    else {
        return Target::Unknown;
    };
    match id {
        "menu" => Target::Menu,
        "search" => Target::Search,
        "grid" => Target::Grid,
        "empty" => Target::Empty,
        "notice" => Target::Notice,
        "files" => Target::Files,
        "download" => Target::Download,
        popup if popup.starts_with("popup_") => Target::Popup(popup.to_string()),
        other => match other.strip_prefix("cell_").and_then(|s| s.split_once('_')) {
            Some((r, c)) => match (r.parse(), c.parse()) {
                (Ok(r), Ok(c)) => Target::Cell(r, c),
                _ => Target::Unknown,
            },
            None => Target::Unknown,
        },
    }
}

#[derive(Debug, Default)]
pub struct Calls {
    pub goto: usize,
    pub back: usize,
    pub searches: Vec<String>,
    pub detail_visits: usize,
    pub downloads: usize,
    pub popup_clicks: Vec<String>,
}

struct SiteState {
    view: View,
    typed: String,
    popup_open: bool,
    search_counts: HashMap<String, usize>,
    checked: HashSet<(String, usize, usize)>,
    calls: Calls,
    stop_trigger: Option<(usize, StopSignal)>,
}

pub struct FakeSite {
    scenarios: HashMap<String, Scenario>,
    /// Popup dismisser ids shown while a popup is open.
    popups: Vec<String>,
    state: Mutex<SiteState>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self {
            scenarios: HashMap::new(),
            popups: vec!["popup_close".to_string()],
            state: Mutex::new(SiteState {
                view: View::Blank,
                typed: String::new(),
                popup_open: false,
                search_counts: HashMap::new(),
                checked: HashSet::new(),
                calls: Calls::default(),
                stop_trigger: None,
            }),
        }
    }

    pub fn with_term(mut self, term: &str, scenario: Scenario) -> Self {
        self.scenarios.insert(term.to_string(), scenario);
        self
    }

    /// Replace the dismisser ids a detail popup shows.
    pub fn with_popups(mut self, ids: &[&str]) -> Self {
        self.popups = ids.iter().map(|id| (*id).to_string()).collect();
        self
    }

    /// Request `signal` as soon as the detail view of `row` opens.
    pub fn stop_when_detail_opens(&self, row: usize, signal: StopSignal) {
        self.lock().stop_trigger = Some((row, signal));
    }

    pub fn goto_calls(&self) -> usize {
        self.lock().calls.goto
    }

    pub fn back_calls(&self) -> usize {
        self.lock().calls.back
    }

    pub fn searches(&self) -> Vec<String> {
        self.lock().calls.searches.clone()
    }

    pub fn detail_visits(&self) -> usize {
        self.lock().calls.detail_visits
    }

    pub fn downloads(&self) -> usize {
        self.lock().calls.downloads
    }

    pub fn popup_clicks(&self) -> Vec<String> {
        self.lock().calls.popup_clicks.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SiteState> {
        self.state.lock().unwrap()
    }

    fn scenario(&self, term: &str) -> Option<&Scenario> {
        self.scenarios.get(term)
    }

    fn row(&self, term: &str, row: usize) -> Option<&FakeRow> {
        self.scenario(term).and_then(|s| s.rows.get(row))
    }

    fn exists(&self, state: &SiteState, target: &Target) -> bool {
        match (&state.view, target) {
            (View::Home, Target::Menu) => true,
            (View::Listing | View::Results { .. }, Target::Search) => true,
            (View::Results { grid, .. }, Target::Grid) => *grid,
            (View::Results { term, grid }, Target::Empty) => {
                *grid && self.scenario(term).is_none_or(|s| s.rows.is_empty())
            }
            (View::Results { term, grid }, Target::Cell(r, _)) => {
                *grid && self.row(term, *r).is_some()
            }
            (View::Detail { .. }, Target::Popup(id)) => {
                state.popup_open && self.popups.contains(id)
            }
            (View::Detail { term, row }, Target::Notice) => {
                self.row(term, *row).is_some_and(|r| r.notice.is_some())
            }
            (View::Detail { term, row }, Target::Files) => {
                self.row(term, *row).is_some_and(|r| !r.files.is_empty())
            }
            (View::Detail { .. }, Target::Download) => true,
            (View::Detail { term, row }, Target::FileRow(k, _)) => {
                self.row(term, *row).is_some_and(|r| *k < r.files.len())
            }
            _ => false,
        }
    }

    fn missing(locator: &Locator) -> AutomationError {
        AutomationError::ElementNotFound(locator.to_string())
    }
}

#[async_trait]
impl PageAutomation for FakeSite {
    async fn goto(&self, url: &str) -> AutomationResult<()> {
        let mut state = self.lock();
        state.calls.goto += 1;
        if url != START_URL {
            return Err(AutomationError::Navigation(format!("unknown url {url}")));
        }
        state.view = View::Home;
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> AutomationResult<()> {
        let state = self.lock();
        if self.exists(&state, &parse(locator)) {
            Ok(())
        } else {
            Err(AutomationError::timeout(
                format!("wait for {locator}"),
                timeout,
            ))
        }
    }

    async fn is_displayed(&self, locator: &Locator) -> AutomationResult<bool> {
        let state = self.lock();
        Ok(self.exists(&state, &parse(locator)))
    }

    async fn count(&self, locator: &Locator) -> AutomationResult<usize> {
        let state = self.lock();
        let target = parse(locator);
        if target == Target::FileRows {
            return Ok(match &state.view {
                View::Detail { term, row } => self.row(term, *row).map_or(0, |r| r.files.len()),
                _ => 0,
            });
        }
        Ok(usize::from(self.exists(&state, &target)))
    }

    async fn click(&self, locator: &Locator) -> AutomationResult<()> {
        let mut state = self.lock();
        let target = parse(locator);
        if !self.exists(&state, &target) {
            return Err(Self::missing(locator));
        }
        match (state.view.clone(), target) {
            (View::Home, Target::Menu) => state.view = View::Listing,
            (View::Results { term, .. }, Target::Cell(row, TITLE_COLUMN)) => {
                state.view = View::Detail { term, row };
                state.popup_open = true;
                state.calls.detail_visits += 1;
                if let Some((trigger, signal)) = &state.stop_trigger
                    && *trigger == row
                {
                    signal.request();
                }
            }
            (_, Target::Popup(id)) => {
                state.popup_open = false;
                state.calls.popup_clicks.push(id);
            }
            (View::Detail { term, row }, Target::FileRow(k, tail)) if tail == "//input" => {
                state.checked.insert((term, row, k));
            }
            (_, Target::Download) => state.calls.downloads += 1,
            _ => {}
        }
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> AutomationResult<()> {
        let mut state = self.lock();
        if !self.exists(&state, &parse(locator)) {
            return Err(Self::missing(locator));
        }
        state.typed = text.to_string();
        Ok(())
    }

    async fn submit(&self, locator: &Locator) -> AutomationResult<()> {
        let mut state = self.lock();
        if !self.exists(&state, &parse(locator)) {
            return Err(Self::missing(locator));
        }
        let term = state.typed.clone();
        state.calls.searches.push(term.clone());
        let count = state.search_counts.entry(term.clone()).or_insert(0);
        *count += 1;
        let attempt = *count;
        let broken = self.scenario(&term).map_or(0, |s| s.broken_searches);
        state.view = View::Results {
            term,
            grid: attempt > broken,
        };
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, _option: &str) -> AutomationResult<()> {
        Err(Self::missing(locator))
    }

    async fn read_text(&self, locator: &Locator) -> AutomationResult<String> {
        let state = self.lock();
        let target = parse(locator);
        if !self.exists(&state, &target) {
            return Err(Self::missing(locator));
        }
        let text = match (&state.view, &target) {
            (View::Results { term, .. }, Target::Cell(r, c)) => {
                let row = self.row(term, *r).ok_or_else(|| Self::missing(locator))?;
                match c {
                    0 => row.bid_number.clone().unwrap_or_default(),
                    1 => row.title.clone(),
                    2 => row.post_date.clone(),
                    _ => return Err(Self::missing(locator)),
                }
            }
            (View::Detail { term, row }, Target::Notice) => self
                .row(term, *row)
                .and_then(|r| r.notice.clone())
                .unwrap_or_default(),
            (View::Detail { term, row }, Target::FileRow(k, tail)) => {
                let (label, name) = self
                    .row(term, *row)
                    .and_then(|r| r.files.get(*k))
                    .ok_or_else(|| Self::missing(locator))?;
                match tail.as_str() {
                    "/td[1]" => label.clone(),
                    "//a" => name.clone(),
                    _ => return Err(Self::missing(locator)),
                }
            }
            _ => return Err(Self::missing(locator)),
        };
        Ok(text)
    }

    async fn read_attribute(&self, locator: &Locator, name: &str) -> AutomationResult<Option<String>> {
        let file_name = self.read_text(locator).await?;
        let linked = name == "href" && !file_name.is_empty();
        Ok(linked.then(|| format!("{START_URL}files/{file_name}")))
    }

    async fn is_selected(&self, locator: &Locator) -> AutomationResult<bool> {
        let state = self.lock();
        match (&state.view, parse(locator)) {
            (View::Detail { term, row }, Target::FileRow(k, _)) => {
                Ok(state.checked.contains(&(term.clone(), *row, k)))
            }
            _ => Err(Self::missing(locator)),
        }
    }

    async fn navigate_back(&self) -> AutomationResult<()> {
        let mut state = self.lock();
        state.calls.back += 1;
        let next = match &state.view {
            View::Detail { term, .. } => View::Results {
                term: term.clone(),
                grid: true,
            },
            View::Results { term, grid: false }
                if self.scenario(term).is_some_and(|s| s.heal_on_back) =>
            {
                View::Results {
                    term: term.clone(),
                    grid: true,
                }
            }
            other => other.clone(),
        };
        state.view = next;
        state.popup_open = false;
        Ok(())
    }

    async fn window_handles(&self) -> AutomationResult<Vec<String>> {
        Ok(vec!["main".to_string()])
    }
}
