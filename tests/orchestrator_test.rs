//! End-to-end crawl runs against the scripted listing site

use async_trait::async_trait;
use bidscrape::automation::Locator;
use bidscrape::config::{CrawlConfig, RowField};
use bidscrape::content_saver::{CheckpointFile, RunSummary, load_latest_checkpoint};
use bidscrape::crawl_engine::{CompletionStatus, CrawlOrchestrator, TermOutcome};
use bidscrape::crawl_events::{CrawlEvent, CrawlEventBus};
use bidscrape::lookup::DetailLookup;
use bidscrape::record::SectionContent;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;

mod common;
use common::{FakeRow, FakeSite, Scenario, terms, test_config, test_profile};

fn orchestrator(site: &Arc<FakeSite>, config: CrawlConfig) -> CrawlOrchestrator<FakeSite> {
    CrawlOrchestrator::new(Arc::clone(site), config)
}

#[tokio::test]
async fn test_resume_skips_completed_terms() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(
        FakeSite::new()
            .with_term("A", Scenario::rows(vec![FakeRow::new("A-1", "A 사업")]))
            .with_term("B", Scenario::rows(vec![FakeRow::new("B-1", "B 사업")]))
            .with_term("C", Scenario::rows(vec![FakeRow::new("C-1", "C 사업")]))
            .with_term("D", Scenario::rows(vec![FakeRow::new("D-1", "D 사업")])),
    );
    let mut crawl = orchestrator(&site, test_config(dir.path()));
    crawl.resume_from(CheckpointFile {
        timestamp: "20250101_120000".into(),
        summary: RunSummary::default(),
        results: Vec::new(),
        completed_terms: terms(&["A", "B"]),
        remaining_terms: terms(&["C", "D"]),
    });

    let report = crawl.run(&terms(&["A", "B", "C", "D"])).await.unwrap();

    assert_eq!(site.searches(), terms(&["C", "D"]));
    assert_eq!(report.outcome("A"), Some(&TermOutcome::Skipped));
    assert_eq!(report.outcome("B"), Some(&TermOutcome::Skipped));
    assert_eq!(
        report.outcome("C"),
        Some(&TermOutcome::Completed {
            extracted: 1,
            kept: 1
        })
    );
    assert_eq!(report.completion_status, CompletionStatus::Exhausted);
    assert_eq!(report.records.len(), 2);

    // An exhausted run starts the next cycle from scratch
    let status = crawl.status();
    assert!(status.completed_terms.is_empty());
    assert!(!status.is_running);
    assert_eq!(status.accumulated_record_count, 0);
}

#[tokio::test]
async fn test_relevance_and_cross_term_dedupe() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(
        FakeSite::new()
            .with_term(
                "VR",
                Scenario::rows(vec![
                    FakeRow::new("B1", "VR AR 통합 교육"),
                    FakeRow::new("B2", "AR 체험관 구축"),
                ]),
            )
            .with_term(
                "AR",
                Scenario::rows(vec![
                    FakeRow::new("B2", "AR 체험관 구축"),
                    FakeRow::new("B1", "VR AR 통합 교육"),
                ]),
            ),
    );
    let mut crawl = orchestrator(&site, test_config(dir.path()));

    let report = crawl.run(&terms(&["VR", "AR"])).await.unwrap();

    assert_eq!(
        report.outcome("VR"),
        Some(&TermOutcome::Completed {
            extracted: 2,
            kept: 1
        })
    );
    assert_eq!(
        report.outcome("AR"),
        Some(&TermOutcome::Completed {
            extracted: 2,
            kept: 1
        })
    );
    let numbers: Vec<_> = report.records.iter().filter_map(|r| r.bid_number()).collect();
    assert_eq!(numbers, vec!["B1", "B2"]);
    assert_eq!(report.records_for("AR")[0].bid_number(), Some("B2"));
}

#[tokio::test]
async fn test_detail_sections_and_notice_download() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(FakeSite::new().with_term(
        "LMS",
        Scenario::rows(vec![
            FakeRow::new("B1", "LMS 고도화")
                .notice("공고 개요\nGrid View\n  세부 내용  ")
                .file("입찰 Notice", "notice.hwp")
                .file("appendix", "appendix.pdf"),
        ]),
    ));
    let config = CrawlConfig::builder()
        .storage_dir(dir.path())
        .site(common::test_profile())
        .without_delays()
        .download_notices(true)
        .build()
        .unwrap();
    let mut crawl = orchestrator(&site, config);

    let report = crawl.run(&terms(&["LMS"])).await.unwrap();
    let record = &report.records[0];

    assert_eq!(record.field("post_date"), Some("2025-01-03"));
    assert_eq!(record.section_text("general_notice"), Some("공고 개요 세부 내용"));

    let docs = record
        .detail_sections
        .get("files")
        .and_then(SectionContent::as_documents)
        .unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].label, "입찰 Notice");
    assert_eq!(docs[0].file_name, "notice.hwp");
    assert_eq!(
        docs[0].download_link.as_deref(),
        Some("https://bids.test/files/notice.hwp")
    );
    assert!(docs[0].download_requested);
    assert!(!docs[1].download_requested);
    assert_eq!(site.downloads(), 1);
}

#[tokio::test]
async fn test_stop_between_rows_keeps_term_pending() {
    let dir = TempDir::new().unwrap();
    let rows = (1..=5)
        .map(|i| FakeRow::new(&format!("B{i}"), &format!("VR 과제 {i}")))
        .collect();
    let site = Arc::new(
        FakeSite::new()
            .with_term("VR", Scenario::rows(rows))
            .with_term("AR", Scenario::rows(vec![FakeRow::new("A1", "AR")])),
    );
    let mut crawl = orchestrator(&site, test_config(dir.path()));
    site.stop_when_detail_opens(0, crawl.stop_signal());

    let report = crawl.run(&terms(&["VR", "AR"])).await.unwrap();

    assert_eq!(report.completion_status, CompletionStatus::Stopped);
    assert_eq!(
        report.outcome("VR"),
        Some(&TermOutcome::Stopped {
            extracted: 1,
            kept: 1
        })
    );
    assert_eq!(report.outcome("AR"), None);
    assert_eq!(site.searches(), terms(&["VR"]));
    assert_eq!(site.detail_visits(), 1);
    assert_eq!(report.records.len(), 1);

    let status = crawl.status();
    assert!(status.completed_terms.is_empty());
    assert_eq!(status.remaining_terms, terms(&["VR", "AR"]));
    assert_eq!(status.accumulated_record_count, 1);
}

#[tokio::test]
async fn test_stopped_run_checkpoint_keeps_term_pending() {
    let dir = TempDir::new().unwrap();
    let rows = (1..=5)
        .map(|i| FakeRow::new(&format!("B{i}"), &format!("VR 과제 {i}")))
        .collect();
    let site = Arc::new(FakeSite::new().with_term("VR", Scenario::rows(rows)));
    let mut crawl = orchestrator(&site, test_config(dir.path()));
    site.stop_when_detail_opens(0, crawl.stop_signal());

    crawl.run(&terms(&["VR"])).await.unwrap();

    let (_, checkpoint) = load_latest_checkpoint(dir.path()).await.unwrap().unwrap();
    assert!(checkpoint.completed_terms.is_empty());
    assert_eq!(checkpoint.remaining_terms, terms(&["VR"]));
    assert_eq!(checkpoint.summary.processed_count, 0);
    assert_eq!(checkpoint.results.len(), 1);
    assert_eq!(checkpoint.results[0].bid_number(), Some("B1"));
}

#[tokio::test]
async fn test_recovery_is_bounded_on_permanently_broken_page() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(
        FakeSite::new()
            .with_term("X", Scenario::permanently_broken())
            .with_term("Y", Scenario::rows(vec![FakeRow::new("Y1", "Y 사업")])),
    );
    let config = CrawlConfig::builder()
        .storage_dir(dir.path())
        .site(common::test_profile())
        .without_delays()
        .extract_details(false)
        .build()
        .unwrap();
    let mut crawl = orchestrator(&site, config);

    let report = crawl.run(&terms(&["X", "Y"])).await.unwrap();

    assert!(matches!(
        report.outcome("X"),
        Some(TermOutcome::Abandoned { .. })
    ));
    // One history-back plus two reset-and-search attempts
    assert_eq!(site.back_calls(), 1);
    let x_searches = site.searches().iter().filter(|t| *t == "X").count();
    assert_eq!(x_searches, 3);
    // Initial load, two resets, one re-navigation after giving up, then Y
    assert_eq!(site.goto_calls(), 5);
    assert_eq!(
        report.outcome("Y"),
        Some(&TermOutcome::Completed {
            extracted: 1,
            kept: 1
        })
    );
}

#[tokio::test]
async fn test_history_back_restores_missing_table() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(FakeSite::new().with_term(
        "VR",
        Scenario::broken_until_back(vec![FakeRow::new("B1", "VR 교육")]),
    ));
    let config = CrawlConfig::builder()
        .storage_dir(dir.path())
        .site(common::test_profile())
        .without_delays()
        .extract_details(false)
        .build()
        .unwrap();
    let mut crawl = orchestrator(&site, config);

    let report = crawl.run(&terms(&["VR"])).await.unwrap();

    assert_eq!(site.back_calls(), 1);
    assert_eq!(site.searches(), terms(&["VR"]));
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn test_no_results_completes_term() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(FakeSite::new().with_term("없음", Scenario::no_results()));
    let mut crawl = orchestrator(&site, test_config(dir.path()));

    let report = crawl.run(&terms(&["없음"])).await.unwrap();

    assert_eq!(report.outcome("없음"), Some(&TermOutcome::NoResults));
    assert!(report.records.is_empty());
}

#[tokio::test]
async fn test_snapshots_are_written_and_loadable() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(
        FakeSite::new().with_term("VR", Scenario::rows(vec![FakeRow::new("B1", "VR 교육")])),
    );
    let mut crawl = orchestrator(&site, test_config(dir.path()));

    let report = crawl.run(&terms(&["VR", "AR"])).await.unwrap();

    let checkpoint_path = report.checkpoint_path.unwrap();
    let final_path = report.final_path.unwrap();
    assert!(checkpoint_path.exists());

    let (latest, checkpoint) = load_latest_checkpoint(dir.path()).await.unwrap().unwrap();
    assert_eq!(latest, checkpoint_path);
    assert_eq!(checkpoint.completed_terms, terms(&["VR", "AR"]));
    assert_eq!(checkpoint.summary.total_results, 1);

    let final_json: Value = serde_json::from_slice(&std::fs::read(final_path).unwrap()).unwrap();
    assert_eq!(final_json["metadata"]["completion_status"], "exhausted");
    assert_eq!(final_json["summary"]["total_keywords"], 2);
    assert_eq!(final_json["results"][0]["basic_fields"]["bid_number"], "B1");
}

#[tokio::test]
async fn test_persistence_failure_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    // A regular file where the storage directory should be
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"").unwrap();
    let site = Arc::new(
        FakeSite::new().with_term("VR", Scenario::rows(vec![FakeRow::new("B1", "VR 교육")])),
    );
    let mut crawl = orchestrator(&site, test_config(&blocked));

    let report = crawl.run(&terms(&["VR"])).await.unwrap();

    assert!(report.checkpoint_path.is_none());
    assert!(report.final_path.is_none());
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn test_events_follow_run_lifecycle() {
    let dir = TempDir::new().unwrap();
    let bus = Arc::new(CrawlEventBus::new(256));
    let mut rx = bus.subscribe();
    let site = Arc::new(
        FakeSite::new().with_term("VR", Scenario::rows(vec![FakeRow::new("B1", "VR 교육")])),
    );
    let config = test_config(dir.path()).with_event_bus(Arc::clone(&bus));
    let mut crawl = orchestrator(&site, config);

    crawl.run(&terms(&["VR"])).await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(matches!(
        events.first(),
        Some(CrawlEvent::CrawlStarted { total_terms: 1, .. })
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        CrawlEvent::TermFinished { term, outcome: TermOutcome::Completed { .. }, .. } if term == "VR"
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, CrawlEvent::CheckpointSaved { .. })));
    assert!(matches!(
        events.last(),
        Some(CrawlEvent::CrawlCompleted {
            completion: CompletionStatus::Exhausted,
            total_records: 1,
            ..
        })
    ));
}

struct EchoLookup;

#[async_trait]
impl DetailLookup for EchoLookup {
    async fn lookup(&self, bid_number: &str) -> Value {
        json!({ "bidPbancNo": bid_number })
    }
}

#[tokio::test]
async fn test_lookup_detail_attached_by_bid_number() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(FakeSite::new().with_term(
        "VR",
        Scenario::rows(vec![
            FakeRow::new("B1", "VR 교육"),
            FakeRow::without_number("VR 무번호"),
        ]),
    ));
    let mut crawl = orchestrator(&site, test_config(dir.path())).with_lookup(Arc::new(EchoLookup));

    let report = crawl.run(&terms(&["VR"])).await.unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(
        report.records[0].api_detail,
        Some(json!({ "bidPbancNo": "B1" }))
    );
    assert_eq!(report.records[1].api_detail, None);
}

#[tokio::test]
async fn test_recovered_term_with_zero_rows_completes() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(
        FakeSite::new()
            .with_term(
                "VR",
                Scenario::rows(vec![
                    FakeRow::new("B1", "VR 교육"),
                    FakeRow::new("B2", "VR 콘텐츠"),
                ]),
            )
            .with_term("AR", Scenario::broken_until_back(Vec::new())),
    );
    let mut crawl = orchestrator(&site, test_config(dir.path()));

    let report = crawl.run(&terms(&["VR", "AR"])).await.unwrap();

    assert_eq!(report.outcome("AR"), Some(&TermOutcome::NoResults));
    assert_eq!(report.records.len(), 2);
    assert_eq!(site.searches(), terms(&["VR", "AR"]));

    let (_, checkpoint) = load_latest_checkpoint(dir.path()).await.unwrap().unwrap();
    assert_eq!(checkpoint.completed_terms, terms(&["VR", "AR"]));
    assert_eq!(checkpoint.summary.total_results, 2);
}

#[tokio::test]
async fn test_failed_field_reads_as_null_and_row_is_kept() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(FakeSite::new().with_term(
        "VR",
        Scenario::rows(vec![FakeRow::new("B1", "VR 교육")]),
    ));
    let mut profile = test_profile();
    profile.row_fields.push(RowField {
        name: "agency".into(),
        column: 7,
    });
    let config = CrawlConfig::builder()
        .storage_dir(dir.path())
        .site(profile)
        .without_delays()
        .checkpoint_interval_secs(3600)
        .build()
        .unwrap();
    let mut crawl = orchestrator(&site, config);

    let report = crawl.run(&terms(&["VR"])).await.unwrap();

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert!(record.basic_fields.contains_key("agency"));
    assert_eq!(record.field("agency"), None);
    assert_eq!(record.bid_number(), Some("B1"));
    let names: Vec<_> = record.basic_fields.keys().collect();
    assert_eq!(names, vec!["bid_number", "title", "post_date", "agency"]);
}

#[tokio::test]
async fn test_absent_section_omitted_and_blank_document_rows_dropped() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(FakeSite::new().with_term(
        "VR",
        Scenario::rows(vec![
            FakeRow::new("B1", "VR 교육")
                .file("appendix", "appendix.pdf")
                .file("", "")
                .file("spec", "spec.hwp"),
        ]),
    ));
    let mut crawl = orchestrator(&site, test_config(dir.path()));

    let report = crawl.run(&terms(&["VR"])).await.unwrap();
    let record = &report.records[0];

    assert!(!record.detail_sections.contains_key("general_notice"));
    let docs = record
        .detail_sections
        .get("files")
        .and_then(SectionContent::as_documents)
        .unwrap();
    let labels: Vec<_> = docs.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["appendix", "spec"]);
}

#[tokio::test]
async fn test_popup_dismissers_tried_in_order() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(
        FakeSite::new()
            .with_popups(&["popup_close", "popup_confirm"])
            .with_term(
                "VR",
                Scenario::rows(vec![FakeRow::new("B1", "VR 교육").notice("공고")]),
            ),
    );
    let mut profile = test_profile();
    profile.popup_dismissers = vec![
        Locator::id("popup_layer"),
        Locator::id("popup_confirm"),
        Locator::id("popup_close"),
    ];
    let config = CrawlConfig::builder()
        .storage_dir(dir.path())
        .site(profile)
        .without_delays()
        .checkpoint_interval_secs(3600)
        .build()
        .unwrap();
    let mut crawl = orchestrator(&site, config);

    let report = crawl.run(&terms(&["VR"])).await.unwrap();

    // The hidden first strategy is skipped, the first visible one wins
    assert_eq!(site.popup_clicks(), vec!["popup_confirm".to_string()]);
    assert_eq!(report.records[0].section_text("general_notice"), Some("공고"));
}

#[tokio::test]
async fn test_zero_interval_checkpoints_after_every_term() {
    let dir = TempDir::new().unwrap();
    let site = Arc::new(
        FakeSite::new()
            .with_term("VR", Scenario::rows(vec![FakeRow::new("B1", "VR 교육")]))
            .with_term("AR", Scenario::rows(vec![FakeRow::new("B2", "AR 체험")])),
    );
    let config = CrawlConfig::builder()
        .storage_dir(dir.path())
        .site(test_profile())
        .without_delays()
        .checkpoint_interval_secs(0)
        .build()
        .unwrap();
    let mut crawl = orchestrator(&site, config);

    crawl.run(&terms(&["VR", "AR"])).await.unwrap();

    let checkpoints = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("crawling_progress_")
        })
        .count();
    // Run start, after each term, run end
    assert_eq!(checkpoints, 4);
}
