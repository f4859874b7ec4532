// Bid listing crawler
//
// Usage: bidscrape [config.json] [--resume]
//
// Without a config file the built-in portal profile and default search
// terms are used, writing snapshots under ./output.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bidscrape::crawl_engine::{CleanupResult, cleanup_browser_and_data};
use bidscrape::{
    BidLookupClient, ChromiumAutomation, CrawlConfig, CrawlController, CrawlError,
    CrawlOrchestrator, SiteProfile, StartOutcome, launch_browser, load_latest_checkpoint,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config_path: Option<PathBuf> = None;
    let mut resume = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--resume" => resume = true,
            other => config_path = Some(PathBuf::from(other)),
        }
    }

    let config = match &config_path {
        Some(path) => CrawlConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CrawlConfig::builder()
            .storage_dir("output")
            .site(SiteProfile::default())
            .build()?,
    };
    let terms = config.search_terms().to_vec();
    let storage_dir = config.storage_dir().clone();

    let download_dir = config.download_notices().then(|| config.download_dir());
    let (browser, handler_task, chrome_data_dir) = launch_browser(
        config.headless(),
        config.chrome_data_dir().cloned(),
        download_dir.as_deref(),
    )
    .await
    .context("Failed to launch browser")?;

    let page = browser
        .new_page("about:blank")
        .await
        .context("Failed to open page")?;
    let automation = Arc::new(ChromiumAutomation::new(page, config.navigation_timeout()));

    let lookup = config.lookup().cloned();
    let mut orchestrator = CrawlOrchestrator::new(automation, config);
    if let Some(lookup) = lookup {
        orchestrator = orchestrator.with_lookup(Arc::new(BidLookupClient::new(lookup)?));
    }

    if resume {
        match load_latest_checkpoint(&storage_dir).await? {
            Some((path, checkpoint)) => {
                info!("Resuming from {}", path.display());
                orchestrator.resume_from(checkpoint);
            }
            None => warn!("No checkpoint in {}, starting fresh", storage_dir.display()),
        }
    }

    let controller = Arc::new(CrawlController::new(orchestrator));
    if let StartOutcome::AlreadyRunning(status) = controller.start(terms).await {
        warn!("Crawl already running at {:?}", status.current_term);
    }

    let interrupt = Arc::clone(&controller);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current row");
            interrupt.stop().await;
        }
    });

    let result = controller
        .wait()
        .await
        .unwrap_or_else(|| Err(CrawlError::Other("crawl was not started".to_string())));

    match cleanup_browser_and_data(browser, handler_task, chrome_data_dir).await? {
        CleanupResult::Success => {}
        CleanupResult::PartialFailure(errors) => warn!("Cleanup incomplete: {}", errors.join("; ")),
    }

    let report = result?;
    println!(
        "Crawl {:?} in {:.1}s: {} record(s)",
        report.completion_status,
        report.duration.as_secs_f64(),
        report.records.len()
    );
    for (term, outcome) in &report.term_outcomes {
        println!("  {term}: {outcome:?}");
    }
    if let Some(path) = &report.final_path {
        println!("Results: {}", path.display());
    }
    Ok(())
}
