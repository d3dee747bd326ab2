//! Session entry point: classify the current page, then either build the
//! queue (listing pages) or drive the content and advance the queue
//! (player pages). This is the engine's public boundary — nothing below
//! it propagates an error to the embedder; failures degrade to "do
//! nothing this round" and a log line.

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::control;
use crate::orchestrator::Orchestrator;
use crate::page::Page;
use crate::queue;
use coursepilot_common::error::{DomError, StoreError};
use coursepilot_common::store::KeyValueStore;
use coursepilot_common::task::QueueRecord;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What kind of page the session landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Course listing: the queue is (re)built here.
    Listing,
    /// Player/content page: widgets are driven here.
    Player,
    /// Anything else: the session does nothing.
    Other,
}

pub fn classify_url(url: &str) -> PageKind {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    if path.contains("/launch/course_work/") || path.contains("/course/") {
        PageKind::Listing
    } else if path.contains("/training/player/") || path.contains("/player/") {
        PageKind::Player
    } else {
        PageKind::Other
    }
}

/// What one session pass did, for display and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    pub enabled: bool,
    pub kind: Option<PageKind>,
    /// Tasks queued (listing) or whether content progressed (player).
    pub queued: usize,
    pub progressed: bool,
    pub navigated: Option<String>,
    /// The queue reached its end and was cleared.
    pub queue_finished: bool,
}

/// Run one session pass over the current page. Never fails: internal
/// errors are logged and the partial report returned.
pub async fn run(
    page: &mut dyn Page,
    store: &mut dyn KeyValueStore,
    cfg: &EngineConfig,
) -> SessionReport {
    let mut report = SessionReport::default();

    if !control::is_enabled(store).await {
        info!("automation disabled, skipping");
        return report;
    }
    report.enabled = true;

    let kind = classify_url(&page.url());
    report.kind = Some(kind);
    info!(url = %page.url(), ?kind, "session starting");

    let outcome = match kind {
        PageKind::Listing => run_listing(page, store, cfg, &mut report).await,
        PageKind::Player => run_player(page, store, cfg, &mut report).await,
        PageKind::Other => {
            debug!("not a course page, nothing to do");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        warn!(error = %e, "session pass failed, degrading to no-op");
    }
    report
}

/// Listing page: rebuild the queue from the table of contents, persist
/// it, and navigate to the active task.
async fn run_listing(
    page: &mut dyn Page,
    store: &mut dyn KeyValueStore,
    cfg: &EngineConfig,
    report: &mut SessionReport,
) -> Result<(), SessionError> {
    sleep(cfg.content_settle).await;

    let tasks = queue::scrape_listing(page).await;
    if tasks.is_empty() {
        warn!("no tasks found on listing page");
        return Ok(());
    }

    let record = QueueRecord::build(tasks);
    info!(
        total = record.len(),
        completed = record.completed_count(),
        cursor = record.cursor,
        "queue built, starting from last task"
    );
    queue::persist(store, &record).await?;
    report.queued = record.len();

    if let Some(task) = record.current() {
        if task.href != page.url() {
            sleep(cfg.navigation_delay).await;
            info!(href = %task.href, "navigating to active task");
            page.navigate(&task.href).await?;
            report.navigated = Some(task.href.clone());
        }
    }
    Ok(())
}

/// Player page: reconcile the cursor against the actual location, drive
/// the content to convergence, then advance the queue.
async fn run_player(
    page: &mut dyn Page,
    store: &mut dyn KeyValueStore,
    cfg: &EngineConfig,
    report: &mut SessionReport,
) -> Result<(), SessionError> {
    let mut record = queue::load(store).await;
    if !record.is_empty() && record.reconcile_cursor(&page.url()) {
        info!(cursor = record.cursor, "cursor reconciled from URL");
        queue::persist(store, &record).await?;
    }

    let outcome = Orchestrator::new(cfg).run(page).await;
    report.progressed = outcome.progressed;
    if outcome.progressed {
        info!(rounds = outcome.rounds, "content processing completed");
    } else {
        info!("no content was processed, advancing anyway");
    }

    // Re-read: the control plane may have cleared the queue meanwhile.
    let mut record = queue::load(store).await;
    if record.is_empty() {
        debug!("no queue stored, staying on page");
        return Ok(());
    }

    if record.advance() {
        queue::persist(store, &record).await?;
        if let Some(next) = record.current() {
            info!(cursor = record.cursor, total = record.len(), "advancing to next task");
            let href = next.href.clone();
            sleep(cfg.navigation_delay).await;
            page.navigate(&href).await?;
            report.navigated = Some(href);
        }
    } else {
        info!("all tasks completed, clearing queue");
        queue::clear(store).await?;
        report.queue_finished = true;
    }
    Ok(())
}
