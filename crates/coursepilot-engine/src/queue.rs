//! Task queue construction and persistence.
//!
//! On a listing page the table of contents is scraped into an ordered
//! task list. Per-task completion is inferred from a ranked list of weak
//! detectors — explicit markers, progress-bar value, text content, and
//! computed style as a last resort — evaluated until one fires, never as
//! a single boolean check.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::page::Page;
use crate::resolver::{Resolved, candidates};
use coursepilot_common::error::StoreError;
use coursepilot_common::protocol::Scope;
use coursepilot_common::store::KeyValueStore;
use coursepilot_common::task::{QueueRecord, Task};

/// Store key holding the serialized queue record.
pub const QUEUE_KEY: &str = "coursepilot.queue";

const TOC_ITEM_SELECTOR: &str = ".TOC_item";

/// Fallback selectors for listings without the TOC structure.
const GENERIC_TASK_SELECTOR: &str = ".course-item, .lesson-item, .task-item, \
     a[href*=\"/training/player/\"], a[href*=\"/launch/\"], .task-link, .course-item a";

const COMPLETION_MARKER_SELECTOR: &str = ".completed, .done, [class*=\"complete\"], .checkmark, \
     .fa-check, .progress-100, [data-complete=\"true\"], .status-complete, .task-complete, \
     .lesson-complete, .module-complete, .fa-check-circle, .complete-icon, \
     [data-status=\"complete\"], .success, .passed, [class*=\"success\"]";

const PROGRESS_SELECTOR: &str = ".progress-bar, .progress, [class*=\"progress\"]";

const CURRENT_TASK_SELECTOR: &str = ".active, .current, .selected, .in-progress, .playing, \
     [class*=\"active\"], [class*=\"current\"], [class*=\"selected\"], .highlighted, .focus";

const COMPLETION_WORDS: &[&str] =
    &["complete", "finished", "done", "100%", "passed", "success"];

static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*min").expect("minutes pattern"));

/// Which detector established a task's completion, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSignal {
    /// An explicit completion class or attribute on a descendant.
    Marker,
    /// A progress bar reporting 100.
    Progress,
    /// Completion wording in the item's text.
    Text,
    /// Grayed-out styling; suppressed for the currently active task,
    /// which is often highlighted in ways that fool this check.
    Style,
}

/// Scrape the listing's table of contents into an ordered task list.
pub async fn scrape_listing(page: &dyn Page) -> Vec<Task> {
    let items = candidates(page, Scope::Document, TOC_ITEM_SELECTOR).await;
    if !items.is_empty() {
        let mut tasks = Vec::new();
        for (i, item) in items.iter().enumerate() {
            match scrape_toc_item(page, item).await {
                Some(task) => {
                    debug!(
                        index = i + 1,
                        title = %task.title,
                        completed = task.completed,
                        current = task.is_current,
                        "scraped task"
                    );
                    tasks.push(task);
                }
                None => debug!(index = i + 1, "skipping TOC item without href"),
            }
        }
        info!(
            total = tasks.len(),
            videos = tasks.iter().filter(|t| t.is_video).count(),
            "scraped table of contents"
        );
        return tasks;
    }

    warn!("no TOC items found, trying generic task links");
    scrape_generic(page).await
}

async fn scrape_toc_item(page: &dyn Page, item: &Resolved) -> Option<Task> {
    let href = item.snapshot.attr("href")?.to_string();

    let is_video = !candidates(page, Scope::Node(item.id), ".fa-play")
        .await
        .is_empty();

    let title = candidates(page, Scope::Node(item.id), ".lead")
        .await
        .into_iter()
        .next()
        .map(|lead| lead.snapshot.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let (item_id, work_id) = id_segments(&href);

    let mut estimated_minutes = 0.0;
    if is_video {
        if let Some(span) = candidates(page, Scope::Node(item.id), ".span_link")
            .await
            .into_iter()
            .next()
        {
            estimated_minutes = parse_minutes(&span.snapshot.text).unwrap_or(0.0);
        }
    }

    let is_current = detect_current(page, item).await;
    let signal = completion_signal(page, item, is_current).await;
    if let Some(signal) = signal {
        debug!(?signal, title = %title, "task detected complete");
    }

    Some(Task {
        href,
        title,
        is_video,
        estimated_minutes,
        work_id,
        item_id,
        completed: signal.is_some(),
        is_current,
    })
}

async fn scrape_generic(page: &dyn Page) -> Vec<Task> {
    let mut tasks = Vec::new();
    for item in candidates(page, Scope::Document, GENERIC_TASK_SELECTOR).await {
        let Some(href) = item.snapshot.attr("href") else {
            continue;
        };
        if !href.contains("http") {
            continue;
        }
        let href = href.to_string();
        let completed = !candidates(page, Scope::Node(item.id), COMPLETION_MARKER_SELECTOR)
            .await
            .is_empty();
        let is_video = !candidates(
            page,
            Scope::Node(item.id),
            ".fa-play, .video-icon, [class*=\"video\"]",
        )
        .await
        .is_empty();
        let (item_id, work_id) = id_segments(&href);
        tasks.push(Task {
            title: non_empty_or(item.snapshot.text.trim(), "Untitled"),
            href,
            is_video,
            estimated_minutes: 0.0,
            work_id,
            item_id,
            completed,
            is_current: false,
        });
    }
    tasks
}

/// Ranked completion detectors, first hit wins.
async fn completion_signal(
    page: &dyn Page,
    item: &Resolved,
    is_current: bool,
) -> Option<CompletionSignal> {
    if !candidates(page, Scope::Node(item.id), COMPLETION_MARKER_SELECTOR)
        .await
        .is_empty()
    {
        return Some(CompletionSignal::Marker);
    }

    if let Some(bar) = candidates(page, Scope::Node(item.id), PROGRESS_SELECTOR)
        .await
        .into_iter()
        .next()
    {
        let value = bar
            .snapshot
            .attr("aria-valuenow")
            .or_else(|| bar.snapshot.attr("value"))
            .or_else(|| bar.snapshot.attr("data-progress"));
        if matches!(value, Some("100") | Some("100%")) {
            return Some(CompletionSignal::Progress);
        }
    }

    let text = item.snapshot.text.to_lowercase();
    if COMPLETION_WORDS.iter().any(|w| text.contains(w)) {
        return Some(CompletionSignal::Text);
    }

    // Grayed-out styling is the weakest signal and would misclassify the
    // highlighted current task.
    if !is_current {
        let style = &item.snapshot.style;
        if style.opacity < 0.7 || style.color.contains("128") || style.color.contains("gray") {
            return Some(CompletionSignal::Style);
        }
    }

    None
}

/// The active task is flagged on the item itself, a descendant, or an
/// ancestor.
async fn detect_current(page: &dyn Page, item: &Resolved) -> bool {
    let marked_self_or_ancestor = matches!(
        page.closest(item.id, CURRENT_TASK_SELECTOR).await,
        Ok(Some(_))
    );
    if marked_self_or_ancestor {
        return true;
    }
    !candidates(page, Scope::Node(item.id), CURRENT_TASK_SELECTOR)
        .await
        .is_empty()
}

/// Last two path segments of the href, query string excluded.
fn id_segments(href: &str) -> (String, String) {
    let path = href.split('?').next().unwrap_or("");
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let work_id = segments.last().copied().unwrap_or("").to_string();
    let item_id = segments
        .len()
        .checked_sub(2)
        .and_then(|i| segments.get(i))
        .copied()
        .unwrap_or("")
        .to_string();
    (item_id, work_id)
}

/// "12 min" captions, with a half-minute margin for startup and buffering.
fn parse_minutes(text: &str) -> Option<f32> {
    let caps = MINUTES_RE.captures(text)?;
    let minutes: f32 = caps.get(1)?.as_str().parse().ok()?;
    Some(minutes + 0.5)
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------

pub async fn persist(store: &mut dyn KeyValueStore, record: &QueueRecord) -> Result<(), StoreError> {
    let json = serde_json::to_string(record)
        .map_err(|e| StoreError::Backend(format!("queue serialization: {e}")))?;
    store.set(QUEUE_KEY, &json).await
}

/// Load the persisted record. Missing or corrupt data yields an empty
/// queue rather than an error.
pub async fn load(store: &dyn KeyValueStore) -> QueueRecord {
    match store.get(QUEUE_KEY).await {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "corrupt queue record, starting empty");
                QueueRecord::default()
            }
        },
        Ok(None) => QueueRecord::default(),
        Err(e) => {
            warn!(error = %e, "queue load failed, starting empty");
            QueueRecord::default()
        }
    }
}

pub async fn clear(store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(QUEUE_KEY).await
}
