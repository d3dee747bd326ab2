//! The cross-navigation task queue record.
//!
//! The browsing context is destroyed on every navigation, so the queue is
//! an explicit serializable record (ordered task list + cursor) rather
//! than live object references. The cursor is the single source of truth
//! for which task is active and satisfies `0 <= cursor <= tasks.len()`
//! after every operation.

use serde::{Deserialize, Serialize};
use url::Url;

/// One course item, produced once during queue construction.
///
/// `completed` reflects scrape-time DOM inference, not a guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub href: String,
    pub title: String,
    pub is_video: bool,
    /// Estimated minutes for video items, 0.0 otherwise.
    pub estimated_minutes: f32,
    pub work_id: String,
    pub item_id: String,
    pub completed: bool,
    pub is_current: bool,
}

/// The persisted queue: ordered tasks plus the active-task cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueRecord {
    pub tasks: Vec<Task>,
    pub cursor: usize,
}

impl QueueRecord {
    /// Build a fresh record. The cursor always starts at the *last* task:
    /// the listing page is revisited after progress, so the last entry is
    /// where the learner left off.
    pub fn build(tasks: Vec<Task>) -> Self {
        let cursor = tasks.len().saturating_sub(1);
        Self { tasks, cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// The active task, if the cursor has not run off the end.
    pub fn current(&self) -> Option<&Task> {
        self.tasks.get(self.cursor)
    }

    /// Move to the next task. Returns false once the cursor has passed the
    /// last task, at which point the caller clears the persisted record.
    pub fn advance(&mut self) -> bool {
        if self.cursor < self.tasks.len() {
            self.cursor += 1;
        }
        self.cursor < self.tasks.len()
    }

    /// Find the task whose href matches `current_url`, by full equality or
    /// by equal path. Used to correct cursor drift after navigations the
    /// engine did not itself issue.
    pub fn position_of_url(&self, current_url: &str) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| urls_match(&t.href, current_url))
    }

    /// Snap the cursor to the task matching `current_url`, if any.
    /// Returns true when the cursor moved.
    pub fn reconcile_cursor(&mut self, current_url: &str) -> bool {
        match self.position_of_url(current_url) {
            Some(pos) if pos != self.cursor => {
                self.cursor = pos;
                true
            }
            _ => false,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Incomplete tasks at or after the cursor.
    pub fn actual_remaining(&self) -> usize {
        self.tasks
            .iter()
            .skip(self.cursor)
            .filter(|t| !t.completed)
            .count()
    }

    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            total: self.tasks.len(),
            cursor: self.cursor,
            remaining: self.tasks.len().saturating_sub(self.cursor),
            completed: self.completed_count(),
            actual_remaining: self.actual_remaining(),
            video_count: self.tasks.iter().filter(|t| t.is_video).count(),
            total_video_minutes: self
                .tasks
                .iter()
                .filter(|t| t.is_video)
                .map(|t| t.estimated_minutes)
                .sum::<f32>()
                .round() as u32,
            current: self.current().cloned(),
        }
    }
}

/// Display snapshot consumed by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub total: usize,
    pub cursor: usize,
    pub remaining: usize,
    pub completed: usize,
    pub actual_remaining: usize,
    pub video_count: usize,
    pub total_video_minutes: u32,
    pub current: Option<Task>,
}

/// Full equality, or equal parsed path. Unparseable URLs fall back to
/// string equality.
fn urls_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (Url::parse(a), Url::parse(b)) {
        (Ok(ua), Ok(ub)) => ua.path() == ub.path(),
        _ => false,
    }
}
