//! Element resolution over selector spec lists.
//!
//! Resolution is the foundation everything else stands on: given an
//! ordered spec list, return the first rendered match. Failures to
//! evaluate one spec (bad syntax, denied frame, vanished node) never
//! abort resolution — they are logged at debug level and the next spec is
//! tried. Only exhausting the whole list yields `None`.

use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::page::Page;
use crate::selector::{SelectorKind, parse};
use coursepilot_common::protocol::{ElementSnapshot, NodeId, Scope};

/// A resolved element: node handle plus the snapshot it was matched on.
/// Valid only for the current processing round; the DOM may mutate at any
/// suspension point.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub id: NodeId,
    pub snapshot: ElementSnapshot,
}

/// First rendered element matching any spec, in spec order then document
/// order.
pub async fn resolve(page: &dyn Page, scope: Scope, specs: &[&str]) -> Option<Resolved> {
    for spec in specs {
        if let Some(found) = candidates(page, scope, spec).await.into_iter().next() {
            return Some(found);
        }
    }
    None
}

/// All rendered matches of the first spec in the list that yields any.
pub async fn resolve_all(page: &dyn Page, scope: Scope, specs: &[&str]) -> Vec<Resolved> {
    for spec in specs {
        let found = candidates(page, scope, spec).await;
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

/// Rendered matches for a single spec entry. Evaluation errors resolve to
/// an empty list.
pub async fn candidates(page: &dyn Page, scope: Scope, spec: &str) -> Vec<Resolved> {
    let Some(kind) = parse(spec) else {
        debug!(spec, "skipping unparseable selector spec");
        return Vec::new();
    };

    let (selector, needle) = match &kind {
        SelectorKind::Structural(s) => (*s, None),
        SelectorKind::TextMatch { base, needle } => (*base, Some(needle.as_str())),
    };

    let ids = match page.query(scope, selector).await {
        Ok(ids) => ids,
        Err(e) => {
            debug!(selector, error = %e, "selector evaluation failed");
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    for id in ids {
        let snapshot = match page.snapshot(id).await {
            Ok(s) => s,
            Err(e) => {
                debug!(id, error = %e, "snapshot failed during resolution");
                continue;
            }
        };
        if !snapshot.visible {
            continue;
        }
        if let Some(needle) = needle {
            if !snapshot.text_contains(needle) {
                continue;
            }
        }
        found.push(Resolved { id, snapshot });
    }
    found
}

/// Raw match count for a structural selector, ignoring visibility.
/// Used by the remaining-content probe; errors count as zero.
pub async fn count(page: &dyn Page, scope: Scope, selector: &str) -> usize {
    match page.query(scope, selector).await {
        Ok(ids) => ids.len(),
        Err(e) => {
            debug!(selector, error = %e, "probe query failed");
            0
        }
    }
}

/// Poll for an element to appear, up to `timeout`. Always performs at
/// least one resolution pass.
pub async fn wait_for(
    page: &dyn Page,
    scope: Scope,
    specs: &[&str],
    timeout: Duration,
    poll: Duration,
) -> Option<Resolved> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(found) = resolve(page, scope, specs).await {
            return Some(found);
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(poll).await;
    }
}
