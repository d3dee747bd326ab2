//! Remaining-content probe: after a productive round, counts the
//! interactive elements that are still unhandled. The orchestrator's
//! stopping decision is a pure function of these counts.

use crate::page::Page;
use crate::resolver::count;
use coursepilot_common::protocol::Scope;

/// Per-category counts of still-actionable elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemainingContent {
    pub tabs: usize,
    pub cards: usize,
    pub accordion_sections: usize,
    pub links: usize,
    pub videos: usize,
    pub quiz: usize,
    pub aria_tabs: usize,
}

impl RemainingContent {
    pub fn any(&self) -> bool {
        self.total() > 0
    }

    pub fn total(&self) -> usize {
        self.tabs
            + self.cards
            + self.accordion_sections
            + self.links
            + self.videos
            + self.quiz
            + self.aria_tabs
    }
}

/// Count unhandled interactive content under `scope`. Individual query
/// failures count as zero; the probe never errors.
pub async fn remaining_content(page: &dyn Page, scope: Scope) -> RemainingContent {
    RemainingContent {
        tabs: count(page, scope, r#"[id^="btn_tab"]:not(.visited):not(.active)"#).await
            + count(page, scope, "#my-tab span:not(.visited)").await,
        cards: count(page, scope, r#"[id^="card"]:not(.flipped):not(.revealed)"#).await,
        accordion_sections: count(page, scope, r#"#accordion [aria-expanded="false"]"#).await
            + count(page, scope, r#"[id^="id_"] button:not(.expanded)"#).await,
        links: count(page, scope, r#"[id^="li-"] > a:not(.visited)"#).await,
        videos: count(page, scope, "video:not([data-played])").await,
        quiz: count(page, scope, r#"[id^="mcq_"]:not([data-answered])"#).await
            + count(page, scope, ".quiz-option:not([data-answered])").await,
        aria_tabs: count(page, scope, r#"[role="tab"]:not([aria-selected="true"])"#).await,
    }
}
