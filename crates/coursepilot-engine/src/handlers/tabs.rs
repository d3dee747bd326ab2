//! Tab widgets: click every unselected tab in one pass. There is no
//! correctness feedback loop — activating a tab is itself the completion
//! action.

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::handlers::enumerate_numbered;
use crate::page::Page;
use crate::resolver::{Resolved, resolve, resolve_all};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::Scope;

const GENERIC_TAB_SPECS: &[&str] = &[
    "#my-tab span",
    r#"[id^="btn_tab"]"#,
    r#"[id^="tab-0-0-"]"#,
    r#"[id^="tab-"]"#,
    ".slic-tab",
    ".tab-button",
];

const ARIA_TAB_SPECS: &[&str] = &[r#"[role="tab"]:not([aria-selected="true"])"#];

fn already_selected(tab: &Resolved) -> bool {
    tab.snapshot.has_class("active")
        || tab.snapshot.has_class("visited")
        || tab.snapshot.attr("aria-selected") == Some("true")
}

/// Widget-level tab sets: numbered `#btn_tabN` ids first, then the
/// generic selector catalog, then spans under a `#my-tab` container.
pub async fn process_widget_tabs(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let mut tabs =
        enumerate_numbered(page, scope, cfg.probe_small, |i| format!("#btn_tab{i}")).await;

    if tabs.is_empty() {
        tabs = resolve_all(page, scope, GENERIC_TAB_SPECS).await;
    }

    if tabs.is_empty() {
        if let Some(container) = resolve(page, scope, &["#my-tab"]).await {
            tabs = resolve_all(page, Scope::Node(container.id), &["span"]).await;
        }
    }

    tabs.retain(|t| !already_selected(t));
    if tabs.is_empty() {
        return Ok(false);
    }

    info!(count = tabs.len(), "activating widget tabs");
    click_all(page, cfg, &tabs, "widget tab").await;
    Ok(true)
}

/// Page-level ARIA tabs, a separate orchestrator step run after videos.
pub async fn process_aria_tabs(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let tabs = resolve_all(page, scope, ARIA_TAB_SPECS).await;
    if tabs.is_empty() {
        return Ok(false);
    }

    info!(count = tabs.len(), "activating unselected page tabs");
    click_all(page, cfg, &tabs, "page tab").await;
    Ok(true)
}

async fn click_all(page: &mut dyn Page, cfg: &EngineConfig, tabs: &[Resolved], what: &str) {
    let exec = ActionExecutor::new(cfg);
    for (i, tab) in tabs.iter().enumerate() {
        let label = format!("{what} {}/{}: {:?}", i + 1, tabs.len(), tab.snapshot.text);
        if exec.click(page, tab.id, &label).await {
            sleep(cfg.interaction_delay).await;
            if let Ok(after) = page.snapshot(tab.id).await {
                if after.has_class("active")
                    || after.has_class("visited")
                    || after.attr("aria-selected") == Some("true")
                {
                    debug!(index = i + 1, "tab activated");
                }
            }
        }
    }
}
