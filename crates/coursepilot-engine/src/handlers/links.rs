//! Interactive links under known ID conventions. Each click has its
//! default navigation canceled first, so the platform registers the
//! interaction without leaving the page.

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::handlers::enumerate_numbered;
use crate::page::Page;
use crate::resolver::{Resolved, resolve_all};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::Scope;

const LINK_SPECS: &[&str] = &[
    r#"[id^="li-"] > a"#,
    ".interactive-link",
    r##"a[href="#"]"##,
    "a[onclick]",
    ".link-interaction",
    "a[data-interaction]",
];

fn already_visited(link: &Resolved) -> bool {
    link.snapshot.has_class("visited")
        || link.snapshot.has_class("clicked")
        || link.snapshot.attr("aria-visited") == Some("true")
}

pub async fn process(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let mut links = resolve_all(page, scope, LINK_SPECS).await;
    if links.is_empty() {
        links =
            enumerate_numbered(page, scope, cfg.probe_links, |i| format!("#li-{i} > a")).await;
    }

    links.retain(|l| !already_visited(l));
    if links.is_empty() {
        return Ok(false);
    }

    info!(count = links.len(), "clicking interactive links");
    let exec = ActionExecutor::new(cfg);
    for (i, link) in links.iter().enumerate() {
        // Cancel the default action before dispatching; backends without
        // that capability get a plain click.
        if let Err(e) = page.suppress_navigation(link.id).await {
            debug!(error = %e, "navigation suppression unavailable");
        }

        let label = format!("interactive link {}/{}", i + 1, links.len());
        if exec.click(page, link.id, &label).await {
            sleep(cfg.short_delay).await;
            if let Ok(after) = page.snapshot(link.id).await {
                if after.has_class("visited")
                    || after.has_class("clicked")
                    || after.attr("aria-visited") == Some("true")
                {
                    debug!(index = i + 1, "link marked visited");
                }
            }
        }
    }
    Ok(true)
}
