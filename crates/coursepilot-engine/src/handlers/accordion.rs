//! Accordion sections: expand every collapsed section inside a known
//! accordion container, by selector catalog or numbered-ID probing.

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::handlers::enumerate_numbered;
use crate::page::Page;
use crate::resolver::{Resolved, resolve, resolve_all};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::Scope;

const SECTION_SPECS: &[&str] = &[
    "#accordion button",
    r#"[id^="id_"] button"#,
    ".accordion-button",
    ".accordion-item button",
    ".mouse-down button",
    ".accordion-header",
    r#"[role="button"][aria-expanded]"#,
];

fn already_expanded(section: &Resolved) -> bool {
    section.snapshot.attr("aria-expanded") == Some("true")
        || section.snapshot.has_class("expanded")
}

pub async fn process(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let Some(container) = resolve(page, scope, &["#accordion"]).await else {
        return Ok(false);
    };

    let exec = ActionExecutor::new(cfg);

    // Some accordions require a first activation of the container itself.
    if container.snapshot.clickable() {
        exec.click(page, container.id, "accordion container").await;
        sleep(cfg.short_delay).await;
    }

    let mut sections = resolve_all(page, Scope::Node(container.id), SECTION_SPECS).await;
    if sections.is_empty() {
        sections =
            enumerate_numbered(page, scope, cfg.probe_small, |i| format!("#id_{i} button")).await;
    }

    sections.retain(|s| !already_expanded(s));
    if sections.is_empty() {
        return Ok(false);
    }

    info!(count = sections.len(), "expanding accordion sections");
    for (i, section) in sections.iter().enumerate() {
        let label = format!("accordion section {}/{}", i + 1, sections.len());
        if exec.click(page, section.id, &label).await {
            sleep(cfg.interaction_delay).await;
            if let Ok(after) = page.snapshot(section.id).await {
                if after.attr("aria-expanded") == Some("true") || after.has_class("expanded") {
                    debug!(index = i + 1, "section expanded");
                }
            }
        }
    }
    Ok(true)
}
