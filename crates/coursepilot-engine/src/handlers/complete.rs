//! Explicit completion buttons, and the generic continue/next probe that
//! closes out every round.

use tokio::time::sleep;
use tracing::info;

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::page::Page;
use crate::resolver::{resolve, wait_for};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::Scope;

const COMPLETION_SPECS: &[&str] = &[
    ".complete-button",
    ".mark-complete",
    r#"[data-action="complete"]"#,
    r#"button:contains("Complete")"#,
    r#"input[type="submit"][value*="complete"]"#,
];

const CONTINUE_SPECS: &[&str] = &[
    r#"button:contains("Continue")"#,
    r#"button:contains("Next")"#,
    ".continue-btn",
    ".next-btn",
    r#"[data-action="continue"]"#,
];

pub async fn process_completion(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let Some(button) = resolve(page, scope, COMPLETION_SPECS).await else {
        return Ok(false);
    };
    let exec = ActionExecutor::new(cfg);
    if exec.click(page, button.id, "completion button").await {
        info!("clicked completion button");
        sleep(cfg.interaction_delay).await;
        return Ok(true);
    }
    Ok(false)
}

/// Generic continue/next controls can appear late; give them a short
/// polled window rather than a single look.
pub async fn process_continue(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let Some(button) = wait_for(
        page,
        scope,
        CONTINUE_SPECS,
        cfg.continue_probe_timeout,
        cfg.poll_interval,
    )
    .await
    else {
        return Ok(false);
    };
    let exec = ActionExecutor::new(cfg);
    Ok(exec.click(page, button.id, "continue control").await)
}
