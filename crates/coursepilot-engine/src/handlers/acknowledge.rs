//! Acknowledgment dialogs: modal containers demanding an "I agree" style
//! confirmation before content unlocks. Click the first resolvable
//! confirm control, falling back to any clickable descendant.

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::page::Page;
use crate::resolver::{Resolved, candidates, resolve, resolve_all};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::Scope;

const DIALOG_SPECS: &[&str] = &[
    ".acknowledgment-dialog",
    ".acknowledgment-modal",
    "[data-acknowledgment]",
    r#".modal:contains("acknowledgment")"#,
    r#".dialog:contains("acknowledgment")"#,
    r#".popup:contains("acknowledgment")"#,
    r#"div:contains("requires you to view and acknowledge")"#,
    r#"div:contains("acknowledge this content")"#,
    r#"[class*="acknowledge"]"#,
    r#"[id*="acknowledge"]"#,
];

const CONFIRM_SPECS: &[&str] = &[
    r#"button:contains("I agree")"#,
    r#"button:contains("Agree")"#,
    r#"button:contains("Accept")"#,
    r#"button:contains("Acknowledge")"#,
    r#"button:contains("Continue")"#,
    r#"button:contains("Confirm")"#,
    ".confirm-button",
    ".agree-button",
    ".acknowledge-button",
    r#"[data-action="agree"]"#,
    r#"[data-action="acknowledge"]"#,
    r#"[data-action="confirm"]"#,
];

/// Generic modal containers, consulted when no dedicated acknowledgment
/// dialog resolves.
const MODAL_SPECS: &[&str] = &[
    ".modal.show",
    ".modal.active",
    ".overlay.active",
    ".popup.active",
    ".dialog.open",
];

const CLICKABLE_DESCENDANTS: &str = r#"button, input[type="submit"], [role="button"]"#;

pub async fn process(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let exec = ActionExecutor::new(cfg);

    if let Some(dialog) = resolve(page, scope, DIALOG_SPECS).await {
        info!("acknowledgment dialog present");
        if confirm_inside(page, cfg, &exec, &dialog).await {
            return Ok(true);
        }
    }

    // A generic modal can also be the blocking acknowledgment; match on
    // its text before touching it.
    for modal in resolve_all(page, scope, MODAL_SPECS).await {
        let text = modal.snapshot.text.to_lowercase();
        if !(text.contains("acknowledge") || text.contains("agree") || text.contains("view and")) {
            continue;
        }
        info!("acknowledgment-like modal present");
        if let Some(button) = candidates(page, Scope::Node(modal.id), CLICKABLE_DESCENDANTS)
            .await
            .into_iter()
            .next()
        {
            if exec.click(page, button.id, "modal confirm").await {
                sleep(cfg.dialog_delay).await;
                return Ok(true);
            }
        }
    }

    Ok(false)
}

async fn confirm_inside(
    page: &mut dyn Page,
    cfg: &EngineConfig,
    exec: &ActionExecutor<'_>,
    dialog: &Resolved,
) -> bool {
    if let Some(confirm) = resolve(page, Scope::Node(dialog.id), CONFIRM_SPECS).await {
        debug!(text = %confirm.snapshot.text, "clicking acknowledgment confirm");
        if exec.click(page, confirm.id, "acknowledgment confirm").await {
            sleep(cfg.dialog_delay).await;
            return true;
        }
    }

    // No named confirm control: any clickable descendant will do.
    for button in candidates(page, Scope::Node(dialog.id), CLICKABLE_DESCENDANTS).await {
        if exec.click(page, button.id, "acknowledgment element").await {
            sleep(cfg.dialog_delay).await;
            return true;
        }
    }
    false
}
