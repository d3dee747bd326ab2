//! Flip-cards: click every unflipped card once, then check its own
//! success condition — remaining unflipped cards and a now-enabled
//! "next" control.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::handlers::enumerate_numbered;
use crate::page::Page;
use crate::resolver::{Resolved, candidates, resolve, resolve_all};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::{NodeId, Scope};

const CARD_SPECS: &[&str] = &[
    r#"[id^="card"]"#,
    "li div.front span",
    ".card",
    ".flip-card",
    "[data-card]",
    ".interactive-card",
];

const NEXT_SPECS: &[&str] = &[
    "#next",
    r#"button:contains("Next")"#,
    ".next-btn",
    r#"[data-action="next"]"#,
    r#"button[aria-label="Next"]"#,
    r#"input[value="Next"]"#,
];

fn flipped(snapshot: &coursepilot_common::protocol::ElementSnapshot) -> bool {
    snapshot.has_class("flipped") || snapshot.has_class("revealed") || snapshot.has_class("active")
}

pub async fn process(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let mut cards: Vec<Resolved> = resolve_all(page, scope, CARD_SPECS).await;
    cards.retain(|c| !flipped(&c.snapshot) && !c.snapshot.has_class("disabled"));

    if cards.is_empty() {
        // Numbered fallback: the clickable face may be nested inside the
        // card container.
        let containers =
            enumerate_numbered(page, scope, cfg.probe_small, |i| format!("#card{i}")).await;
        for container in containers {
            if flipped(&container.snapshot) {
                continue;
            }
            let face = candidates(page, Scope::Node(container.id), "div.front span")
                .await
                .into_iter()
                .next();
            let face = match face {
                Some(f) => f,
                None => candidates(page, Scope::Node(container.id), ".front")
                    .await
                    .into_iter()
                    .next()
                    .unwrap_or(container),
            };
            cards.push(face);
        }
    }

    if cards.is_empty() {
        return Ok(false);
    }

    info!(count = cards.len(), "flipping cards");
    let exec = ActionExecutor::new(cfg);
    for (i, card) in cards.iter().enumerate() {
        let label = format!("card {}/{}", i + 1, cards.len());
        if exec.click(page, card.id, &label).await {
            sleep(cfg.interaction_delay).await;
        } else {
            warn!(index = i + 1, "failed to click card");
        }
    }

    // Let flip animations finish, then verify against visual state flags.
    sleep(cfg.dialog_delay).await;
    let mut remaining = 0usize;
    for card in &cards {
        if !card_flipped_now(page, card.id).await {
            remaining += 1;
        }
    }
    if remaining > 0 {
        warn!(remaining, "some cards did not flip");
    } else {
        debug!("all cards flipped");
    }

    // Flipping everything usually enables the next control.
    if let Some(next) = resolve(page, scope, NEXT_SPECS).await {
        if !next.snapshot.disabled && exec.click(page, next.id, "next control after cards").await {
            sleep(cfg.dialog_delay).await;
        }
    }
    Ok(true)
}

/// Re-read the card's container for a flipped/revealed marker.
async fn card_flipped_now(page: &dyn Page, id: NodeId) -> bool {
    let root = match page.closest(id, r#"[id^="card"]"#).await {
        Ok(Some(root)) => root,
        _ => id,
    };
    match page.snapshot(root).await {
        Ok(snapshot) => flipped(&snapshot),
        Err(_) => false,
    }
}
