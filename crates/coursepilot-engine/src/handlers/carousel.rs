//! Carousel draining: click the "next" control until it disables or
//! disappears, capped against controls that never disable.

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::page::Page;
use crate::resolver::resolve;
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::Scope;

const NEXT_SPECS: &[&str] = &[
    "button.carousel-control-next.accessibility-enabled",
    "button.carousel-control-next",
    ".carousel-control-next-icon",
    "#next",
    r#"button[aria-label="Next"]"#,
    ".next-button",
    ".slide-next",
];

pub async fn process(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let exec = ActionExecutor::new(cfg);
    let mut advanced = 0u32;

    while advanced < cfg.carousel_max_clicks {
        let Some(next) = resolve(page, scope, NEXT_SPECS).await else {
            break;
        };
        if next.snapshot.disabled {
            break;
        }
        if !exec.click(page, next.id, "carousel next control").await {
            break;
        }
        advanced += 1;
        sleep(cfg.interaction_delay).await;
    }

    if advanced > 0 {
        info!(advanced, "advanced carousel slides");
    } else {
        debug!("no carousel control present");
    }
    Ok(advanced > 0)
}
