//! The action executor: the only component that mutates the page.
//!
//! A click is attempted up to a bounded number of times. Immediately
//! before each attempt the element is re-read and must still be rendered
//! and enabled; the element is scrolled into view, a settle pause runs,
//! and the click is dispatched. Nothing thrown inside ever escapes —
//! every failure degrades to a retry, and exhaustion to `false`.

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::page::Page;
use coursepilot_common::error::DomError;
use coursepilot_common::noise::is_host_noise;
use coursepilot_common::protocol::NodeId;

pub struct ActionExecutor<'a> {
    cfg: &'a EngineConfig,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(cfg: &'a EngineConfig) -> Self {
        Self { cfg }
    }

    /// Click `id`, retrying on transient failure. Returns true once a
    /// click was dispatched, false after all attempts were exhausted or
    /// the preconditions never held.
    pub async fn click(&self, page: &mut dyn Page, id: NodeId, what: &str) -> bool {
        for attempt in 1..=self.cfg.click_attempts {
            match self.attempt(page, id).await {
                Ok(true) => {
                    debug!(what, attempt, "clicked");
                    return true;
                }
                Ok(false) => {
                    debug!(what, attempt, "click preconditions not met");
                }
                Err(e) => self.report(what, attempt, &e),
            }
            sleep(self.cfg.click_retry_delay).await;
        }
        false
    }

    async fn attempt(&self, page: &mut dyn Page, id: NodeId) -> Result<bool, DomError> {
        let snapshot = page.snapshot(id).await?;
        if !snapshot.clickable() {
            return Ok(false);
        }
        page.scroll_into_view(id).await?;
        sleep(self.cfg.click_settle).await;
        page.click(id).await?;
        Ok(true)
    }

    /// Host-page script garbage is demoted to debug so it is never
    /// mistaken for an engine failure.
    fn report(&self, what: &str, attempt: u32, error: &DomError) {
        match error {
            DomError::Script(msg) if is_host_noise(None, msg) => {
                debug!(what, attempt, error = %error, "suppressed host noise during click");
            }
            _ => warn!(what, attempt, error = %error, "click attempt failed"),
        }
    }
}
