//! The round orchestrator: drives the widget handlers in priority order,
//! repeating rounds until no handler reports progress or the content
//! probe finds nothing left, with a hard round cap against pages that
//! keep regenerating content.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::handlers::{WidgetKind, media};
use crate::page::Page;
use crate::probe::{RemainingContent, remaining_content};
use coursepilot_common::protocol::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Scanning,
    Converged,
}

/// Result of one round: whether any handler made progress, and the
/// post-round probe findings. The probe only runs after a productive
/// round; an unproductive round converges without it.
#[derive(Debug, Clone, Copy)]
pub struct RoundResult {
    pub progressed: bool,
    pub remaining: Option<RemainingContent>,
}

impl RoundResult {
    /// The stopping decision is a pure function of the round result: stop
    /// when nothing progressed, or when the probe found nothing further.
    pub fn converged(&self) -> bool {
        !self.progressed || self.remaining.is_none_or(|r| !r.any())
    }
}

/// What happened while driving one scope to convergence.
#[derive(Debug, Clone, Copy)]
pub struct DriveOutcome {
    pub rounds: u32,
    pub progressed: bool,
}

pub struct Orchestrator<'a> {
    cfg: &'a EngineConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(cfg: &'a EngineConfig) -> Self {
        Self { cfg }
    }

    /// Process the whole page: embedded frames best-effort first, then
    /// the main document. A frame that cannot be processed never blocks
    /// the rest.
    pub async fn run(&self, page: &mut dyn Page) -> DriveOutcome {
        match page.frames().await {
            Ok(frames) => {
                for frame in frames {
                    debug!(frame, "processing embedded frame");
                    let outcome = self.drive(page, Scope::Frame(frame)).await;
                    debug!(frame, rounds = outcome.rounds, "frame processed");
                }
            }
            Err(e) => debug!(error = %e, "frame enumeration unavailable"),
        }

        self.drive(page, Scope::Document).await
    }

    /// Drive one scope until convergence or the round cap.
    pub async fn drive(&self, page: &mut dyn Page, scope: Scope) -> DriveOutcome {
        sleep(self.cfg.content_settle).await;

        let mut state = OrchestratorState::Scanning;
        let mut rounds = 0u32;
        let mut progressed = false;

        while state == OrchestratorState::Scanning && rounds < self.cfg.round_cap {
            rounds += 1;
            debug!(round = rounds, cap = self.cfg.round_cap, "starting round");

            let result = self.round(page, scope).await;
            progressed |= result.progressed;

            if result.converged() {
                if result.progressed {
                    // Driving other widgets can reveal a final video;
                    // sweep once before declaring convergence.
                    match media::process_videos(page, scope, self.cfg).await {
                        Ok(true) => debug!("played videos revealed after the last round"),
                        Ok(false) => {}
                        Err(e) => warn!(error = %e, "final video sweep failed"),
                    }
                }
                state = OrchestratorState::Converged;
            } else {
                debug!(
                    remaining = result.remaining.map(|r| r.total()).unwrap_or(0),
                    "content remains, running another round"
                );
            }
        }

        if state == OrchestratorState::Converged {
            info!(rounds, progressed, "scope converged");
        } else {
            warn!(rounds, "round cap reached before convergence");
        }
        DriveOutcome { rounds, progressed }
    }

    /// One pass over the handlers in priority order, followed by the
    /// remaining-content probe when anything progressed. A handler
    /// failure is contained: it counts as no progress for that handler
    /// only and never blocks the others.
    async fn round(&self, page: &mut dyn Page, scope: Scope) -> RoundResult {
        let mut progressed = false;
        for kind in WidgetKind::ROUND_ORDER {
            match kind.process(page, scope, self.cfg).await {
                Ok(true) => {
                    debug!(handler = ?kind, "handler made progress");
                    progressed = true;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(handler = ?kind, error = %e, "handler failed, continuing round");
                }
            }
        }

        let remaining = if progressed {
            sleep(self.cfg.dialog_delay).await;
            Some(remaining_content(page, scope).await)
        } else {
            None
        };

        RoundResult {
            progressed,
            remaining,
        }
    }
}
