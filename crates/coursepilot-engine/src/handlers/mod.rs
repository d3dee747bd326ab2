//! Widget handlers: one state machine per content archetype.
//!
//! Every handler follows the same contract: discover whether its widget
//! type is present under the given scope, drive it fully, and report
//! whether anything changed. Absence is not an error — a handler finding
//! nothing returns `Ok(false)` without side effects, so running it twice
//! over an already-driven widget reports no progress the second time.

use tracing::debug;

use crate::config::{EngineConfig, ProbeWindow};
use crate::page::Page;
use crate::resolver::Resolved;
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::Scope;

pub mod accordion;
pub mod acknowledge;
pub mod cards;
pub mod carousel;
pub mod complete;
pub mod explore;
pub mod links;
pub mod media;
pub mod quiz;
pub mod survey;
pub mod tabs;

/// The closed set of widget archetypes the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Acknowledgment,
    ExplorePrompt,
    WidgetTabs,
    Carousel,
    NativePlayer,
    Video,
    AriaTabs,
    Accordion,
    InteractiveLinks,
    FlipCards,
    Quiz,
    CompletionButton,
    SurveyFlow,
    ContinueNext,
}

impl WidgetKind {
    /// Fixed priority order for one orchestrator round. Blocking dialogs
    /// come first; the explore prompt runs twice because answering a quiz
    /// can surface it mid-round.
    pub const ROUND_ORDER: &'static [WidgetKind] = &[
        WidgetKind::Acknowledgment,
        WidgetKind::ExplorePrompt,
        WidgetKind::WidgetTabs,
        WidgetKind::Carousel,
        WidgetKind::NativePlayer,
        WidgetKind::Video,
        WidgetKind::AriaTabs,
        WidgetKind::Accordion,
        WidgetKind::InteractiveLinks,
        WidgetKind::FlipCards,
        WidgetKind::Quiz,
        WidgetKind::ExplorePrompt,
        WidgetKind::CompletionButton,
        WidgetKind::SurveyFlow,
        WidgetKind::ContinueNext,
    ];

    /// Drive this widget type to completion under `scope`.
    pub async fn process(
        self,
        page: &mut dyn Page,
        scope: Scope,
        cfg: &EngineConfig,
    ) -> Result<bool, DomError> {
        match self {
            WidgetKind::Acknowledgment => acknowledge::process(page, scope, cfg).await,
            WidgetKind::ExplorePrompt => explore::process(page, scope, cfg).await,
            WidgetKind::WidgetTabs => tabs::process_widget_tabs(page, scope, cfg).await,
            WidgetKind::Carousel => carousel::process(page, scope, cfg).await,
            WidgetKind::NativePlayer => media::process_native_player(page, cfg).await,
            WidgetKind::Video => media::process_videos(page, scope, cfg).await,
            WidgetKind::AriaTabs => tabs::process_aria_tabs(page, scope, cfg).await,
            WidgetKind::Accordion => accordion::process(page, scope, cfg).await,
            WidgetKind::InteractiveLinks => links::process(page, scope, cfg).await,
            WidgetKind::FlipCards => cards::process(page, scope, cfg).await,
            WidgetKind::Quiz => quiz::process(page, scope, cfg).await,
            WidgetKind::CompletionButton => complete::process_completion(page, scope, cfg).await,
            WidgetKind::SurveyFlow => survey::process(page, scope, cfg).await,
            WidgetKind::ContinueNext => complete::process_continue(page, scope, cfg).await,
        }
    }
}

/// Enumerate elements addressed by a numeric ID convention, probing ids
/// upward from 1 within the window's bounds. Only rendered elements count
/// as hits, but a hit keeps the scan alive past invisible gaps.
pub(crate) async fn enumerate_numbered<F>(
    page: &dyn Page,
    scope: Scope,
    window: ProbeWindow,
    make_selector: F,
) -> Vec<Resolved>
where
    F: Fn(u32) -> String,
{
    let mut found: Vec<Resolved> = Vec::new();
    let mut last_hit = 0u32;

    for i in 1..=window.cap {
        let selector = make_selector(i);
        let hit = crate::resolver::candidates(page, scope, &selector)
            .await
            .into_iter()
            .next();
        match hit {
            Some(resolved) => {
                last_hit = i;
                found.push(resolved);
            }
            None => {
                if found.is_empty() && i >= window.give_up_after {
                    break;
                }
                if !found.is_empty() && i > last_hit + window.past_last {
                    break;
                }
            }
        }
    }

    if !found.is_empty() {
        debug!(count = found.len(), "numbered-id enumeration found elements");
    }
    found
}

/// Best-effort element marking; a vanished node is not an error.
pub(crate) async fn mark(page: &mut dyn Page, id: coursepilot_common::protocol::NodeId, name: &str) {
    if let Err(e) = page.set_attribute(id, name, "true").await {
        debug!(id, name, error = %e, "failed to mark element");
    }
}
