//! Video playback: drive every visible, not-yet-marked video element to
//! its end, muted. Custom play controls are located heuristically and
//! screened hard against navigation/submit lookalikes — a wrong click
//! here can leave the page or submit a form.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::handlers::mark;
use crate::page::Page;
use crate::resolver::{Resolved, candidates};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::{MediaState, Scope};

pub const VIDEO_SELECTOR: &str = "video, .video-player video, #video-element";

/// Attribute marking a video the engine has already driven to completion.
pub const PLAYED_MARK: &str = "data-played";

/// Candidate play controls, most specific first. The trailing entries
/// cover common player skins.
const PLAY_BUTTON_SPECS: &[&str] = &[
    "div.slip_left_controls > button > span.slip",
    "#player-controls div.slip_left_controls button span.slip",
    "div.slip_left_controls button",
    ".slip_left_controls > button",
    r#"#player span.slip_button_icon[class*="play"]"#,
    ".video-container .play-button",
    ".player-container .play-button",
    ".video-overlay .play-button",
    "button.video-play",
    ".video-controls .play",
    r#"[data-action="play"][data-video]"#,
    ".player-play-button",
    ".jwplayer .jw-display-icon-container",
    ".vjs-big-play-button",
];

/// Containers a play control is searched within, nearest first.
const PLAYER_CONTAINER_SELECTOR: &str =
    ".video-container, .player-container, .video-wrapper, #player, #player-controls";

const DENY_TEXT: &[&str] = &[
    "back",
    "previous",
    "prev",
    "return",
    "submit",
    "agree",
    "acknowledge",
];
const DENY_CLASS: &[&str] = &["back", "prev", "return", "nav", "submit"];
const DENY_ARIA: &[&str] = &["back", "previous", "return", "submit"];

/// Scripted player APIs (JWPlayer-style) are handled before element-level
/// video discovery: mute, play, wait for completion with a hard ceiling.
pub async fn process_native_player(
    page: &mut dyn Page,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    if !page.native_player_start().await? {
        return Ok(false);
    }
    info!("scripted player detected, playing muted");
    let done = page
        .wait_native_player_complete(cfg.native_player_timeout)
        .await?;
    if !done {
        warn!("scripted player did not report completion before timeout");
    }
    Ok(true)
}

/// Play all unmarked videos. New videos can appear after other widgets
/// are driven, so discovery retries across bounded rounds, stopping early
/// once a round plays nothing new.
pub async fn process_videos(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let mut total = 0u32;

    for round in 1..=cfg.video_discovery_rounds {
        let videos = unplayed_videos(page, scope).await;
        if videos.is_empty() {
            break;
        }
        debug!(count = videos.len(), round, "found unplayed videos");

        let mut played_this_round = 0u32;
        for (i, video) in videos.iter().enumerate() {
            debug!(index = i + 1, total = videos.len(), "playing video");
            if play_to_end(page, scope, cfg, video).await {
                played_this_round += 1;
                total += 1;
                // Other widgets may reveal themselves after playback.
                sleep(cfg.dialog_delay).await;
            }
        }

        if played_this_round == 0 {
            break;
        }
        sleep(cfg.video_rescan_delay).await;
    }

    if total > 0 {
        info!(total, "finished playing videos");
    }
    Ok(total > 0)
}

/// Visible, unended video elements not yet carrying the played mark.
pub async fn unplayed_videos(page: &dyn Page, scope: Scope) -> Vec<Resolved> {
    let mut out = Vec::new();
    for video in candidates(page, scope, VIDEO_SELECTOR).await {
        if video.snapshot.attr(PLAYED_MARK).is_some() {
            continue;
        }
        match page.media_state(video.id).await {
            Ok(state) if state.ended => continue,
            Ok(_) => out.push(video),
            Err(e) => {
                debug!(id = video.id, error = %e, "media state unavailable");
            }
        }
    }
    out
}

/// Drive one video to its end. Errors degrade to false; the discovery
/// loop decides whether to retry.
async fn play_to_end(page: &mut dyn Page, scope: Scope, cfg: &EngineConfig, video: &Resolved) -> bool {
    if let Err(e) = page.set_muted(video.id, true).await {
        debug!(error = %e, "could not mute video");
    }

    click_play_control(page, scope, cfg, video).await;

    if let Err(e) = page.play_media(video.id).await {
        warn!(error = %e, "video playback blocked");
        return false;
    }
    debug!("video playing muted");

    let state = match page.media_state(video.id).await {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "lost media state after play");
            return false;
        }
    };

    if !state.near_end() {
        let timeout = end_wait_timeout(&state, cfg);
        match page.wait_media_ended(video.id, timeout).await {
            Ok(true) => debug!("video ended"),
            Ok(false) => warn!("video end wait timed out, assuming done"),
            Err(e) => {
                warn!(error = %e, "video end wait failed");
                return false;
            }
        }
    }

    mark(page, video.id, PLAYED_MARK).await;
    true
}

/// Remaining playback plus a margin, clamped to the configured ceiling.
fn end_wait_timeout(state: &MediaState, cfg: &EngineConfig) -> Duration {
    if state.duration <= 0.0 {
        return cfg.video_end_ceiling;
    }
    let remaining = (state.duration - state.position).max(0.0);
    Duration::from_secs_f64(remaining + 5.0).min(cfg.video_end_ceiling)
}

/// Find and click a custom play control for this video, if one passes the
/// screening: not a navigation/submit button, not a pause toggle already
/// in the playing state, and positioned on or near the video.
async fn click_play_control(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
    video: &Resolved,
) {
    let (search_scope, scoped) = match page.closest(video.id, PLAYER_CONTAINER_SELECTOR).await {
        Ok(Some(container)) => (Scope::Node(container), true),
        _ => (scope, false),
    };
    let exec = ActionExecutor::new(cfg);

    for spec in PLAY_BUTTON_SPECS {
        let Some(button) = candidates(page, search_scope, spec).await.into_iter().next() else {
            continue;
        };
        if !button.snapshot.clickable() {
            continue;
        }

        if is_denied(&button) {
            debug!(spec, "skipping non-play button");
            continue;
        }

        // Toggle controls show the same element for play and pause; the
        // state classes disambiguate, with native paused state as the
        // fallback.
        if spec.contains("slip_left_controls")
            && !toggle_means_paused(page, video, &button).await
        {
            debug!(spec, "video already playing, skipping toggle");
            continue;
        }

        let near = scoped || button.snapshot.rect.within(&video.snapshot.rect, 100.0);
        if !near {
            debug!(spec, "skipping play control distant from video");
            continue;
        }

        if exec.click(page, button.id, "video play control").await {
            debug!(spec, "clicked play control");
            sleep(cfg.interaction_delay).await;
            break;
        }
    }
}

fn is_denied(button: &Resolved) -> bool {
    let text = button.snapshot.text.to_lowercase();
    let class = button.snapshot.classes.join(" ").to_lowercase();
    let aria = button
        .snapshot
        .attr("aria-label")
        .unwrap_or_default()
        .to_lowercase();
    let type_attr = button.snapshot.attr("type").unwrap_or_default();

    DENY_TEXT.iter().any(|w| text.contains(w))
        || DENY_CLASS.iter().any(|w| class.contains(w))
        || DENY_ARIA.iter().any(|w| aria.contains(w))
        || type_attr.eq_ignore_ascii_case("submit")
}

async fn toggle_means_paused(page: &dyn Page, video: &Resolved, button: &Resolved) -> bool {
    let state_span = candidates(page, Scope::Node(button.id), "span.slip")
        .await
        .into_iter()
        .next()
        .map(|s| s.snapshot)
        .or_else(|| {
            if button.snapshot.has_class("slip") {
                Some(button.snapshot.clone())
            } else {
                None
            }
        });

    if let Some(span) = state_span {
        if span.has_class("slip-play") {
            return true; // shows the play glyph: video is paused
        }
        if span.has_class("slip-pause") {
            return false; // shows the pause glyph: already playing
        }
    }
    match page.media_state(video.id).await {
        Ok(state) => state.paused,
        Err(_) => true,
    }
}
