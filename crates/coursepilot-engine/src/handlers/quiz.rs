//! Quiz brute force.
//!
//! There is no accessible correct-answer metadata, so correctness is
//! inferred behaviorally: a try-again dialog or a video-position
//! regression means wrong (replaying the video is the platform's penalty
//! for incorrect answers); a success dialog or the absence of any
//! negative signal means right. Candidates are tried at most once each,
//! in document order, with early exit on the first success — convergent,
//! not guaranteed correct.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::handlers::mark;
use crate::page::Page;
use crate::resolver::{Resolved, candidates, resolve};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::{NodeId, Scope};

/// Attribute marking answer options of a quiz that already reached a
/// success outcome.
pub const ANSWERED_MARK: &str = "data-answered";

/// Position drop below which a seek is considered playback jitter rather
/// than a penalty replay.
const REGRESSION_THRESHOLD_SECS: f64 = 5.0;

const MCQ_SPECS: &[&str] = &[
    r#"[id^="answer_content_"] td.u-wrap"#,
    r#"[id^="answer_content_"] td"#,
    r#"[id^="answer_content_"]"#,
    r#"[id^="mcq_"]"#,
    r#"[id^="answer_"]"#,
    r#"[id^="option_"]"#,
    ".mcq-option",
    ".quiz-option",
    r#"input[type="radio"]"#,
    ".answer-choice",
    "[data-option]",
    ".option-button",
];

const SUBMIT_SPECS: &[&str] = &[
    "div.feedback-section span",
    r#"button[aria-label="Submit Answer"]"#,
    r#"span:contains("Submit Answer")"#,
    "div.section-mrq button",
    r#"button:contains("Submit")"#,
    r#"[value*="submit"]"#,
    ".submit-btn",
    ".quiz-submit",
    r#"input[type="submit"]"#,
    r#"button[type="submit"]"#,
    r#"[data-action="submit"]"#,
];

const RETRY_SPECS: &[&str] = &[
    r#"button:contains("Try Again")"#,
    r#"button:contains("Incorrect")"#,
    "#container000 div.modal-footer > button",
    r#".modal button:contains("try")"#,
    ".incorrect-answer button",
    r#"[data-action="retry"]"#,
    ".feedback-incorrect",
];

const SUCCESS_SPECS: &[&str] = &[
    r#"button:contains("Correct")"#,
    r#"button:contains("Close")"#,
    r#"button:contains("Continue")"#,
    r#"button:contains("Next")"#,
    "#dialog1 button",
    r#".modal button:contains("close")"#,
    ".correct-answer button",
    ".success-dialog button",
    r#"[data-action="close"]"#,
    r#"[data-action="continue"]"#,
    ".feedback-correct",
];

const CONTINUE_SPECS: &[&str] = &[
    r#"button:contains("Continue")"#,
    r#"button:contains("Next")"#,
    ".continue-button",
    ".next-button",
];

/// Outcome of one candidate-answer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A try-again affordance resolved. `video_regressed` records the
    /// independent wrong-answer confirmation from a penalty replay.
    Retry { video_regressed: bool },
    /// No dialog, but the video regressed — inferred wrong.
    VideoRegressed,
    /// A success dialog or affordance resolved.
    Success,
    /// No feedback at all: success by absence of a negative signal.
    Inconclusive,
}

impl AttemptOutcome {
    /// True when the candidate loop stops here.
    pub fn is_success(self) -> bool {
        matches!(self, AttemptOutcome::Success | AttemptOutcome::Inconclusive)
    }
}

/// Pure, total classification of one attempt's observed signals.
/// Priority: explicit negative, then explicit positive, then inferred
/// negative, then assumed positive.
pub fn classify(retry_present: bool, success_present: bool, regressed: bool) -> AttemptOutcome {
    if retry_present {
        AttemptOutcome::Retry {
            video_regressed: regressed,
        }
    } else if success_present {
        AttemptOutcome::Success
    } else if regressed {
        AttemptOutcome::VideoRegressed
    } else {
        AttemptOutcome::Inconclusive
    }
}

/// Playback identity of the quiz's associated video before an attempt.
#[derive(Debug, Clone)]
struct VideoBaseline {
    id: NodeId,
    position: f64,
    source: String,
}

pub async fn process(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let options = find_options(page, scope).await;
    if options.is_empty() {
        return Ok(false);
    }

    if resolve(page, scope, SUBMIT_SPECS).await.is_none() {
        warn!("quiz options present but no submit control, skipping");
        return Ok(false);
    }

    info!(candidates = options.len(), "starting quiz brute force");
    let exec = ActionExecutor::new(cfg);
    let mut baseline = capture_baseline(page, scope).await;

    for (i, option) in options.iter().enumerate() {
        debug!(
            candidate = i + 1,
            total = options.len(),
            text = %option.snapshot.text,
            "trying answer candidate"
        );

        if !exec.click(page, option.id, "quiz answer candidate").await {
            continue;
        }
        sleep(cfg.short_delay).await;

        let Some(submit) = resolve(page, scope, SUBMIT_SPECS).await else {
            continue;
        };
        if !exec.click(page, submit.id, "quiz submit").await {
            continue;
        }
        sleep(cfg.quiz_feedback_delay).await;

        let regressed = update_baseline(page, &mut baseline).await;
        let retry = resolve(page, scope, RETRY_SPECS).await;
        let success = find_success_affordance(page, scope).await;

        match classify(retry.is_some(), success.is_some(), regressed) {
            AttemptOutcome::Retry { video_regressed } => {
                debug!(candidate = i + 1, video_regressed, "answer was wrong");
                if let Some(retry) = retry {
                    exec.click(page, retry.id, "try-again dismiss").await;
                    sleep(cfg.dialog_delay).await;
                }
                if video_regressed {
                    wait_out_replay(page, cfg, baseline.as_ref()).await;
                }
            }
            AttemptOutcome::VideoRegressed => {
                debug!(candidate = i + 1, "video regressed without dialog, answer wrong");
            }
            AttemptOutcome::Success => {
                info!(candidate = i + 1, "answer accepted");
                if let Some(success) = success {
                    dismiss_success(page, scope, cfg, &exec, success).await;
                }
                mark_answered(page, &options).await;
                return Ok(true);
            }
            AttemptOutcome::Inconclusive => {
                info!(candidate = i + 1, "no negative signal, assuming correct");
                mark_answered(page, &options).await;
                return Ok(true);
            }
        }
    }

    warn!("exhausted all quiz candidates without a success signal");
    Ok(false)
}

/// Answer candidates: first selector pattern that yields anything, minus
/// options of an already-answered quiz.
async fn find_options(page: &dyn Page, scope: Scope) -> Vec<Resolved> {
    for spec in MCQ_SPECS {
        let mut found = candidates(page, scope, spec).await;
        found.retain(|o| o.snapshot.attr(ANSWERED_MARK).is_none());
        if !found.is_empty() {
            debug!(spec, count = found.len(), "found answer candidates");
            return found;
        }
    }
    Vec::new()
}

async fn capture_baseline(page: &dyn Page, scope: Scope) -> Option<VideoBaseline> {
    let video = candidates(page, scope, super::media::VIDEO_SELECTOR)
        .await
        .into_iter()
        .next()?;
    let state = page.media_state(video.id).await.ok()?;
    Some(VideoBaseline {
        id: video.id,
        position: state.position,
        source: state.source,
    })
}

/// Compare the video against the baseline; a material position drop or a
/// source change means the platform restarted playback as a penalty. The
/// baseline is advanced so the next attempt compares against the new
/// state.
async fn update_baseline(page: &dyn Page, baseline: &mut Option<VideoBaseline>) -> bool {
    let Some(b) = baseline.as_mut() else {
        return false;
    };
    let Ok(state) = page.media_state(b.id).await else {
        return false;
    };

    let regressed = state.position < b.position - REGRESSION_THRESHOLD_SECS
        || state.source != b.source;
    if regressed {
        debug!(
            from = b.position,
            to = state.position,
            "video regressed, answer inferred wrong"
        );
    }
    b.position = state.position;
    b.source = state.source;
    regressed
}

/// The replay must finish before the next candidate, or the next
/// regression check would misfire. Bounded by a hard ceiling.
async fn wait_out_replay(page: &mut dyn Page, cfg: &EngineConfig, baseline: Option<&VideoBaseline>) {
    let Some(b) = baseline else {
        return;
    };
    debug!("waiting for penalty replay to finish");
    match page.media_state(b.id).await {
        Ok(state) if state.near_end() => {}
        _ => {
            if let Err(e) = page.wait_media_ended(b.id, cfg.replay_wait_ceiling).await {
                debug!(error = %e, "replay wait failed, continuing");
            }
        }
    }
    sleep(cfg.dialog_delay).await;
}

/// A distinct "correct answer" modal takes precedence over the generic
/// success affordances.
async fn find_success_affordance(page: &dyn Page, scope: Scope) -> Option<Resolved> {
    if let Some(title) = resolve(page, scope, &["h2#dialog1_label.modal-title"]).await {
        if title.snapshot.text_contains("correct answer") {
            return Some(title);
        }
    }
    resolve(page, scope, SUCCESS_SPECS).await
}

/// Close whatever success affordance resolved: for the modal, the ×
/// dismiss control then a continue control; for a plain affordance, the
/// affordance itself.
async fn dismiss_success(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
    exec: &ActionExecutor<'_>,
    success: Resolved,
) {
    let is_modal_title = success
        .snapshot
        .dom_id
        .as_deref()
        .is_some_and(|id| id == "dialog1_label");

    if is_modal_title {
        if let Some(close) = resolve(page, scope, &[r#"span[aria-hidden="true"]"#]).await {
            if close.snapshot.text.contains('×') {
                debug!("closing correct-answer modal");
                if exec.click(page, close.id, "modal dismiss").await {
                    sleep(cfg.dialog_delay).await;
                }
            }
        }
        if let Some(cont) = resolve(page, scope, CONTINUE_SPECS).await {
            exec.click(page, cont.id, "modal continue").await;
            sleep(cfg.dialog_delay).await;
        }
    } else {
        exec.click(page, success.id, "success affordance").await;
        sleep(cfg.dialog_delay).await;
    }
}

async fn mark_answered(page: &mut dyn Page, options: &[Resolved]) {
    for option in options {
        mark(page, option.id, ANSWERED_MARK).await;
    }
}
