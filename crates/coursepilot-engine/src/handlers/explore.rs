//! The "explore another option" prompt: a yes/no question the platform
//! repeats until "No" is chosen. Always answers "No", guarding against
//! substring false matches ("Noah", "now").

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::page::Page;
use crate::resolver::{Resolved, candidates, resolve};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::Scope;

const QUESTION_SPECS: &[&str] = &[
    r#"div:contains("Would you like to explore another option?")"#,
    r#".u-color-gray-darkest:contains("explore another option")"#,
    r#".ng-binding:contains("Would you like to explore")"#,
    r#"div:contains("Select your answer, then select Submit")"#,
];

const NO_OPTION_SPECS: &[&str] = &[
    r#"label.question_btn[aria-label*="No"]"#,
    r#"label.question_btn:contains("No")"#,
    r#"[id^="answer_content_"] td:contains("No")"#,
    r#"label[aria-label*="No"]"#,
    r#"td:contains("No")"#,
    r#"label:contains("No")"#,
    r#"input[type="radio"][value*="no"]"#,
    r#".answercontrol:contains("No")"#,
];

const SUBMIT_SPECS: &[&str] = &[
    "div.feedback-section span",
    r#"span:contains("Submit Answer")"#,
    r#"button:contains("Submit")"#,
    ".submit-btn",
    r#"[data-action="submit"]"#,
];

pub async fn process(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let Some(question) = resolve(page, scope, QUESTION_SPECS).await else {
        return Ok(false);
    };
    let text = question.snapshot.text.to_lowercase();
    if !(text.contains("explore another option")
        || text.contains("select your answer, then select submit"))
    {
        return Ok(false);
    }
    info!("explore-option prompt present, answering no");

    let mut no_option: Option<Resolved> = None;
    'specs: for spec in NO_OPTION_SPECS {
        for candidate in candidates(page, scope, spec).await {
            if is_really_no(&candidate) {
                debug!(spec, "matched no option");
                no_option = Some(candidate);
                break 'specs;
            }
        }
    }

    let Some(no_option) = no_option else {
        warn!("explore prompt present but no safe \"No\" option found");
        return Ok(false);
    };

    let exec = ActionExecutor::new(cfg);
    if !exec.click(page, no_option.id, "explore prompt \"No\"").await {
        return Ok(false);
    }
    sleep(cfg.short_delay).await;

    if let Some(submit) = resolve(page, scope, SUBMIT_SPECS).await {
        if exec.click(page, submit.id, "explore prompt submit").await {
            sleep(cfg.dialog_delay).await;
        }
    }
    Ok(true)
}

/// The answer must actually be "No" — not "Noah", not "now".
fn is_really_no(option: &Resolved) -> bool {
    let text = option.snapshot.text.trim().to_lowercase();
    let aria = option
        .snapshot
        .attr("aria-label")
        .unwrap_or_default()
        .to_lowercase();

    let affirms_no = text == "no" || aria.contains("no");
    let false_match =
        text.contains("noah") || text.contains("now") || aria.contains("noah");
    affirms_no && !false_match
}
