//! The end-of-course survey and completion flow: a short fixed sequence
//! of steps. Rating rows get the neutral middle column, binary rows get
//! the negative option, and every advance/submit/continue/exit control is
//! attempted once. Absence of any step's target is not an error.

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::page::Page;
use crate::resolver::{Resolved, candidates, resolve};
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::Scope;

const NAV_NEXT_SPECS: &[&str] = &[
    "#sv-nav-next input",
    "#sv-nav-next button",
    r#"input[value="Next"]"#,
    r#"button:contains("Next")"#,
    ".sv-nav-next",
];

/// Neutral (middle) column of a rating row, most specific first.
const NEUTRAL_SPECS: &[&str] = &[
    r#"td:nth-of-type(4) input[type="radio"]"#,
    "td:nth-of-type(4) label",
    "td:nth-of-type(4) span",
    "td:nth-of-type(4) svg",
    "td:nth-of-type(4)",
];

const COMPLETE_SPECS: &[&str] = &[
    "#sv-nav-complete input",
    "#sv-nav-complete button",
    r#"input[value="Complete"]"#,
    r#"button:contains("Complete")"#,
    ".sv-nav-complete",
    r#"[aria-label="Complete"]"#,
];

const CONTINUE_SPECS: &[&str] = &[
    r#"div.u-text-center span:contains("Continue")"#,
    r#"button:contains("Continue")"#,
    ".u-text-center button",
    r#"[data-action="continue"]"#,
    ".continue-button",
    ".modal-continue",
    ".dialog-continue",
];

const EXIT_SPECS: &[&str] = &[
    "div.congrats span:nth-of-type(3)",
    ".congrats button",
    ".return-to-course",
    ".back-to-menu",
    ".exit-course",
    r#"button:contains("Return")"#,
    r#"button:contains("Exit")"#,
    r#"button:contains("Back to")"#,
    r#"a[href*="course_work"]"#,
    ".course-complete-exit",
    ".module-complete-return",
];

const NAV_BACK_SPECS: &[&str] = &[
    r#"a[href*="/launch/course_work/"]"#,
    r#"a[href*="/course/"]"#,
    ".breadcrumb a",
    ".nav-back",
    ".course-nav-back",
];

/// Numbered survey sub-sections: `#sq_101` through `#sq_110`.
const SECTION_ID_RANGE: std::ops::RangeInclusive<u32> = 101..=110;

pub async fn process(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
) -> Result<bool, DomError> {
    let exec = ActionExecutor::new(cfg);
    let mut progressed = false;

    // Enter the survey form.
    if click_one(page, scope, cfg, &exec, NAV_NEXT_SPECS, "survey enter").await {
        sleep(cfg.dialog_delay).await;
        progressed = true;
    }

    progressed |= rate_tables(page, scope, cfg, &exec).await;
    progressed |= rate_numbered_sections(page, scope, cfg, &exec).await;
    progressed |= answer_binary_rows(page, scope, cfg, &exec).await;

    // Advance between sections, then complete, then the success dialog.
    if click_one(page, scope, cfg, &exec, NAV_NEXT_SPECS, "survey advance").await {
        sleep(cfg.dialog_delay).await;
        progressed = true;
    }
    if click_one(page, scope, cfg, &exec, COMPLETE_SPECS, "survey complete").await {
        sleep(cfg.dialog_delay).await;
        progressed = true;
    }
    if click_one(page, scope, cfg, &exec, CONTINUE_SPECS, "survey continue").await {
        sleep(cfg.dialog_delay).await;
        progressed = true;
    }

    // The congratulations screen takes a moment to appear.
    sleep(cfg.video_rescan_delay).await;
    if click_one(page, scope, cfg, &exec, EXIT_SPECS, "return to course menu").await {
        sleep(cfg.content_settle).await;
        progressed = true;
        info!("returned to course menu");
    }

    if !progressed
        && click_one(page, scope, cfg, &exec, NAV_BACK_SPECS, "course navigation back").await
    {
        sleep(cfg.content_settle).await;
        progressed = true;
    }

    Ok(progressed)
}

/// Every rating table on the page: select the neutral column per row.
async fn rate_tables(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
    exec: &ActionExecutor<'_>,
) -> bool {
    let tables = candidates(page, scope, "table tbody").await;
    if tables.is_empty() {
        return false;
    }
    debug!(count = tables.len(), "rating tables present");

    let mut progressed = false;
    for table in tables {
        let rows = candidates(page, Scope::Node(table.id), "tr").await;
        for (i, row) in rows.iter().enumerate() {
            if neutral_already_checked(page, row).await {
                continue;
            }
            if let Some(neutral) = resolve(page, Scope::Node(row.id), NEUTRAL_SPECS).await {
                let label = format!("survey row {} neutral option", i + 1);
                if exec.click(page, neutral.id, &label).await {
                    sleep(cfg.click_settle).await;
                    progressed = true;
                }
            }
        }
    }
    progressed
}

/// Survey sub-sections addressed by numeric ID, each with its own rating
/// table. Rows whose neutral radio is already checked are skipped.
async fn rate_numbered_sections(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
    exec: &ActionExecutor<'_>,
) -> bool {
    let mut progressed = false;
    for sq in SECTION_ID_RANGE {
        let selector = format!("#sq_{sq}");
        let Some(section) = candidates(page, scope, &selector).await.into_iter().next() else {
            continue;
        };
        let rows = candidates(page, Scope::Node(section.id), "table tbody tr").await;
        debug!(section = sq, rows = rows.len(), "processing survey section");

        for (i, row) in rows.iter().enumerate() {
            if neutral_already_checked(page, row).await {
                continue;
            }
            if let Some(neutral) = resolve(page, Scope::Node(row.id), NEUTRAL_SPECS).await {
                let label = format!("section {sq} row {} neutral", i + 1);
                if exec.click(page, neutral.id, &label).await {
                    sleep(cfg.click_settle).await;
                    progressed = true;
                }
            }
        }
    }
    progressed
}

async fn neutral_already_checked(page: &dyn Page, row: &Resolved) -> bool {
    candidates(
        page,
        Scope::Node(row.id),
        r#"td:nth-of-type(4) input[type="radio"]"#,
    )
    .await
    .first()
    .is_some_and(|radio| radio.snapshot.attr("checked").is_some())
}

/// Binary yes/no hover-radio rows: prefer the negative option, falling
/// back to every second radio in a group.
async fn answer_binary_rows(
    page: &mut dyn Page,
    scope: Scope,
    cfg: &EngineConfig,
    exec: &ActionExecutor<'_>,
) -> bool {
    let radios = candidates(page, scope, "div.sv-radio--allowhover").await;
    if radios.is_empty() {
        return false;
    }
    debug!(count = radios.len(), "binary survey rows present");

    let mut progressed = false;
    for (i, radio) in radios.iter().enumerate() {
        let text = radio.snapshot.text.trim().to_lowercase();
        let negative_text =
            text.contains("no") || text.contains("never") || text.contains("none");
        let negative_value = has_input(page, radio, r#"input[value*="no"]"#).await
            || has_input(page, radio, r#"input[value="0"]"#).await
            || has_input(page, radio, r#"input[value="false"]"#).await;

        let input = candidates(page, Scope::Node(radio.id), r#"input[type="radio"]"#)
            .await
            .into_iter()
            .next();
        let unchecked = input.is_some_and(|r| r.snapshot.attr("checked").is_none());

        if unchecked && (negative_text || negative_value || i % 2 == 1) {
            let label = format!("survey radio {}: {:?}", i + 1, text);
            if exec.click(page, radio.id, &label).await {
                sleep(cfg.short_delay).await;
                progressed = true;
            }
        }
    }
    progressed
}

async fn has_input(page: &dyn Page, root: &Resolved, selector: &str) -> bool {
    !candidates(page, Scope::Node(root.id), selector).await.is_empty()
}

async fn click_one(
    page: &mut dyn Page,
    scope: Scope,
    _cfg: &EngineConfig,
    exec: &ActionExecutor<'_>,
    specs: &[&str],
    what: &str,
) -> bool {
    match resolve(page, scope, specs).await {
        Some(target) => exec.click(page, target.id, what).await,
        None => false,
    }
}
