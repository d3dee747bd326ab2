//! Survey/completion flow: neutral column selection, negative binary
//! answers, and the fixed advance/complete/continue/exit sequence.

use coursepilot_engine::config::EngineConfig;
use coursepilot_engine::handlers::survey;
use coursepilot_engine::protocol::Scope;
use coursepilot_engine::sim::{ClickEffect, NodeSpec, PageSpec, SimPage};

fn page(nodes: Vec<NodeSpec>) -> SimPage {
    SimPage::new(PageSpec {
        url: "https://lms.example/training/player/1/9".into(),
        nodes,
        frames: vec![],
        native_player: false,
    })
}

fn node(tag: &str, id: &str) -> NodeSpec {
    NodeSpec {
        tag: tag.into(),
        id: Some(id.into()),
        ..Default::default()
    }
}

/// A rating row with five columns; the neutral radio lives in the 4th.
fn rating_row(row_id: &str) -> NodeSpec {
    let mut row = node("tr", row_id);
    row.children = (1..=5)
        .map(|col| {
            let mut td = NodeSpec {
                tag: "td".into(),
                ..Default::default()
            };
            if col == 4 {
                let mut radio = node("input", &format!("{row_id}-neutral"));
                radio.attrs.insert("type".into(), "radio".into());
                radio.on_click = vec![ClickEffect::SetAttr {
                    target: "self".into(),
                    name: "checked".into(),
                    value: "checked".into(),
                }];
                td.children = vec![radio];
            }
            td
        })
        .collect();
    row
}

fn rating_table(table_id: &str, rows: Vec<NodeSpec>) -> NodeSpec {
    let mut tbody = NodeSpec {
        tag: "tbody".into(),
        ..Default::default()
    };
    tbody.children = rows;
    let mut table = node("table", table_id);
    table.children = vec![tbody];
    table
}

#[tokio::test]
async fn rating_rows_get_the_neutral_column() {
    let table = rating_table("t1", vec![rating_row("r1"), rating_row("r2")]);
    let mut page = page(vec![table]);
    let cfg = EngineConfig::instant();

    let progressed = survey::process(&mut page, Scope::Document, &cfg)
        .await
        .unwrap();
    assert!(progressed);
    for row in ["r1", "r2"] {
        let radio = page.find(&format!("{row}-neutral")).unwrap();
        assert_eq!(page.click_count(radio), 1);
    }
}

#[tokio::test]
async fn numbered_sections_skip_already_checked_rows() {
    let mut checked_row = rating_row("done");
    // Pre-check the neutral radio of the first row.
    fn find_radio(spec: &mut NodeSpec) -> Option<&mut NodeSpec> {
        if spec.tag == "input" {
            return Some(spec);
        }
        spec.children.iter_mut().find_map(find_radio)
    }
    find_radio(&mut checked_row)
        .unwrap()
        .attrs
        .insert("checked".into(), "checked".into());

    let mut section = node("div", "sq_101");
    section.children = vec![rating_table("t1", vec![checked_row, rating_row("todo")])];
    let mut page = page(vec![section]);
    let cfg = EngineConfig::instant();

    survey::process(&mut page, Scope::Document, &cfg)
        .await
        .unwrap();

    assert_eq!(page.click_count(page.find("done-neutral").unwrap()), 0);
    assert_eq!(page.click_count(page.find("todo-neutral").unwrap()), 1);
}

#[tokio::test]
async fn binary_rows_prefer_the_negative_option() {
    let mut yes = node("div", "row-yes");
    yes.classes = vec!["sv-radio--allowhover".into()];
    yes.text = "Yes".into();
    let mut yes_input = node("input", "yes-input");
    yes_input.attrs.insert("type".into(), "radio".into());
    yes.children = vec![yes_input];

    let mut no = node("div", "row-no");
    no.classes = vec!["sv-radio--allowhover".into()];
    no.text = "No".into();
    let mut no_input = node("input", "no-input");
    no_input.attrs.insert("type".into(), "radio".into());
    no.children = vec![no_input];

    let mut page = page(vec![yes, no]);
    let cfg = EngineConfig::instant();

    survey::process(&mut page, Scope::Document, &cfg)
        .await
        .unwrap();

    let no_id = page.find("row-no").unwrap();
    let yes_id = page.find("row-yes").unwrap();
    assert!(page.click_count(no_id) >= 1);
    assert_eq!(page.click_count(yes_id), 0);
}

#[tokio::test]
async fn completion_sequence_is_attempted_in_order() {
    let mut next_wrap = node("div", "sv-nav-next");
    let next = node("input", "next-input");
    next_wrap.children = vec![next];

    let mut complete_wrap = node("div", "sv-nav-complete");
    let complete = node("input", "complete-input");
    complete_wrap.children = vec![complete];

    let mut continue_btn = node("button", "continue-btn");
    continue_btn.text = "Continue".into();

    let mut exit = node("div", "congrats-box");
    exit.classes = vec!["congrats".into()];
    let exit_btn = node("button", "exit-btn");
    exit.children = vec![exit_btn];

    let mut page = page(vec![next_wrap, complete_wrap, continue_btn, exit]);
    let cfg = EngineConfig::instant();

    let progressed = survey::process(&mut page, Scope::Document, &cfg)
        .await
        .unwrap();
    assert!(progressed);

    let clicks = page.clicks();
    let pos = |id: &str| {
        let node = page.find(id).unwrap();
        clicks.iter().position(|&c| c == node)
    };
    // Enter/advance, then complete, then continue, then exit — in order.
    let next_pos = pos("next-input").expect("next clicked");
    let complete_pos = pos("complete-input").expect("complete clicked");
    let continue_pos = pos("continue-btn").expect("continue clicked");
    let exit_pos = pos("exit-btn").expect("exit clicked");
    assert!(next_pos < complete_pos);
    assert!(complete_pos < continue_pos);
    assert!(continue_pos < exit_pos);
}

#[tokio::test]
async fn nothing_survey_like_reports_no_progress() {
    let mut page = page(vec![node("div", "plain")]);
    let cfg = EngineConfig::instant();
    assert!(
        !survey::process(&mut page, Scope::Document, &cfg)
            .await
            .unwrap()
    );
}
