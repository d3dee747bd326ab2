//! Resolution contract: spec-order fallthrough, error containment, text
//! matching and visibility filtering.

use coursepilot_engine::protocol::Scope;
use coursepilot_engine::resolver::{resolve, resolve_all, wait_for};
use coursepilot_engine::sim::{NodeSpec, PageSpec, SimPage};
use std::time::Duration;

fn page(nodes: Vec<NodeSpec>) -> SimPage {
    SimPage::new(PageSpec {
        url: "https://lms.example/training/player/1/1".into(),
        nodes,
        frames: vec![],
        native_player: false,
    })
}

fn button(id: &str, text: &str) -> NodeSpec {
    NodeSpec {
        tag: "button".into(),
        id: Some(id.into()),
        text: text.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn first_spec_wins_in_order() {
    let page = page(vec![button("second", "b"), button("first", "a")]);
    let found = resolve(&page, Scope::Document, &["#first", "#second"])
        .await
        .unwrap();
    assert_eq!(found.snapshot.dom_id.as_deref(), Some("first"));
}

#[tokio::test]
async fn invalid_spec_never_blocks_later_specs() {
    let page = page(vec![button("target", "hello")]);
    // Position k is malformed; position k+1 must still resolve.
    let found = resolve(
        &page,
        Scope::Document,
        &["div::broken::selector", ":contains()", "#target"],
    )
    .await
    .unwrap();
    assert_eq!(found.snapshot.dom_id.as_deref(), Some("target"));
}

#[tokio::test]
async fn all_specs_exhausted_returns_none() {
    let page = page(vec![button("present", "x")]);
    assert!(
        resolve(&page, Scope::Document, &["#absent", ".missing"])
            .await
            .is_none()
    );
}

#[tokio::test]
async fn text_match_is_case_insensitive_containment() {
    let page = page(vec![
        button("wrong", "Go Back"),
        button("right", "SUBMIT ANSWER"),
    ]);
    let found = resolve(&page, Scope::Document, &[r#"button:contains("submit")"#])
        .await
        .unwrap();
    assert_eq!(found.snapshot.dom_id.as_deref(), Some("right"));
}

#[tokio::test]
async fn hidden_elements_are_not_resolved() {
    let mut hidden = button("hidden", "Continue");
    hidden.visible = false;
    let visible = button("shown", "Continue");
    let page = page(vec![hidden, visible]);

    let found = resolve(&page, Scope::Document, &[r#"button:contains("Continue")"#])
        .await
        .unwrap();
    assert_eq!(found.snapshot.dom_id.as_deref(), Some("shown"));
}

#[tokio::test]
async fn resolution_is_deterministic_on_unchanged_dom() {
    let page = page(vec![
        button("a", "Next"),
        button("b", "Next"),
        button("c", "Next"),
    ]);
    let specs = [r#"button:contains("Next")"#];
    let first = resolve(&page, Scope::Document, &specs).await.unwrap();
    for _ in 0..5 {
        let again = resolve(&page, Scope::Document, &specs).await.unwrap();
        assert_eq!(again.id, first.id);
    }
}

#[tokio::test]
async fn resolve_all_returns_matches_of_first_yielding_spec() {
    let page = page(vec![
        button("x1", "tab"),
        button("x2", "tab"),
        button("y1", "other"),
    ]);
    let all = resolve_all(
        &page,
        Scope::Document,
        &[".absent", r#"button:contains("tab")"#, "#y1"],
    )
    .await;
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn wait_for_gives_up_after_timeout() {
    let page = page(vec![]);
    let found = wait_for(
        &page,
        Scope::Document,
        &["#never"],
        Duration::from_millis(50),
        Duration::from_millis(10),
    )
    .await;
    assert!(found.is_none());
}
