//! End-to-end session passes over simulated pages sharing one store:
//! queue build on the listing, reconcile/drive/advance on the player,
//! and queue teardown at the end of the course.

use coursepilot_engine::config::EngineConfig;
use coursepilot_engine::control;
use coursepilot_engine::queue;
use coursepilot_engine::session::{self, PageKind};
use coursepilot_engine::sim::{ClickEffect, MediaSpec, NodeSpec, PageSpec, SimPage};
use coursepilot_engine::store::MemoryStore;

fn toc_item(n: u32) -> NodeSpec {
    let lead = NodeSpec {
        tag: "span".into(),
        classes: vec!["lead".into()],
        text: format!("Lesson {n}"),
        ..Default::default()
    };
    let mut item = NodeSpec {
        tag: "a".into(),
        id: Some(format!("toc{n}")),
        classes: vec!["TOC_item".into()],
        ..Default::default()
    };
    item.attrs.insert("href".into(), task_url(n));
    item.children = vec![lead];
    item
}

fn task_url(n: u32) -> String {
    format!("https://lms.example/training/player/10/{}", 100 + n)
}

fn listing_page() -> SimPage {
    SimPage::new(PageSpec {
        url: "https://lms.example/launch/course_work/10".into(),
        nodes: vec![toc_item(1), toc_item(2), toc_item(3)],
        frames: vec![],
        native_player: false,
    })
}

fn player_page(url: &str) -> SimPage {
    let video = NodeSpec {
        tag: "video".into(),
        id: Some("lesson-video".into()),
        media: Some(MediaSpec {
            position: 0.0,
            duration: 60.0,
            source: "lesson.mp4".into(),
            ended: false,
            paused: true,
        }),
        ..Default::default()
    };
    SimPage::new(PageSpec {
        url: url.into(),
        nodes: vec![video],
        frames: vec![],
        native_player: false,
    })
}

#[tokio::test]
async fn listing_builds_queue_and_navigates_to_last_task() {
    let mut store = MemoryStore::new();
    let mut page = listing_page();
    let cfg = EngineConfig::instant();

    let report = session::run(&mut page, &mut store, &cfg).await;
    assert!(report.enabled);
    assert_eq!(report.kind, Some(PageKind::Listing));
    assert_eq!(report.queued, 3);
    assert_eq!(report.navigated.as_deref(), Some(task_url(3).as_str()));

    let record = queue::load(&store).await;
    assert_eq!(record.len(), 3);
    assert_eq!(record.cursor, 2);
}

#[tokio::test]
async fn player_drives_content_and_finishes_the_queue() {
    let mut store = MemoryStore::new();

    // Build the queue from the listing first.
    let mut listing = listing_page();
    let cfg = EngineConfig::instant();
    session::run(&mut listing, &mut store, &cfg).await;

    // Arrive on the last task (cursor already points at it).
    let mut player = player_page(&task_url(3));
    let report = session::run(&mut player, &mut store, &cfg).await;

    assert_eq!(report.kind, Some(PageKind::Player));
    assert!(report.progressed);
    // Last task done: queue cleared, no further navigation.
    assert!(report.queue_finished);
    assert!(report.navigated.is_none());
    assert!(queue::load(&store).await.is_empty());

    // The video on the page was actually driven.
    let video = player.find("lesson-video").unwrap();
    assert_eq!(player.attr_of(video, "data-played").as_deref(), Some("true"));
}

#[tokio::test]
async fn player_reconciles_cursor_from_the_url() {
    let mut store = MemoryStore::new();
    let mut listing = listing_page();
    let cfg = EngineConfig::instant();
    session::run(&mut listing, &mut store, &cfg).await;
    // Stored cursor points at task 3, but the platform's own navigation
    // landed us on task 1.
    let mut player = player_page(&task_url(1));
    let report = session::run(&mut player, &mut store, &cfg).await;

    // Reconciled to task 1, then advanced to task 2.
    assert_eq!(report.navigated.as_deref(), Some(task_url(2).as_str()));
    let record = queue::load(&store).await;
    assert_eq!(record.cursor, 1);
}

#[tokio::test]
async fn disabled_flag_blocks_all_automation() {
    let mut store = MemoryStore::new();
    control::set_enabled(&mut store, false).await.unwrap();

    let mut page = listing_page();
    let cfg = EngineConfig::instant();
    let report = session::run(&mut page, &mut store, &cfg).await;

    assert!(!report.enabled);
    assert_eq!(report.kind, None);
    assert!(page.clicks().is_empty());
    assert!(page.navigations().is_empty());
    assert!(queue::load(&store).await.is_empty());
}

#[tokio::test]
async fn non_course_pages_are_left_alone() {
    let mut store = MemoryStore::new();
    let mut page = SimPage::new(PageSpec {
        url: "https://lms.example/profile/settings".into(),
        nodes: vec![],
        frames: vec![],
        native_player: false,
    });
    let cfg = EngineConfig::instant();

    let report = session::run(&mut page, &mut store, &cfg).await;
    assert_eq!(report.kind, Some(PageKind::Other));
    assert!(!report.progressed);
    assert!(page.navigations().is_empty());
}

#[tokio::test]
async fn player_without_queue_stays_put() {
    let mut store = MemoryStore::new();
    let mut player = player_page("https://lms.example/training/player/10/101");
    let cfg = EngineConfig::instant();

    let report = session::run(&mut player, &mut store, &cfg).await;
    assert!(report.progressed);
    assert!(report.navigated.is_none());
    assert!(!report.queue_finished);
}

#[tokio::test]
async fn survey_completion_marks_progress_on_the_final_task() {
    // A player page holding a survey completion flow instead of a video.
    let mut complete_wrap = NodeSpec {
        id: Some("sv-nav-complete".into()),
        ..Default::default()
    };
    let mut complete = NodeSpec {
        tag: "input".into(),
        id: Some("complete-input".into()),
        ..Default::default()
    };
    complete.on_click = vec![ClickEffect::Hide {
        target: "#sv-nav-complete".into(),
    }];
    complete_wrap.children = vec![complete];

    let mut page = SimPage::new(PageSpec {
        url: "https://lms.example/training/player/10/103".into(),
        nodes: vec![complete_wrap],
        frames: vec![],
        native_player: false,
    });
    let mut store = MemoryStore::new();
    let cfg = EngineConfig::instant();

    let report = session::run(&mut page, &mut store, &cfg).await;
    assert!(report.progressed);
    assert_eq!(page.click_count(page.find("complete-input").unwrap()), 1);
}
