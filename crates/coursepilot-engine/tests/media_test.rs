//! Video handler behavior: candidate filtering, play-control screening,
//! completion marking and the scripted-player path.

use coursepilot_engine::config::EngineConfig;
use coursepilot_engine::handlers::media;
use coursepilot_engine::protocol::{Rect, Scope};
use coursepilot_engine::sim::{MediaSpec, NodeSpec, PageSpec, SimPage};

fn page(nodes: Vec<NodeSpec>) -> SimPage {
    SimPage::new(PageSpec {
        url: "https://lms.example/training/player/1/1".into(),
        nodes,
        frames: vec![],
        native_player: false,
    })
}

fn video(id: &str, duration: f64) -> NodeSpec {
    NodeSpec {
        tag: "video".into(),
        id: Some(id.into()),
        media: Some(MediaSpec {
            position: 0.0,
            duration,
            source: format!("{id}.mp4"),
            ended: false,
            paused: true,
        }),
        rect: Some(Rect {
            x: 0.0,
            y: 0.0,
            width: 640.0,
            height: 360.0,
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn videos_play_to_end_and_are_marked() {
    let mut page = page(vec![video("v1", 120.0), video("v2", 30.0)]);
    let cfg = EngineConfig::instant();

    let progressed = media::process_videos(&mut page, Scope::Document, &cfg)
        .await
        .unwrap();
    assert!(progressed);

    for id in ["v1", "v2"] {
        let node = page.find(id).unwrap();
        assert_eq!(page.attr_of(node, "data-played").as_deref(), Some("true"));
        let state = page.media_of(node).unwrap();
        assert!(state.ended);
        assert!(state.muted);
    }
}

#[tokio::test]
async fn marked_videos_are_excluded_from_the_candidate_set() {
    let mut done = video("v1", 60.0);
    done.attrs.insert("data-played".into(), "true".into());
    let mut page = page(vec![done]);
    let cfg = EngineConfig::instant();

    let candidates = media::unplayed_videos(&page, Scope::Document).await;
    assert!(candidates.is_empty());

    let progressed = media::process_videos(&mut page, Scope::Document, &cfg)
        .await
        .unwrap();
    assert!(!progressed);
}

#[tokio::test]
async fn ended_videos_are_excluded() {
    let mut finished = video("v1", 60.0);
    if let Some(m) = finished.media.as_mut() {
        m.ended = true;
        m.position = 60.0;
    }
    let page = page(vec![finished]);
    assert!(media::unplayed_videos(&page, Scope::Document).await.is_empty());
}

#[tokio::test]
async fn play_control_deny_list_screens_navigation_buttons() {
    // A "back" button styled like a play control must not be clicked; the
    // real play control sits next to it.
    let mut container = NodeSpec {
        id: Some("player".into()),
        ..Default::default()
    };
    let mut back = NodeSpec {
        tag: "button".into(),
        id: Some("back-btn".into()),
        classes: vec!["play-button".into()],
        text: "Go back".into(),
        ..Default::default()
    };
    back.classes.push("video-play".into());
    // The real control is also reachable through a later, more specific
    // pattern, the way player skins expose several hooks.
    let play = NodeSpec {
        tag: "button".into(),
        id: Some("play-btn".into()),
        classes: vec!["video-play".into(), "player-play-button".into()],
        text: "Play".into(),
        ..Default::default()
    };
    container.children = vec![back, play, video("v1", 45.0)];
    let mut page = page(vec![container]);
    let cfg = EngineConfig::instant();

    media::process_videos(&mut page, Scope::Document, &cfg)
        .await
        .unwrap();

    assert_eq!(page.click_count(page.find("back-btn").unwrap()), 0);
    assert_eq!(page.click_count(page.find("play-btn").unwrap()), 1);
}

#[tokio::test]
async fn toggle_control_in_pause_state_is_skipped() {
    // slip-pause means the video is already playing; the toggle must not
    // be clicked or it would pause playback.
    let mut controls = NodeSpec {
        id: Some("player-controls".into()),
        ..Default::default()
    };
    let mut wrap = NodeSpec {
        classes: vec!["slip_left_controls".into()],
        ..Default::default()
    };
    let mut button = NodeSpec {
        tag: "button".into(),
        id: Some("toggle".into()),
        ..Default::default()
    };
    let glyph = NodeSpec {
        tag: "span".into(),
        id: Some("glyph".into()),
        classes: vec!["slip".into(), "slip-pause".into()],
        ..Default::default()
    };
    button.children = vec![glyph];
    wrap.children = vec![button];
    controls.children = vec![wrap];

    let mut playing = video("v1", 90.0);
    if let Some(m) = playing.media.as_mut() {
        m.paused = false;
        m.position = 10.0;
    }
    controls.children.push(playing);
    let mut page = page(vec![controls]);
    let cfg = EngineConfig::instant();

    media::process_videos(&mut page, Scope::Document, &cfg)
        .await
        .unwrap();
    assert_eq!(page.click_count(page.find("toggle").unwrap()), 0);
    // The video still completed through the media API.
    assert!(page.media_of(page.find("v1").unwrap()).unwrap().ended);
}

#[tokio::test]
async fn blocked_autoplay_degrades_to_no_progress() {
    let mut blocked = video("v1", 60.0);
    blocked.autoplay_blocked = true;
    let mut page = page(vec![blocked]);
    let cfg = EngineConfig::instant();

    let progressed = media::process_videos(&mut page, Scope::Document, &cfg)
        .await
        .unwrap();
    assert!(!progressed);
    // Not marked: a later round may retry after the page changes.
    assert_eq!(page.attr_of(page.find("v1").unwrap(), "data-played"), None);
}

#[tokio::test]
async fn scripted_player_runs_once() {
    let mut page = SimPage::new(PageSpec {
        url: "https://lms.example/training/player/1/1".into(),
        nodes: vec![],
        frames: vec![],
        native_player: true,
    });
    let cfg = EngineConfig::instant();

    assert!(media::process_native_player(&mut page, &cfg).await.unwrap());
    // Already started: subsequent rounds see no scripted player work.
    assert!(!media::process_native_player(&mut page, &cfg).await.unwrap());
}
