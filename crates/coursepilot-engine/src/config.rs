//! Engine tunables: settle delays, retry caps and probe windows.
//!
//! Every "keep going" behavior in the engine is counted iteration with an
//! exit condition defined here. The defaults are the production values;
//! `instant()` zeroes the delays for simulation and tests without
//! touching the caps.

use std::time::Duration;

/// Bounds for numbered-ID widget probing (`#card1`, `#card2`, ...).
///
/// Probing starts at 1 and stops when nothing at all was found by
/// `give_up_after`, or when the index has run `past_last` ids beyond the
/// last confirmed hit. Tolerates sparse numbering without unbounded scans.
#[derive(Debug, Clone, Copy)]
pub struct ProbeWindow {
    pub give_up_after: u32,
    pub past_last: u32,
    /// Absolute ceiling on probed ids.
    pub cap: u32,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Click attempts before giving up on one element.
    pub click_attempts: u32,
    /// Pause between scrolling an element into view and clicking it.
    pub click_settle: Duration,
    /// Pause after a failed click attempt.
    pub click_retry_delay: Duration,
    /// Pause after each successful widget interaction (animations, DOM
    /// updates).
    pub interaction_delay: Duration,
    /// Wait for page content to settle before processing a frame.
    pub content_settle: Duration,
    /// Short pause between tightly coupled steps (select then submit).
    pub short_delay: Duration,
    /// Pause for a dialog to open or close.
    pub dialog_delay: Duration,
    /// Pause before issuing a navigation.
    pub navigation_delay: Duration,
    /// Polling interval for element waits.
    pub poll_interval: Duration,
    /// Default timeout for element waits.
    pub wait_timeout: Duration,
    /// Timeout for the end-of-round continue/next probe.
    pub continue_probe_timeout: Duration,

    /// Cap on carousel next-clicks, against controls that never disable.
    pub carousel_max_clicks: u32,
    /// Video discovery rounds; new videos can appear after other widgets
    /// are driven.
    pub video_discovery_rounds: u32,
    /// Pause between video discovery rounds.
    pub video_rescan_delay: Duration,
    /// Ceiling on a single end-of-video wait.
    pub video_end_ceiling: Duration,
    /// Ceiling on waiting out a penalty replay during quiz brute force.
    pub replay_wait_ceiling: Duration,
    /// Ceiling on a scripted-player completion wait.
    pub native_player_timeout: Duration,
    /// Wait after submitting a quiz answer before reading feedback.
    pub quiz_feedback_delay: Duration,
    /// Orchestrator rounds per frame.
    pub round_cap: u32,

    /// Probe window for tabs, cards and accordion sections.
    pub probe_small: ProbeWindow,
    /// Probe window for interactive links, which number into the hundreds.
    pub probe_links: ProbeWindow,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            click_attempts: 3,
            click_settle: Duration::from_millis(200),
            click_retry_delay: Duration::from_millis(200),
            interaction_delay: Duration::from_millis(800),
            content_settle: Duration::from_millis(2000),
            short_delay: Duration::from_millis(500),
            dialog_delay: Duration::from_millis(1000),
            navigation_delay: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(100),
            wait_timeout: Duration::from_secs(5),
            continue_probe_timeout: Duration::from_secs(1),
            carousel_max_clicks: 50,
            video_discovery_rounds: 5,
            video_rescan_delay: Duration::from_millis(1500),
            video_end_ceiling: Duration::from_secs(600),
            replay_wait_ceiling: Duration::from_secs(60),
            native_player_timeout: Duration::from_secs(30),
            quiz_feedback_delay: Duration::from_millis(2000),
            round_cap: 3,
            probe_small: ProbeWindow {
                give_up_after: 10,
                past_last: 5,
                cap: 50,
            },
            probe_links: ProbeWindow {
                give_up_after: 20,
                past_last: 10,
                cap: 200,
            },
        }
    }
}

impl EngineConfig {
    /// All delays zeroed, caps unchanged. For simulation and tests.
    pub fn instant() -> Self {
        Self {
            click_settle: Duration::ZERO,
            click_retry_delay: Duration::ZERO,
            interaction_delay: Duration::ZERO,
            content_settle: Duration::ZERO,
            short_delay: Duration::ZERO,
            dialog_delay: Duration::ZERO,
            navigation_delay: Duration::ZERO,
            poll_interval: Duration::ZERO,
            wait_timeout: Duration::ZERO,
            continue_probe_timeout: Duration::ZERO,
            video_rescan_delay: Duration::ZERO,
            quiz_feedback_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}
