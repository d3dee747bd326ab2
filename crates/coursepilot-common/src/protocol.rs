//! Shared data types exchanged between the engine and the DOM access layer.
//!
//! Snapshots are point-in-time facts about a live element. They are only
//! valid for the duration of the current processing round; the page may
//! mutate under the engine at any suspension point, so nothing here is
//! cached across rounds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque handle to a DOM node, allocated by the access layer.
///
/// Handles are unique across the document and all of its embedded frames
/// for the lifetime of the page.
pub type NodeId = u32;

/// Index of an embedded frame within the current page.
pub type FrameId = u32;

/// Where a query is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The top-level document.
    Document,
    /// An embedded same-origin frame.
    Frame(FrameId),
    /// The subtree rooted at a node (the node itself excluded).
    Node(NodeId),
}

/// Layout box of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// True if `self` sits within `other` expanded by `margin` on all sides.
    pub fn within(&self, other: &Rect, margin: f32) -> bool {
        self.x >= other.x - margin
            && self.x + self.width <= other.x + other.width + margin
            && self.y >= other.y - margin
            && self.y + self.height <= other.y + other.height + margin
    }
}

/// Computed-style facts the engine consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSnapshot {
    pub opacity: f32,
    pub color: String,
}

impl Default for StyleSnapshot {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            color: String::new(),
        }
    }
}

/// A point-in-time view of one element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: NodeId,
    pub tag: String,
    /// The element's `id` attribute, if any.
    pub dom_id: Option<String>,
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    /// Full rendered text content, whitespace-trimmed.
    pub text: String,
    /// Rendered with a non-null layout box.
    pub visible: bool,
    pub disabled: bool,
    #[serde(default)]
    pub style: StyleSnapshot,
    #[serde(default)]
    pub rect: Rect,
}

impl ElementSnapshot {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Case-insensitive containment check against the rendered text.
    pub fn text_contains(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Interactable right now: rendered and not disabled.
    pub fn clickable(&self) -> bool {
        self.visible && !self.disabled
    }
}

/// Playback facts about a media element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MediaState {
    /// Current playback position in seconds.
    pub position: f64,
    /// Total duration in seconds; 0.0 when unknown.
    pub duration: f64,
    pub ended: bool,
    pub paused: bool,
    pub muted: bool,
    /// Identity of the current source (URL or equivalent).
    pub source: String,
}

impl MediaState {
    /// Remaining playback under one second counts as finished; short
    /// clips and already-ended media resolve without an event wait.
    pub fn near_end(&self) -> bool {
        self.ended || (self.duration > 0.0 && self.duration - self.position < 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_within_margin() {
        let outer = Rect {
            x: 100.0,
            y: 100.0,
            width: 400.0,
            height: 300.0,
        };
        let inner = Rect {
            x: 80.0,
            y: 90.0,
            width: 60.0,
            height: 40.0,
        };
        assert!(inner.within(&outer, 100.0));
        assert!(!inner.within(&outer, 0.0));
    }

    #[test]
    fn near_end_heuristic() {
        let mut m = MediaState {
            position: 29.5,
            duration: 30.0,
            ..Default::default()
        };
        assert!(m.near_end());
        m.position = 5.0;
        assert!(!m.near_end());
        m.ended = true;
        assert!(m.near_end());
    }

    #[test]
    fn near_end_unknown_duration() {
        let m = MediaState::default();
        assert!(!m.near_end());
    }
}
