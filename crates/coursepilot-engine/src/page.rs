//! The DOM access layer seam.
//!
//! The engine never touches a real DOM. Everything it needs from the page
//! goes through this trait: selector queries, element snapshots, event
//! dispatch, media control, frame enumeration and navigation. Backends
//! (a browser extension bridge, a driver protocol, or the in-memory
//! simulated page) implement it; capabilities a backend cannot offer
//! default to `NotSupported`, which callers treat as absence.

use async_trait::async_trait;
use std::time::Duration;

pub use coursepilot_common::error::DomError;
use coursepilot_common::protocol::{ElementSnapshot, FrameId, MediaState, NodeId, Scope};

#[async_trait]
pub trait Page: Send + Sync {
    /// Current location of the page.
    fn url(&self) -> String;

    /// Evaluate a structural selector, returning matches in document
    /// order. Text-containment pseudo patterns are handled above this
    /// trait by the resolver and never reach a backend.
    async fn query(&self, scope: Scope, selector: &str) -> Result<Vec<NodeId>, DomError>;

    /// Point-in-time facts about one element.
    async fn snapshot(&self, id: NodeId) -> Result<ElementSnapshot, DomError>;

    /// Dispatch a click (native activation where available, else a
    /// synthetic bubbling mouse event).
    async fn click(&mut self, id: NodeId) -> Result<(), DomError>;

    /// Bring the element into the viewport center.
    async fn scroll_into_view(&mut self, id: NodeId) -> Result<(), DomError>;

    async fn set_attribute(&mut self, id: NodeId, name: &str, value: &str)
    -> Result<(), DomError>;

    /// Cancel the default action of the element's next activation, so a
    /// link click registers the interaction without leaving the page.
    async fn suppress_navigation(&mut self, _id: NodeId) -> Result<(), DomError> {
        Err(DomError::NotSupported("suppress_navigation".into()))
    }

    /// Nearest ancestor (including the element itself) matching the
    /// selector.
    async fn closest(&self, id: NodeId, selector: &str) -> Result<Option<NodeId>, DomError>;

    async fn media_state(&self, id: NodeId) -> Result<MediaState, DomError>;

    async fn set_muted(&mut self, id: NodeId, muted: bool) -> Result<(), DomError>;

    /// Invoke native playback on a media element.
    async fn play_media(&mut self, id: NodeId) -> Result<(), DomError>;

    /// Suspend until the element's end-of-media signal fires. Returns
    /// false when the timeout elapsed first; callers assume done either
    /// way.
    async fn wait_media_ended(&mut self, id: NodeId, timeout: Duration)
    -> Result<bool, DomError>;

    /// Mute and start the page's scripted player API, if one is present.
    /// Returns false when no such player exists on the page.
    async fn native_player_start(&mut self) -> Result<bool, DomError> {
        Ok(false)
    }

    /// Wait for the scripted player to report completion, bounded by
    /// `timeout`.
    async fn wait_native_player_complete(&mut self, _timeout: Duration) -> Result<bool, DomError> {
        Ok(true)
    }

    /// Embedded frames in document order. Queries against an inaccessible
    /// (cross-origin) frame fail with `AccessDenied`, which callers treat
    /// as a normal outcome.
    async fn frames(&self) -> Result<Vec<FrameId>, DomError> {
        Ok(vec![])
    }

    /// Issue a same-origin navigation.
    async fn navigate(&mut self, url: &str) -> Result<(), DomError>;
}
