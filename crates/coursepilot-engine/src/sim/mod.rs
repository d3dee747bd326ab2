//! A deterministic in-memory page.
//!
//! `SimPage` implements the `Page` trait over a scripted DOM tree:
//! fixtures declare nodes and the effects their clicks have (add a class,
//! reveal an element, seek a video). It backs the CLI's dry-run command
//! and the integration test suite, standing in for a real browser
//! backend.

mod select;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::page::Page;
use coursepilot_common::error::DomError;
use coursepilot_common::protocol::{
    ElementSnapshot, FrameId, MediaState, NodeId, Rect, Scope, StyleSnapshot,
};

use select::{AttrOp, Complex, Compound, Simple, parse_list};

// ---------------------------------------------------------------------
// Fixture document
// ---------------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_tag() -> String {
    "div".to_string()
}

/// A scripted consequence of clicking a node. Targets are `"self"` or a
/// selector evaluated in the clicked node's frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickEffect {
    AddClass { target: String, class: String },
    RemoveClass { target: String, class: String },
    SetAttr { target: String, name: String, value: String },
    RemoveAttr { target: String, name: String },
    Show { target: String },
    Hide { target: String },
    Enable { target: String },
    Disable { target: String },
    SetText { target: String, text: String },
    SeekMedia { target: String, position: f64 },
    SetMediaSource { target: String, source: String },
    /// Simulate a host-page script throwing during the click.
    Fail { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MediaSpec {
    #[serde(default)]
    pub position: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub ended: bool,
    #[serde(default = "default_true")]
    pub paused: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    /// The DOM `id` attribute.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    /// The node's own text, excluding children.
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub opacity: Option<f32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub media: Option<MediaSpec>,
    /// Native playback rejects, as with autoplay policies.
    #[serde(default)]
    pub autoplay_blocked: bool,
    /// The node disables itself once it has been clicked this many times
    /// (carousel controls at the last slide).
    #[serde(default)]
    pub disable_after_clicks: Option<u32>,
    #[serde(default)]
    pub on_click: Vec<ClickEffect>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl Default for NodeSpec {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            id: None,
            classes: Vec::new(),
            attrs: HashMap::new(),
            text: String::new(),
            visible: true,
            disabled: false,
            opacity: None,
            color: None,
            rect: None,
            media: None,
            autoplay_blocked: false,
            disable_after_clicks: None,
            on_click: Vec::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FrameSpec {
    /// Cross-origin frames deny access to every query.
    #[serde(default)]
    pub denied: bool,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// A complete simulated page, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec {
    pub url: String,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub frames: Vec<FrameSpec>,
    /// The page exposes a scripted player API.
    #[serde(default)]
    pub native_player: bool,
}

// ---------------------------------------------------------------------
// Simulated DOM
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
struct SimNode {
    tag: String,
    dom_id: Option<String>,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
    text: String,
    visible: bool,
    disabled: bool,
    style: StyleSnapshot,
    rect: Rect,
    media: Option<MediaState>,
    autoplay_blocked: bool,
    disable_after_clicks: Option<u32>,
    on_click: Vec<ClickEffect>,
    parent: Option<usize>,
    children: Vec<usize>,
    frame: Option<FrameId>,
}

#[derive(Debug, Clone, Copy)]
struct SimFrame {
    denied: bool,
}

pub struct SimPage {
    url: String,
    nodes: Vec<SimNode>,
    frames: Vec<SimFrame>,
    native_player: bool,
    native_player_started: bool,
    clicks: Vec<NodeId>,
    suppressed: Vec<NodeId>,
    navigations: Vec<String>,
}

impl SimPage {
    pub fn new(spec: PageSpec) -> Self {
        let mut page = Self {
            url: spec.url,
            nodes: Vec::new(),
            frames: Vec::new(),
            native_player: spec.native_player,
            native_player_started: false,
            clicks: Vec::new(),
            suppressed: Vec::new(),
            navigations: Vec::new(),
        };
        for node in spec.nodes {
            page.add_tree(node, None, None);
        }
        for (i, frame) in spec.frames.into_iter().enumerate() {
            page.frames.push(SimFrame {
                denied: frame.denied,
            });
            for node in frame.nodes {
                page.add_tree(node, None, Some(i as FrameId));
            }
        }
        page
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    fn add_tree(&mut self, spec: NodeSpec, parent: Option<usize>, frame: Option<FrameId>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(SimNode {
            tag: spec.tag.to_lowercase(),
            dom_id: spec.id,
            classes: spec.classes,
            attrs: spec.attrs,
            text: spec.text,
            visible: spec.visible,
            disabled: spec.disabled,
            style: StyleSnapshot {
                opacity: spec.opacity.unwrap_or(1.0),
                color: spec.color.unwrap_or_default(),
            },
            rect: spec.rect.unwrap_or(Rect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 30.0,
            }),
            media: spec.media.map(|m| MediaState {
                position: m.position,
                duration: m.duration,
                ended: m.ended,
                paused: m.paused,
                muted: false,
                source: m.source,
            }),
            autoplay_blocked: spec.autoplay_blocked,
            disable_after_clicks: spec.disable_after_clicks,
            on_click: spec.on_click,
            parent,
            children: Vec::new(),
            frame,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(idx);
        }
        for child in spec.children {
            self.add_tree(child, Some(idx), frame);
        }
        idx
    }

    // -- inspection helpers for tests and the CLI --------------------

    /// Node handle for a DOM id.
    pub fn find(&self, dom_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.dom_id.as_deref() == Some(dom_id))
            .map(|i| i as NodeId)
    }

    pub fn clicks(&self) -> &[NodeId] {
        &self.clicks
    }

    pub fn click_count(&self, id: NodeId) -> usize {
        self.clicks.iter().filter(|&&c| c == id).count()
    }

    /// Clicks whose default action was suppressed beforehand.
    pub fn suppressed_clicks(&self) -> &[NodeId] {
        &self.suppressed
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(id as usize)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn attr_of(&self, id: NodeId, name: &str) -> Option<String> {
        self.nodes.get(id as usize).and_then(|n| n.attrs.get(name).cloned())
    }

    pub fn media_of(&self, id: NodeId) -> Option<&MediaState> {
        self.nodes.get(id as usize).and_then(|n| n.media.as_ref())
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    // -- internal ----------------------------------------------------

    fn node(&self, id: NodeId) -> Result<&SimNode, DomError> {
        self.nodes.get(id as usize).ok_or(DomError::NodeGone(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SimNode, DomError> {
        self.nodes.get_mut(id as usize).ok_or(DomError::NodeGone(id))
    }

    fn effectively_visible(&self, idx: usize) -> bool {
        let mut cur = Some(idx);
        while let Some(i) = cur {
            if !self.nodes[i].visible {
                return false;
            }
            cur = self.nodes[i].parent;
        }
        true
    }

    fn rendered_text(&self, idx: usize) -> String {
        let mut parts = Vec::new();
        self.collect_text(idx, &mut parts);
        parts.join(" ").trim().to_string()
    }

    fn collect_text(&self, idx: usize, parts: &mut Vec<String>) {
        let node = &self.nodes[idx];
        if !node.text.is_empty() {
            parts.push(node.text.clone());
        }
        for &child in &node.children {
            self.collect_text(child, parts);
        }
    }

    fn is_descendant(&self, idx: usize, root: usize) -> bool {
        let mut cur = self.nodes[idx].parent;
        while let Some(i) = cur {
            if i == root {
                return true;
            }
            cur = self.nodes[i].parent;
        }
        false
    }

    fn in_scope(&self, idx: usize, scope: Scope) -> Result<bool, DomError> {
        match scope {
            Scope::Document => Ok(self.nodes[idx].frame.is_none()),
            Scope::Frame(f) => {
                let frame = self
                    .frames
                    .get(f as usize)
                    .ok_or_else(|| DomError::Backend(format!("no frame {f}")))?;
                if frame.denied {
                    return Err(DomError::AccessDenied(format!("frame {f} is cross-origin")));
                }
                Ok(self.nodes[idx].frame == Some(f))
            }
            Scope::Node(root) => {
                if root as usize >= self.nodes.len() {
                    return Err(DomError::NodeGone(root));
                }
                Ok(self.is_descendant(idx, root as usize))
            }
        }
    }

    fn attr_value(&self, idx: usize, name: &str) -> Option<String> {
        let node = &self.nodes[idx];
        match name {
            "id" => node.dom_id.clone(),
            "class" => Some(node.classes.join(" ")),
            _ => node.attrs.get(name).cloned(),
        }
    }

    /// 1-based position among same-tag siblings.
    fn nth_of_type(&self, idx: usize) -> u32 {
        let tag = &self.nodes[idx].tag;
        let siblings: Vec<usize> = match self.nodes[idx].parent {
            Some(parent) => self.nodes[parent].children.clone(),
            None => self
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.parent.is_none() && n.frame == self.nodes[idx].frame)
                .map(|(i, _)| i)
                .collect(),
        };
        let mut position = 0;
        for sibling in siblings {
            if &self.nodes[sibling].tag == tag {
                position += 1;
                if sibling == idx {
                    return position;
                }
            }
        }
        position
    }

    fn match_simple(&self, idx: usize, simple: &Simple) -> bool {
        let node = &self.nodes[idx];
        match simple {
            Simple::Universal => true,
            Simple::Tag(tag) => &node.tag == tag,
            Simple::Id(id) => node.dom_id.as_deref() == Some(id.as_str()),
            Simple::Class(class) => node.classes.iter().any(|c| c == class),
            Simple::Attr { name, op, value } => match self.attr_value(idx, name) {
                Some(actual) => match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals => &actual == value,
                    AttrOp::Prefix => actual.starts_with(value.as_str()),
                    AttrOp::Contains => actual.contains(value.as_str()),
                },
                None => false,
            },
            Simple::Not(compound) => !self.match_compound(idx, compound),
            Simple::NthOfType(n) => self.nth_of_type(idx) == *n,
        }
    }

    fn match_compound(&self, idx: usize, compound: &Compound) -> bool {
        compound.simples.iter().all(|s| self.match_simple(idx, s))
    }

    fn match_complex(&self, idx: usize, complex: &Complex) -> bool {
        let last = complex.compounds.len() - 1;
        if !self.match_compound(idx, &complex.compounds[last]) {
            return false;
        }
        self.match_ancestors(idx, complex, last)
    }

    fn match_ancestors(&self, idx: usize, complex: &Complex, pos: usize) -> bool {
        if pos == 0 {
            return true;
        }
        match complex.combinators[pos - 1] {
            select::Combinator::Child => match self.nodes[idx].parent {
                Some(parent) => {
                    self.match_compound(parent, &complex.compounds[pos - 1])
                        && self.match_ancestors(parent, complex, pos - 1)
                }
                None => false,
            },
            select::Combinator::Descendant => {
                let mut cur = self.nodes[idx].parent;
                while let Some(ancestor) = cur {
                    if self.match_compound(ancestor, &complex.compounds[pos - 1])
                        && self.match_ancestors(ancestor, complex, pos - 1)
                    {
                        return true;
                    }
                    cur = self.nodes[ancestor].parent;
                }
                false
            }
        }
    }

    fn query_sync(&self, scope: Scope, selector: &str) -> Result<Vec<NodeId>, DomError> {
        if let Scope::Frame(f) = scope {
            let frame = self
                .frames
                .get(f as usize)
                .ok_or_else(|| DomError::Backend(format!("no frame {f}")))?;
            if frame.denied {
                return Err(DomError::AccessDenied(format!("frame {f} is cross-origin")));
            }
        }
        let selectors = parse_list(selector)?;
        let mut out = Vec::new();
        for idx in 0..self.nodes.len() {
            if !self.in_scope(idx, scope)? {
                continue;
            }
            if selectors.iter().any(|c| self.match_complex(idx, c)) {
                out.push(idx as NodeId);
            }
        }
        Ok(out)
    }

    fn apply_effects(&mut self, source: NodeId, effects: Vec<ClickEffect>) -> Result<(), DomError> {
        for effect in effects {
            if let ClickEffect::Fail { message } = &effect {
                return Err(DomError::Script(message.clone()));
            }
            let targets = self.effect_targets(source, effect_target(&effect))?;
            for target in targets {
                self.apply_effect_to(target, &effect);
            }
        }
        Ok(())
    }

    fn effect_targets(&self, source: NodeId, target: &str) -> Result<Vec<usize>, DomError> {
        if target == "self" {
            return Ok(vec![source as usize]);
        }
        let scope = match self.nodes[source as usize].frame {
            Some(f) => Scope::Frame(f),
            None => Scope::Document,
        };
        Ok(self
            .query_sync(scope, target)?
            .into_iter()
            .map(|id| id as usize)
            .collect())
    }

    fn apply_effect_to(&mut self, idx: usize, effect: &ClickEffect) {
        let node = &mut self.nodes[idx];
        match effect {
            ClickEffect::AddClass { class, .. } => {
                if !node.classes.iter().any(|c| c == class) {
                    node.classes.push(class.clone());
                }
            }
            ClickEffect::RemoveClass { class, .. } => node.classes.retain(|c| c != class),
            ClickEffect::SetAttr { name, value, .. } => {
                node.attrs.insert(name.clone(), value.clone());
            }
            ClickEffect::RemoveAttr { name, .. } => {
                node.attrs.remove(name);
            }
            ClickEffect::Show { .. } => node.visible = true,
            ClickEffect::Hide { .. } => node.visible = false,
            ClickEffect::Enable { .. } => node.disabled = false,
            ClickEffect::Disable { .. } => node.disabled = true,
            ClickEffect::SetText { text, .. } => node.text = text.clone(),
            ClickEffect::SeekMedia { position, .. } => {
                if let Some(media) = node.media.as_mut() {
                    media.position = *position;
                    media.ended = false;
                    media.paused = false;
                }
            }
            ClickEffect::SetMediaSource { source, .. } => {
                if let Some(media) = node.media.as_mut() {
                    media.source = source.clone();
                    media.position = 0.0;
                    media.ended = false;
                }
            }
            ClickEffect::Fail { .. } => {}
        }
    }
}

fn effect_target(effect: &ClickEffect) -> &str {
    match effect {
        ClickEffect::AddClass { target, .. }
        | ClickEffect::RemoveClass { target, .. }
        | ClickEffect::SetAttr { target, .. }
        | ClickEffect::RemoveAttr { target, .. }
        | ClickEffect::Show { target }
        | ClickEffect::Hide { target }
        | ClickEffect::Enable { target }
        | ClickEffect::Disable { target }
        | ClickEffect::SetText { target, .. }
        | ClickEffect::SeekMedia { target, .. }
        | ClickEffect::SetMediaSource { target, .. } => target,
        ClickEffect::Fail { .. } => "self",
    }
}

#[async_trait]
impl Page for SimPage {
    fn url(&self) -> String {
        self.url.clone()
    }

    async fn query(&self, scope: Scope, selector: &str) -> Result<Vec<NodeId>, DomError> {
        self.query_sync(scope, selector)
    }

    async fn snapshot(&self, id: NodeId) -> Result<ElementSnapshot, DomError> {
        let node = self.node(id)?;
        Ok(ElementSnapshot {
            id,
            tag: node.tag.clone(),
            dom_id: node.dom_id.clone(),
            classes: node.classes.clone(),
            attributes: node.attrs.clone(),
            text: self.rendered_text(id as usize),
            visible: self.effectively_visible(id as usize),
            disabled: node.disabled,
            style: node.style.clone(),
            rect: node.rect,
        })
    }

    async fn click(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node(id)?;
        self.clicks.push(id);
        if let Some(limit) = self.nodes[id as usize].disable_after_clicks {
            if self.click_count(id) >= limit as usize {
                self.nodes[id as usize].disabled = true;
            }
        }
        let effects = self.nodes[id as usize].on_click.clone();
        self.apply_effects(id, effects)
    }

    async fn scroll_into_view(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node(id).map(|_| ())
    }

    async fn set_attribute(&mut self, id: NodeId, name: &str, value: &str)
    -> Result<(), DomError> {
        self.node_mut(id)?
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn suppress_navigation(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node(id)?;
        self.suppressed.push(id);
        Ok(())
    }

    async fn closest(&self, id: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let selectors = parse_list(selector)?;
        self.node(id)?;
        let mut cur = Some(id as usize);
        while let Some(idx) = cur {
            if selectors.iter().any(|c| self.match_complex(idx, c)) {
                return Ok(Some(idx as NodeId));
            }
            cur = self.nodes[idx].parent;
        }
        Ok(None)
    }

    async fn media_state(&self, id: NodeId) -> Result<MediaState, DomError> {
        self.node(id)?
            .media
            .clone()
            .ok_or_else(|| DomError::NotSupported("media_state".into()))
    }

    async fn set_muted(&mut self, id: NodeId, muted: bool) -> Result<(), DomError> {
        match self.node_mut(id)?.media.as_mut() {
            Some(media) => {
                media.muted = muted;
                Ok(())
            }
            None => Err(DomError::NotSupported("set_muted".into())),
        }
    }

    async fn play_media(&mut self, id: NodeId) -> Result<(), DomError> {
        if self.node(id)?.autoplay_blocked {
            return Err(DomError::Script("play() request was not allowed".into()));
        }
        match self.node_mut(id)?.media.as_mut() {
            Some(media) => {
                media.paused = false;
                Ok(())
            }
            None => Err(DomError::NotSupported("play_media".into())),
        }
    }

    async fn wait_media_ended(
        &mut self,
        id: NodeId,
        _timeout: Duration,
    ) -> Result<bool, DomError> {
        match self.node_mut(id)?.media.as_mut() {
            Some(media) => {
                // Simulated playback completes instantly.
                media.position = media.duration;
                media.ended = true;
                media.paused = true;
                Ok(true)
            }
            None => Err(DomError::NotSupported("wait_media_ended".into())),
        }
    }

    async fn native_player_start(&mut self) -> Result<bool, DomError> {
        if self.native_player && !self.native_player_started {
            self.native_player_started = true;
            return Ok(true);
        }
        Ok(false)
    }

    async fn wait_native_player_complete(&mut self, _timeout: Duration) -> Result<bool, DomError> {
        Ok(true)
    }

    async fn frames(&self) -> Result<Vec<FrameId>, DomError> {
        Ok((0..self.frames.len() as FrameId).collect())
    }

    async fn navigate(&mut self, url: &str) -> Result<(), DomError> {
        self.navigations.push(url.to_string());
        self.url = url.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(nodes: Vec<NodeSpec>) -> SimPage {
        SimPage::new(PageSpec {
            url: "https://lms.example/training/player/1/1".into(),
            nodes,
            frames: vec![],
            native_player: false,
        })
    }

    fn node(tag: &str, id: Option<&str>) -> NodeSpec {
        NodeSpec {
            tag: tag.into(),
            id: id.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn query_matches_by_id_class_and_attr() {
        let mut btn = node("button", Some("btn_tab1"));
        btn.classes = vec!["visited".into()];
        let page = page_with(vec![btn, node("button", Some("btn_tab2"))]);

        let all = page
            .query(Scope::Document, r#"[id^="btn_tab"]"#)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let unvisited = page
            .query(Scope::Document, r#"[id^="btn_tab"]:not(.visited)"#)
            .await
            .unwrap();
        assert_eq!(unvisited.len(), 1);
        assert_eq!(page.find("btn_tab2"), Some(unvisited[0]));
    }

    #[tokio::test]
    async fn query_respects_child_and_descendant_combinators() {
        let mut li = node("li", Some("li-1"));
        li.children = vec![node("a", Some("link1"))];
        let mut wrapper = node("div", Some("wrap"));
        wrapper.children = vec![node("a", Some("link2"))];
        let page = page_with(vec![li, wrapper]);

        let direct = page
            .query(Scope::Document, r#"[id^="li-"] > a"#)
            .await
            .unwrap();
        assert_eq!(direct, vec![page.find("link1").unwrap()]);

        let nested = page.query(Scope::Document, "div a").await.unwrap();
        assert_eq!(nested, vec![page.find("link2").unwrap()]);
    }

    #[tokio::test]
    async fn query_nth_of_type_selects_column() {
        let mut row = node("tr", Some("row"));
        row.children = (0..6).map(|i| node("td", Some(&format!("col{i}")))).collect();
        let page = page_with(vec![row]);

        let fourth = page
            .query(
                Scope::Node(page.find("row").unwrap()),
                "td:nth-of-type(4)",
            )
            .await
            .unwrap();
        assert_eq!(fourth, vec![page.find("col3").unwrap()]);
    }

    #[tokio::test]
    async fn node_scope_excludes_the_root_itself() {
        let mut outer = node("div", Some("outer"));
        outer.children = vec![node("div", Some("inner"))];
        let page = page_with(vec![outer]);

        let hits = page
            .query(Scope::Node(page.find("outer").unwrap()), "div")
            .await
            .unwrap();
        assert_eq!(hits, vec![page.find("inner").unwrap()]);
    }

    #[tokio::test]
    async fn denied_frames_error_on_query() {
        let page = SimPage::new(PageSpec {
            url: "https://lms.example/training/player/1/1".into(),
            nodes: vec![],
            frames: vec![FrameSpec {
                denied: true,
                nodes: vec![node("div", Some("hidden"))],
            }],
            native_player: false,
        });
        let err = page.query(Scope::Frame(0), "div").await.unwrap_err();
        assert!(matches!(err, DomError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn click_effects_mutate_the_tree() {
        let mut card = node("div", Some("card1"));
        card.on_click = vec![
            ClickEffect::AddClass {
                target: "self".into(),
                class: "flipped".into(),
            },
            ClickEffect::Enable {
                target: "#next".into(),
            },
        ];
        let mut next = node("button", Some("next"));
        next.disabled = true;
        let mut page = page_with(vec![card, next]);

        let card_id = page.find("card1").unwrap();
        page.click(card_id).await.unwrap();
        assert!(page.has_class(card_id, "flipped"));
        let next_id = page.find("next").unwrap();
        assert!(!page.snapshot(next_id).await.unwrap().disabled);
    }

    #[tokio::test]
    async fn fail_effect_surfaces_as_script_error() {
        let mut trap = node("button", Some("trap"));
        trap.on_click = vec![ClickEffect::Fail {
            message: "TrackJS caught: invalid regular expression".into(),
        }];
        let mut page = page_with(vec![trap]);
        let id = page.find("trap").unwrap();
        assert!(matches!(
            page.click(id).await,
            Err(DomError::Script(_))
        ));
    }

    #[tokio::test]
    async fn hidden_ancestors_hide_descendants() {
        let mut hidden = node("div", Some("hidden-root"));
        hidden.visible = false;
        hidden.children = vec![node("button", Some("inner-btn"))];
        let page = page_with(vec![hidden]);

        let snapshot = page
            .snapshot(page.find("inner-btn").unwrap())
            .await
            .unwrap();
        assert!(!snapshot.visible);
    }

    #[tokio::test]
    async fn rendered_text_includes_descendants() {
        let mut dialog = node("div", Some("dialog"));
        dialog.text = "This course".into();
        let mut span = node("span", None);
        span.text = "requires you to view and acknowledge".into();
        dialog.children = vec![span];
        let page = page_with(vec![dialog]);

        let snapshot = page.snapshot(page.find("dialog").unwrap()).await.unwrap();
        assert!(snapshot.text_contains("view and acknowledge"));
    }
}
