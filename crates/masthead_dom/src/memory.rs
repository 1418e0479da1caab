//! In-memory document
//!
//! [`MemoryDocument`] is a small page model that implements [`Document`]
//! without a browser. Elements live in a slotmap arena; block layout is
//! computed by Taffy (every element is a column flex container, which gives
//! normal block flow including negative margins). Scrolling, `position:
//! sticky` clamping, `translateY` transforms and `visibility: hidden` are
//! honored by geometry and hit testing, which is all the sticky-header engine
//! observes.
//!
//! # Example
//!
//! ```rust
//! use masthead_dom::prelude::*;
//!
//! let mut doc = MemoryDocument::new(Viewport::new(1024.0, 768.0));
//! let wrapper = doc.append_to_body(
//!     el("div")
//!         .class("wp-site-blocks")
//!         .child(el("header").id("masthead").height(80.0).sticky())
//!         .child(el("main").height(3000.0).bg("rgb(255, 255, 255)")),
//! );
//!
//! let header = doc.element_by_id("masthead").unwrap();
//! assert_eq!(doc.parent(header), Some(wrapper));
//! assert_eq!(doc.offset_height(header), 80.0);
//! ```

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use taffy::prelude::*;
use tracing::{debug, warn};

use crate::document::{Document, ElementBounds, ReadyState, Viewport};
use crate::error::SelectorError;
use crate::selector::{SelectorList, SelectorSubject};

new_key_type! {
    /// Handle to an element in a [`MemoryDocument`]
    pub struct ElementId;
}

/// Computed background of elements that declare none
pub const TRANSPARENT_BACKGROUND: &str = "rgba(0, 0, 0, 0)";

/// Inline properties that change layout and trigger a relayout
const LAYOUT_PROPERTIES: &[&str] = &["height", "margin-top", "display"];

// ============================================================================
// Element specs (builder + fixture format)
// ============================================================================

/// Declarative description of an element subtree
///
/// Built in code with [`el`] or deserialized from a JSON page fixture.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    /// Computed `background-color` (defaults to transparent)
    pub background: Option<String>,
    /// Computed `opacity` (defaults to 1)
    pub opacity: Option<f32>,
    /// Layout height in px; `None` sizes to content
    pub height: Option<f32>,
    /// Layout width in px; `None` stretches to the container
    pub width: Option<f32>,
    pub margin_top: Option<f32>,
    pub text: Option<String>,
    /// Positioned with `position: sticky; top: 0`
    pub sticky: bool,
    pub children: Vec<ElementSpec>,
}

impl Default for ElementSpec {
    fn default() -> Self {
        Self {
            tag: "div".to_string(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            background: None,
            opacity: None,
            height: None,
            width: None,
            margin_top: None,
            text: None,
            sticky: false,
            children: Vec::new(),
        }
    }
}

/// Start building an element with the given tag
pub fn el(tag: &str) -> ElementSpec {
    ElementSpec {
        tag: tag.to_ascii_lowercase(),
        ..Default::default()
    }
}

impl ElementSpec {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the computed background color
    pub fn bg(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn margin_top(mut self, margin: f32) -> Self {
        self.margin_top = Some(margin);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// A complete page fixture
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    pub viewport: Viewport,
    pub reduced_motion: bool,
    /// Start in the `loading` ready state
    pub loading: bool,
    pub scroll_y: f32,
    /// Children of `<body>`
    pub body: Vec<ElementSpec>,
}

// ============================================================================
// Document
// ============================================================================

struct Node {
    tag: String,
    classes: SmallVec<[String; 4]>,
    attributes: IndexMap<String, String>,
    inline_style: IndexMap<String, String>,
    background: String,
    opacity: f32,
    height: Option<f32>,
    width: Option<f32>,
    margin_top: f32,
    text: String,
    sticky: bool,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    /// Layout bounds in document coordinates
    layout: ElementBounds,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: SmallVec::new(),
            attributes: IndexMap::new(),
            inline_style: IndexMap::new(),
            background: TRANSPARENT_BACKGROUND.to_string(),
            opacity: 1.0,
            height: None,
            width: None,
            margin_top: 0.0,
            text: String::new(),
            sticky: false,
            parent: None,
            children: Vec::new(),
            layout: ElementBounds::default(),
        }
    }

    fn from_spec(spec: &ElementSpec) -> Self {
        let mut node = Node::new(&spec.tag);
        for (name, value) in &spec.attributes {
            node.attributes.insert(name.to_ascii_lowercase(), value.clone());
        }
        if let Some(id) = &spec.id {
            node.attributes.insert("id".to_string(), id.clone());
        }
        node.classes.extend(spec.classes.iter().cloned());
        if let Some(background) = &spec.background {
            node.background = background.clone();
        }
        node.opacity = spec.opacity.unwrap_or(1.0);
        node.height = spec.height;
        node.width = spec.width;
        node.margin_top = spec.margin_top.unwrap_or(0.0);
        node.text = spec.text.clone().unwrap_or_default();
        node.sticky = spec.sticky;
        node
    }

    fn inline(&self, name: &str) -> Option<&str> {
        self.inline_style.get(name).map(String::as_str)
    }

    /// Inline `height` wins over the declared one
    fn effective_height(&self) -> Option<f32> {
        self.inline("height").and_then(parse_px).or(self.height)
    }

    fn effective_margin_top(&self) -> f32 {
        self.inline("margin-top")
            .and_then(parse_px)
            .unwrap_or(self.margin_top)
    }

    fn layout_style(&self, viewport_width: Option<f32>) -> Style {
        let display = if self.inline("display") == Some("none") {
            Display::None
        } else {
            Display::Flex
        };
        let width = viewport_width.or(self.width);

        Style {
            display,
            flex_direction: FlexDirection::Column,
            flex_shrink: 0.0,
            size: Size {
                width: width.map(Dimension::Length).unwrap_or(Dimension::Auto),
                height: self
                    .effective_height()
                    .map(Dimension::Length)
                    .unwrap_or(Dimension::Auto),
            },
            margin: taffy::geometry::Rect {
                left: LengthPercentageAuto::Length(0.0),
                right: LengthPercentageAuto::Length(0.0),
                top: LengthPercentageAuto::Length(self.effective_margin_top()),
                bottom: LengthPercentageAuto::Length(0.0),
            },
            ..Default::default()
        }
    }
}

/// In-memory page implementing [`Document`]
pub struct MemoryDocument {
    nodes: SlotMap<ElementId, Node>,
    /// `id` attribute → element (first registration wins)
    ids: FxHashMap<String, ElementId>,
    root: ElementId,
    body: ElementId,
    viewport: Viewport,
    scroll_y: f32,
    ready_state: ReadyState,
    reduced_motion: bool,
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("elements", &self.nodes.len())
            .field("viewport", &self.viewport)
            .field("scroll_y", &self.scroll_y)
            .field("ready_state", &self.ready_state)
            .finish()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl MemoryDocument {
    /// Create an empty `<html><body></body></html>` document
    pub fn new(viewport: Viewport) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("html"));
        let body = nodes.insert(Node::new("body"));
        nodes[body].parent = Some(root);
        nodes[root].children.push(body);

        let mut doc = Self {
            nodes,
            ids: FxHashMap::default(),
            root,
            body,
            viewport,
            scroll_y: 0.0,
            ready_state: ReadyState::Complete,
            reduced_motion: false,
        };
        doc.relayout();
        doc
    }

    /// Build a document from a page fixture
    pub fn from_page(page: &PageSpec) -> Self {
        let mut doc = Self::new(page.viewport);
        let body = doc.body;
        for spec in &page.body {
            doc.build(body, spec);
        }
        doc.reduced_motion = page.reduced_motion;
        if page.loading {
            doc.ready_state = ReadyState::Loading;
        }
        doc.relayout();
        doc.scroll_to(page.scroll_y);
        doc
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Append a subtree under `parent` and return its root element
    pub fn append(&mut self, parent: ElementId, spec: ElementSpec) -> ElementId {
        let id = self.build(parent, &spec);
        self.relayout();
        id
    }

    pub fn append_to_body(&mut self, spec: ElementSpec) -> ElementId {
        let body = self.body;
        self.append(body, spec)
    }

    fn build(&mut self, parent: ElementId, spec: &ElementSpec) -> ElementId {
        let id = self.nodes.insert(Node::from_spec(spec));
        self.nodes[id].parent = Some(parent);
        self.nodes[parent].children.push(id);
        if let Some(element_id) = &spec.id {
            self.register_id(element_id, id);
        }
        for child in &spec.children {
            self.build(id, child);
        }
        id
    }

    fn register_id(&mut self, element_id: &str, id: ElementId) {
        if self.ids.contains_key(element_id) {
            debug!("Duplicate element id ignored: {}", element_id);
            return;
        }
        self.ids.insert(element_id.to_string(), id);
    }

    // =========================================================================
    // Environment control
    // =========================================================================

    /// Scroll the page, clamped to the scrollable range
    pub fn scroll_to(&mut self, y: f32) {
        let max_scroll = (self.nodes[self.root].layout.height - self.viewport.height).max(0.0);
        self.scroll_y = y.clamp(0.0, max_scroll);
    }

    pub fn resize_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.relayout();
        let y = self.scroll_y;
        self.scroll_to(y);
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    /// Change an element's declared layout height (content reflow)
    pub fn set_height(&mut self, element: ElementId, height: f32) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.height = Some(height);
            self.relayout();
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn tag_name(&self, element: ElementId) -> Option<&str> {
        self.nodes.get(element).map(|n| n.tag.as_str())
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.nodes
            .get(element)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn classes(&self, element: ElementId) -> Vec<&str> {
        self.nodes
            .get(element)
            .map(|n| n.classes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.nodes
            .get(element)?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    /// Inline style declarations in insertion order
    pub fn inline_style(&self, element: ElementId) -> Vec<(&str, &str)> {
        self.nodes
            .get(element)
            .map(|n| {
                n.inline_style
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn root_style_property(&self, name: &str) -> Option<&str> {
        self.nodes[self.root].inline(name)
    }

    /// Bounds in document coordinates (ignores scroll, sticky and transforms)
    pub fn layout_bounds(&self, element: ElementId) -> ElementBounds {
        self.nodes
            .get(element)
            .map(|n| n.layout)
            .unwrap_or_default()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Recompute layout for the attached tree
    pub fn relayout(&mut self) {
        let mut taffy: TaffyTree<()> = TaffyTree::new();
        let mut mapping = FxHashMap::default();

        let result = self
            .build_taffy(&mut taffy, self.root, &mut mapping)
            .and_then(|root| {
                taffy.compute_layout(
                    root,
                    Size {
                        width: AvailableSpace::Definite(self.viewport.width),
                        height: AvailableSpace::MaxContent,
                    },
                )
            });

        if let Err(e) = result {
            warn!("Layout failed, keeping previous geometry: {}", e);
            return;
        }

        self.store_layout(&taffy, &mapping, self.root, (0.0, 0.0));
    }

    fn build_taffy(
        &self,
        taffy: &mut TaffyTree<()>,
        id: ElementId,
        mapping: &mut FxHashMap<ElementId, NodeId>,
    ) -> taffy::TaffyResult<NodeId> {
        let node = &self.nodes[id];
        let children = node
            .children
            .iter()
            .map(|&child| self.build_taffy(taffy, child, mapping))
            .collect::<taffy::TaffyResult<Vec<_>>>()?;

        let viewport_width = (id == self.root).then_some(self.viewport.width);
        let taffy_node = taffy.new_with_children(node.layout_style(viewport_width), &children)?;
        mapping.insert(id, taffy_node);
        Ok(taffy_node)
    }

    fn store_layout(
        &mut self,
        taffy: &TaffyTree<()>,
        mapping: &FxHashMap<ElementId, NodeId>,
        id: ElementId,
        parent_offset: (f32, f32),
    ) {
        let Some(layout) = mapping.get(&id).and_then(|&n| taffy.layout(n).ok()) else {
            return;
        };
        let bounds = ElementBounds::new(
            parent_offset.0 + layout.location.x,
            parent_offset.1 + layout.location.y,
            layout.size.width,
            layout.size.height,
        );
        self.nodes[id].layout = bounds;

        let children = self.nodes[id].children.clone();
        for child in children {
            self.store_layout(taffy, mapping, child, (bounds.x, bounds.y));
        }
    }

    /// Vertical displacement from sticky positioning and transforms
    fn visual_shift(&self, id: ElementId) -> f32 {
        let mut shift = 0.0;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            if node.sticky {
                shift += self.sticky_shift(node);
            }
            if let Some(transform) = node.inline("transform") {
                shift += translate_y(transform, node.layout.height);
            }
            current = node.parent;
        }
        shift
    }

    /// How far a sticky element is pushed down to stay at the viewport top
    fn sticky_shift(&self, node: &Node) -> f32 {
        let natural_top = node.layout.y - self.scroll_y;
        let container_bottom = node
            .parent
            .map(|p| self.nodes[p].layout.bottom() - self.scroll_y)
            .unwrap_or(f32::INFINITY);
        let stuck_top = natural_top
            .max(0.0)
            .min(container_bottom - node.layout.height);
        (stuck_top - natural_top).max(0.0)
    }

    fn is_hidden(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            if node.inline("visibility") == Some("hidden") {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// Attached elements in document order
    fn preorder(&self, start: ElementId, out: &mut Vec<ElementId>) {
        out.push(start);
        for &child in &self.nodes[start].children {
            self.preorder(child, out);
        }
    }

    /// Elements in paint order: normal flow first, sticky subtrees on top
    fn paint_order(&self, id: ElementId, flow: &mut Vec<ElementId>, positioned: &mut Vec<ElementId>) {
        if self.nodes[id].sticky && id != self.root {
            self.preorder(id, positioned);
            return;
        }
        flow.push(id);
        for &child in &self.nodes[id].children {
            self.paint_order(child, flow, positioned);
        }
    }

    fn is_attached(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return true;
            }
            current = self.nodes.get(node_id).and_then(|n| n.parent);
        }
        false
    }

    fn is_inclusive_ancestor(&self, ancestor: ElementId, mut node: ElementId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, id: ElementId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    fn text_into(&self, id: ElementId, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(&node.text);
        for &child in &node.children {
            self.text_into(child, out);
        }
    }
}

impl SelectorSubject for MemoryDocument {
    type Node = ElementId;

    fn tag_name(&self, node: ElementId) -> &str {
        &self.nodes[node].tag
    }

    fn element_id(&self, node: ElementId) -> Option<&str> {
        self.attribute(node, "id")
    }

    fn has_class(&self, node: ElementId, class: &str) -> bool {
        self.nodes[node].classes.iter().any(|c| c == class)
    }

    fn attribute(&self, node: ElementId, name: &str) -> Option<&str> {
        MemoryDocument::attribute(self, node, name)
    }

    fn parent_element(&self, node: ElementId) -> Option<ElementId> {
        self.nodes[node].parent
    }
}

impl Document for MemoryDocument {
    type Element = ElementId;

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        let mut all = Vec::with_capacity(self.nodes.len());
        self.preorder(self.root, &mut all);
        Ok(all
            .into_iter()
            .filter(|&id| list.matches(self, id))
            .collect())
    }

    fn query_descendant(
        &self,
        scope: ElementId,
        selector: &str,
    ) -> Result<Option<ElementId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        if !self.nodes.contains_key(scope) {
            return Ok(None);
        }
        let mut all = Vec::new();
        self.preorder(scope, &mut all);
        Ok(all
            .into_iter()
            .skip(1)
            .find(|&id| list.matches(self, id)))
    }

    fn first_by_tag(&self, tag: &str) -> Option<ElementId> {
        let mut all = Vec::with_capacity(self.nodes.len());
        self.preorder(self.root, &mut all);
        all.into_iter()
            .find(|&id| self.nodes[id].tag.eq_ignore_ascii_case(tag))
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.ids
            .get(id)
            .copied()
            .filter(|&element| self.is_attached(element))
    }

    fn text_content(&self, element: ElementId) -> String {
        let mut out = String::new();
        if self.nodes.contains_key(element) {
            self.text_into(element, &mut out);
        }
        out
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.get(element)?.parent
    }

    fn next_element_sibling(&self, element: ElementId) -> Option<ElementId> {
        let parent = self.parent(element)?;
        let siblings = &self.nodes[parent].children;
        let index = siblings.iter().position(|&c| c == element)?;
        siblings.get(index + 1).copied()
    }

    fn is_document_root(&self, element: ElementId) -> bool {
        element == self.root || element == self.body
    }

    fn bounding_rect(&self, element: ElementId) -> ElementBounds {
        if !self.is_attached(element) {
            return ElementBounds::default();
        }
        let node = &self.nodes[element];
        node.layout
            .offset_y(self.visual_shift(element) - self.scroll_y)
    }

    fn offset_height(&self, element: ElementId) -> f32 {
        self.nodes
            .get(element)
            .map(|n| n.layout.height.round())
            .unwrap_or(0.0)
    }

    fn element_from_point(&self, x: f32, y: f32) -> Option<ElementId> {
        if x < 0.0 || y < 0.0 || x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }

        let mut flow = Vec::with_capacity(self.nodes.len());
        let mut positioned = Vec::new();
        self.paint_order(self.root, &mut flow, &mut positioned);

        flow.iter()
            .chain(positioned.iter())
            .rev()
            .copied()
            .find(|&id| {
                id != self.root && !self.is_hidden(id) && self.bounding_rect(id).contains(x, y)
            })
            .or(Some(self.root))
    }

    fn computed_background_color(&self, element: ElementId) -> String {
        let Some(node) = self.nodes.get(element) else {
            return TRANSPARENT_BACKGROUND.to_string();
        };
        node.inline("background-color")
            .map(str::to_string)
            .unwrap_or_else(|| node.background.clone())
    }

    fn computed_opacity(&self, element: ElementId) -> String {
        self.nodes
            .get(element)
            .map(|n| n.opacity.to_string())
            .unwrap_or_else(|| "1".to_string())
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.nodes
            .get(element)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.classes.retain(|c| c != class);
        }
    }

    fn style_property(&self, element: ElementId, name: &str) -> Option<String> {
        self.nodes.get(element)?.inline(name).map(str::to_string)
    }

    fn set_style_property(&mut self, element: ElementId, name: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(element) else {
            return;
        };
        if value.is_empty() {
            node.inline_style.shift_remove(name);
        } else {
            node.inline_style.insert(name.to_string(), value.to_string());
        }
        if LAYOUT_PROPERTIES.contains(&name) {
            self.relayout();
        }
    }

    fn remove_style_property(&mut self, element: ElementId, name: &str) {
        let Some(node) = self.nodes.get_mut(element) else {
            return;
        };
        if node.inline_style.shift_remove(name).is_some() && LAYOUT_PROPERTIES.contains(&name) {
            self.relayout();
        }
    }

    fn set_root_style_property(&mut self, name: &str, value: &str) {
        let root = self.root;
        self.set_style_property(root, name, value);
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "id" => self.register_id(value, element),
            "class" => {
                if let Some(node) = self.nodes.get_mut(element) {
                    node.classes = value.split_whitespace().map(str::to_string).collect();
                }
                return;
            }
            _ => {}
        }
        if let Some(node) = self.nodes.get_mut(element) {
            node.attributes.insert(name, value.to_string());
        }
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        self.nodes.insert(Node::new(tag))
    }

    fn insert_after(&mut self, reference: ElementId, new: ElementId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        if !self.nodes.contains_key(new) || self.is_inclusive_ancestor(new, reference) {
            debug!("Refusing to insert an element next to itself or its descendant");
            return;
        }

        self.detach(new);
        let siblings = &mut self.nodes[parent].children;
        let index = siblings
            .iter()
            .position(|&c| c == reference)
            .map(|i| i + 1)
            .unwrap_or(siblings.len());
        siblings.insert(index, new);
        self.nodes[new].parent = Some(parent);
        self.relayout();
    }
}

// ============================================================================
// Style value helpers
// ============================================================================

/// Parse `12px` / `12` / `-12.5px`
fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse()
        .ok()
}

/// Vertical offset of a `translateY(...)` transform (px or % of own height)
fn translate_y(transform: &str, own_height: f32) -> f32 {
    let Some(inner) = transform
        .trim()
        .strip_prefix("translateY(")
        .and_then(|s| s.strip_suffix(')'))
    else {
        return 0.0;
    };
    let inner = inner.trim();
    if let Some(percent) = inner.strip_suffix('%') {
        return percent
            .trim()
            .parse::<f32>()
            .map(|p| own_height * p / 100.0)
            .unwrap_or(0.0);
    }
    parse_px(inner).unwrap_or(0.0)
}
