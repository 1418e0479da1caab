//! Document abstraction
//!
//! [`Document`] is the seam between the sticky-header engine and whatever
//! hosts the page. It exposes exactly the DOM capabilities the engine reads
//! (queries, geometry, computed colors, hit testing) and the mutations it
//! performs (classes, inline styles, spacer insertion).
//!
//! Geometry follows the CSSOM conventions: [`Document::bounding_rect`] is
//! relative to the viewport, [`Document::offset_height`] is a whole number of
//! pixels.

use serde::Deserialize;

use crate::error::SelectorError;

/// Document loading state, mirroring `document.readyState`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadyState {
    /// Still parsing; deferred initialization waits for the ready notification
    Loading,
    /// Parsed, subresources may still be loading
    Interactive,
    /// Fully loaded
    #[default]
    Complete,
}

impl ReadyState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ReadyState::Loading)
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Rendered bounds of an element
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Half-open containment test (right and bottom edges excluded)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.bottom()
    }

    /// Translate vertically
    pub fn offset_y(mut self, dy: f32) -> Self {
        self.y += dy;
        self
    }

    /// Non-zero rendered area
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// DOM capabilities used by the sticky-header engine
pub trait Document {
    /// Element handle; cheap to copy and stable for the page lifetime
    type Element: Copy + Eq + std::hash::Hash + std::fmt::Debug;

    // =========================================================================
    // Lifecycle & environment
    // =========================================================================

    fn ready_state(&self) -> ReadyState;

    /// Current vertical scroll offset of the page
    fn scroll_y(&self) -> f32;

    fn viewport(&self) -> Viewport;

    /// `(prefers-reduced-motion: reduce)`
    fn prefers_reduced_motion(&self) -> bool;

    // =========================================================================
    // Queries
    // =========================================================================

    /// All matches in document order
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, SelectorError>;

    /// First descendant of `scope` (excluding `scope`) matching `selector`
    fn query_descendant(
        &self,
        scope: Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>, SelectorError>;

    /// First element with the given tag name in document order
    fn first_by_tag(&self, tag: &str) -> Option<Self::Element>;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn text_content(&self, element: Self::Element) -> String;

    // =========================================================================
    // Tree
    // =========================================================================

    /// Parent element (`parentElement`)
    fn parent(&self, element: Self::Element) -> Option<Self::Element>;

    /// `nextElementSibling`
    fn next_element_sibling(&self, element: Self::Element) -> Option<Self::Element>;

    /// True for the document element and the body
    fn is_document_root(&self, element: Self::Element) -> bool;

    // =========================================================================
    // Geometry & hit testing
    // =========================================================================

    /// Bounds relative to the viewport (`getBoundingClientRect`)
    fn bounding_rect(&self, element: Self::Element) -> ElementBounds;

    /// Layout height rounded to whole pixels (`offsetHeight`)
    fn offset_height(&self, element: Self::Element) -> f32;

    /// Topmost hit-testable element at a viewport point (`elementFromPoint`)
    fn element_from_point(&self, x: f32, y: f32) -> Option<Self::Element>;

    // =========================================================================
    // Computed style
    // =========================================================================

    /// Computed `background-color` as the host reports it
    fn computed_background_color(&self, element: Self::Element) -> String;

    /// Computed `opacity` as the host reports it
    fn computed_opacity(&self, element: Self::Element) -> String;

    // =========================================================================
    // Mutation
    // =========================================================================

    fn has_class(&self, element: Self::Element, class: &str) -> bool;
    fn add_class(&mut self, element: Self::Element, class: &str);
    fn remove_class(&mut self, element: Self::Element, class: &str);

    /// Inline style property (including custom properties)
    fn style_property(&self, element: Self::Element, name: &str) -> Option<String>;
    fn set_style_property(&mut self, element: Self::Element, name: &str, value: &str);
    fn remove_style_property(&mut self, element: Self::Element, name: &str);

    /// Inline style property on the document element
    fn set_root_style_property(&mut self, name: &str, value: &str);

    fn set_attribute(&mut self, element: Self::Element, name: &str, value: &str);

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> Self::Element;

    /// Insert `new` right after `reference` in the same parent
    ///
    /// Appends when `reference` is the last child. Does nothing when
    /// `reference` has no parent.
    fn insert_after(&mut self, reference: Self::Element, new: Self::Element);

    // =========================================================================
    // Provided
    // =========================================================================

    fn add_classes(&mut self, element: Self::Element, classes: &[&str]) {
        for class in classes {
            self.add_class(element, class);
        }
    }

    fn remove_classes(&mut self, element: Self::Element, classes: &[&str]) {
        for class in classes {
            self.remove_class(element, class);
        }
    }

    /// Non-zero rendered width and height
    fn is_visible(&self, element: Self::Element) -> bool {
        self.bounding_rect(element).has_area()
    }
}

/// Format a pixel length the way style strings expect (`80px`, `0px`)
pub fn px(value: f32) -> String {
    format!("{}px", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains_half_open() {
        let bounds = ElementBounds::new(0.0, 10.0, 100.0, 50.0);
        assert!(bounds.contains(0.0, 10.0));
        assert!(bounds.contains(99.9, 59.9));
        assert!(!bounds.contains(100.0, 30.0));
        assert!(!bounds.contains(50.0, 60.0));
        assert_eq!(bounds.bottom(), 60.0);
        assert_eq!(bounds.center_x(), 50.0);
    }

    #[test]
    fn test_px_formatting() {
        assert_eq!(px(80.0), "80px");
        assert_eq!(px(0.0), "0px");
        assert_eq!(px(12.5), "12.5px");
    }

    #[test]
    fn test_ready_state_default() {
        assert_eq!(ReadyState::default(), ReadyState::Complete);
        assert!(ReadyState::Loading.is_loading());
    }
}
