//! Chameleon background sampling
//!
//! Finds the color of the section currently scrolling under the header. The
//! header is made invisible to hit testing, the topmost element just below
//! it is resolved, and the tree is walked upward collecting opaque
//! backgrounds. Page-level containers (taller than 1.5 viewports) are
//! skipped, and the outermost qualifying section wins. Cover blocks read
//! their dedicated overlay layer, whose color and opacity override the
//! block's own background.

use masthead_dom::{Document, Rgba};
use tracing::trace;

/// Class of a cover composite
pub const COVER_CLASS: &str = "wp-block-cover";

/// Overlay layers of a cover composite
pub const COVER_OVERLAY_SELECTOR: &str =
    ".wp-block-cover__background, .wp-block-cover__gradient-background";

/// Distance below the header's bottom edge that is probed
pub const PROBE_OFFSET_PX: f32 = 2.0;

/// Ancestors at least this many viewports tall are page containers
pub const SECTION_HEIGHT_FACTOR: f32 = 1.5;

/// Text color that contrasts with a background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextContrast {
    Black,
    White,
}

impl TextContrast {
    /// Black on light backgrounds (luminance above 0.5), white otherwise
    pub fn for_luminance(luminance: f32) -> Self {
        if luminance > 0.5 {
            TextContrast::Black
        } else {
            TextContrast::White
        }
    }

    pub fn for_color(color: &Rgba) -> Self {
        Self::for_luminance(color.luminance())
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            TextContrast::Black => "#000000",
            TextContrast::White => "#ffffff",
        }
    }
}

/// Horizontal center of the header, just below its bottom edge
pub fn probe_point<D: Document>(doc: &D, header: D::Element) -> (f32, f32) {
    let rect = doc.bounding_rect(header);
    (rect.center_x(), rect.bottom() + PROBE_OFFSET_PX)
}

/// Elements shorter than 1.5 viewports count as sections
pub fn is_section_like(height: f32, viewport_height: f32) -> bool {
    height < viewport_height * SECTION_HEIGHT_FACTOR
}

/// Sample the background color of the content under the header
///
/// The header's inline `visibility` is restored before returning.
pub fn sample_below<D: Document>(doc: &mut D, header: D::Element) -> Option<Rgba> {
    let (x, y) = probe_point(doc, header);

    let previous = doc.style_property(header, "visibility");
    doc.set_style_property(header, "visibility", "hidden");
    let hit = doc.element_from_point(x, y);
    match previous {
        Some(value) => doc.set_style_property(header, "visibility", &value),
        None => doc.remove_style_property(header, "visibility"),
    }

    let sample = hit.and_then(|element| outermost_section_color(doc, element));
    trace!("Chameleon probe at ({}, {}): {:?}", x, y, sample);
    sample
}

/// Walk up from `start` and return the outermost section background
///
/// Stops before the document element and body.
pub fn outermost_section_color<D: Document>(doc: &D, start: D::Element) -> Option<Rgba> {
    let viewport_height = doc.viewport().height;
    let mut candidate = None;
    let mut node = Some(start);

    while let Some(current) = node.filter(|&n| !doc.is_document_root(n)) {
        if is_section_like(doc.offset_height(current), viewport_height) {
            if let Some(color) = opaque_background(doc, current) {
                candidate = Some(color);
            }
            if doc.has_class(current, COVER_CLASS) {
                if let Some(overlay) = cover_overlay_color(doc, current) {
                    candidate = Some(overlay);
                }
            }
        }

        node = doc.parent(current);
    }

    candidate
}

fn opaque_background<D: Document>(doc: &D, element: D::Element) -> Option<Rgba> {
    let computed = doc.computed_background_color(element);
    match Rgba::parse(&computed) {
        Ok(color) if !color.is_transparent() => Some(color),
        Ok(_) => None,
        Err(e) => {
            trace!("Unreadable background {:?}: {}", computed, e);
            None
        }
    }
}

/// Overlay color of a cover block, carrying the overlay's opacity as alpha
fn cover_overlay_color<D: Document>(doc: &D, cover: D::Element) -> Option<Rgba> {
    let overlay = doc.query_descendant(cover, COVER_OVERLAY_SELECTOR).ok()??;
    let color = opaque_background(doc, overlay)?;
    let opacity = doc
        .computed_opacity(overlay)
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|o| !o.is_nan())
        .unwrap_or(1.0);
    Some(Rgba::rgb(color.r, color.g, color.b).with_alpha(opacity))
}
