//! Layout reflow compensation
//!
//! A pinned header stops taking part in the flow it was laid out in, so the
//! content after it would jump. Two compensations are available: a spacer
//! inserted after the header (push mode), or a negative top margin on the
//! next sibling so content slides underneath (overlay mode). Overlay wins
//! when both are configured.

use masthead_dom::{px, Document};
use tracing::debug;

use crate::config::Configuration;
use crate::presentation::{classes, vars};

/// Installed reflow compensation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reflow<E> {
    /// No compensation
    None,
    /// Spacer element sized to the header while active
    Push { spacer: E },
    /// Next sibling pulled up under the header (may be missing)
    Overlay { target: Option<E> },
}

impl<E: Copy> Reflow<E> {
    /// Choose and install the compensation for `header`
    pub fn install<D: Document<Element = E>>(doc: &mut D, header: E, config: &Configuration) -> Self {
        if config.overlay_content {
            let target = doc.next_element_sibling(header);
            debug!("Overlay reflow installed (target present: {})", target.is_some());
            return Reflow::Overlay { target };
        }

        if config.push_content_down {
            let spacer = doc.create_element("div");
            doc.add_class(spacer, classes::CONTENT_SPACER);
            doc.set_attribute(spacer, "aria-hidden", "true");
            doc.insert_after(header, spacer);
            debug!("Spacer reflow installed");
            return Reflow::Push { spacer };
        }

        Reflow::None
    }

    /// Resize the compensation to the header's current height
    pub fn sync<D: Document<Element = E>>(&self, doc: &mut D, header: E, active: bool) {
        match *self {
            Reflow::None => {}
            Reflow::Push { spacer } => {
                let height = if active { doc.offset_height(header) } else { 0.0 };
                doc.set_style_property(spacer, "height", &px(height));
            }
            Reflow::Overlay { target } => {
                if !active {
                    doc.set_root_style_property(vars::HEADER_HEIGHT, &px(0.0));
                    if let Some(target) = target {
                        doc.remove_style_property(target, "margin-top");
                    }
                    return;
                }
                let height = doc.offset_height(header);
                doc.set_root_style_property(vars::HEADER_HEIGHT, &px(height));
                if let Some(target) = target {
                    doc.set_style_property(target, "margin-top", &format!("-{}px", height));
                }
            }
        }
    }

    pub fn spacer(&self) -> Option<E> {
        match *self {
            Reflow::Push { spacer } => Some(spacer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masthead_dom::prelude::*;

    fn page() -> (MemoryDocument, ElementId, ElementId) {
        let mut doc = MemoryDocument::new(Viewport::new(1000.0, 800.0));
        let header = doc.append_to_body(el("header").height(72.0));
        let main = doc.append_to_body(el("main").height(2000.0));
        (doc, header, main)
    }

    #[test]
    fn test_push_spacer_tracks_header() {
        let (mut doc, header, main) = page();
        let config = Configuration {
            push_content_down: true,
            ..Default::default()
        };
        let reflow = Reflow::install(&mut doc, header, &config);
        let spacer = reflow.spacer().unwrap();

        assert_eq!(doc.next_element_sibling(header), Some(spacer));
        assert_eq!(doc.next_element_sibling(spacer), Some(main));
        assert!(doc.has_class(spacer, classes::CONTENT_SPACER));
        assert_eq!(doc.attribute(spacer, "aria-hidden"), Some("true"));

        reflow.sync(&mut doc, header, true);
        assert_eq!(doc.offset_height(spacer), 72.0);
        reflow.sync(&mut doc, header, false);
        assert_eq!(doc.offset_height(spacer), 0.0);
    }

    #[test]
    fn test_spacer_appended_after_last_child() {
        let mut doc = MemoryDocument::default();
        let wrapper = doc.append_to_body(el("div").child(el("header").id("h").height(50.0)));
        let header = doc.element_by_id("h").unwrap();
        let config = Configuration {
            push_content_down: true,
            ..Default::default()
        };
        let reflow = Reflow::install(&mut doc, header, &config);
        assert_eq!(doc.children(wrapper), &[header, reflow.spacer().unwrap()]);
    }

    #[test]
    fn test_overlay_margin() {
        let (mut doc, header, main) = page();
        let config = Configuration {
            overlay_content: true,
            push_content_down: true,
            ..Default::default()
        };
        let reflow = Reflow::install(&mut doc, header, &config);
        assert_eq!(reflow, Reflow::Overlay { target: Some(main) });

        reflow.sync(&mut doc, header, true);
        assert_eq!(doc.style_property(main, "margin-top").as_deref(), Some("-72px"));
        assert_eq!(doc.root_style_property(vars::HEADER_HEIGHT), Some("72px"));
        assert_eq!(doc.layout_bounds(main).y, 0.0);

        reflow.sync(&mut doc, header, false);
        assert_eq!(doc.style_property(main, "margin-top"), None);
        assert_eq!(doc.root_style_property(vars::HEADER_HEIGHT), Some("0px"));
    }

    #[test]
    fn test_no_compensation() {
        let (mut doc, header, main) = page();
        let reflow = Reflow::install(&mut doc, header, &Configuration::default());
        assert_eq!(reflow, Reflow::None);
        reflow.sync(&mut doc, header, true);
        assert_eq!(doc.next_element_sibling(header), Some(main));
        assert_eq!(doc.style_property(main, "margin-top"), None);
    }
}
