//! Visual state machine
//!
//! The managed header is either `Inactive` (left exactly as the page styled
//! it, apart from the stable [`classes::HEADER`] marker) or `Active` (the
//! enhancement is on: pinned marker, style variables and background
//! treatment applied). While active it can additionally be hidden, which
//! slides it out with a `translateY(-100%)` transform.
//!
//! The style sheet owns the actual look; this module only toggles the
//! classes and custom properties it keys on.

use masthead_dom::{px, Document, Rgba};
use tracing::debug;

use crate::chameleon::TextContrast;
use crate::config::{BackgroundStyle, Configuration};

/// Class markers applied to the header and spacer
pub mod classes {
    /// Stable marker on the managed header
    pub const HEADER: &str = "bsh-header";
    /// Enhancement active
    pub const STUCK: &str = "bsh-stuck";
    /// Slid out of view
    pub const HIDDEN: &str = "bsh-hidden";
    pub const HAS_BG: &str = "bsh-has-bg";
    pub const CUSTOM_BG: &str = "bsh-custom-bg";
    pub const BLUR: &str = "bsh-blur";
    pub const CHAMELEON: &str = "bsh-chameleon";
    pub const SOLID: &str = "bsh-solid";
    /// Push-mode spacer element
    pub const CONTENT_SPACER: &str = "bsh-content-spacer";

    /// Everything removed when the header goes inactive
    pub const ACTIVE_MARKERS: &[&str] = &[STUCK, HIDDEN, HAS_BG, CUSTOM_BG, BLUR, CHAMELEON, SOLID];
}

/// Custom properties written as inline styles
pub mod vars {
    pub const TOP: &str = "--bsh-top";
    pub const Z_INDEX: &str = "--bsh-z-index";
    pub const TRANSITION_DURATION: &str = "--bsh-transition-duration";
    pub const BG: &str = "--bsh-bg";
    pub const BLUR_PX: &str = "--bsh-blur-px";
    pub const TEXT_COLOR: &str = "--bsh-text-color";
    /// Set on the document element in overlay mode
    pub const HEADER_HEIGHT: &str = "--bsh-header-height";

    /// Header variables cleared when the header goes inactive
    pub const HEADER_VARS: &[&str] = &[TOP, Z_INDEX, TRANSITION_DURATION, BG, BLUR_PX, TEXT_COLOR];
}

/// Id of the admin toolbar the header is offset below
pub const ADMIN_BAR_ID: &str = "wpadminbar";

const HIDDEN_TRANSFORM: &str = "translateY(-100%)";

/// Activation state of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeaderState {
    #[default]
    Inactive,
    Active,
}

/// Inputs to the activation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderEvent {
    /// Activation predicate holds
    Enable,
    /// Activation predicate fails
    Disable,
}

impl HeaderState {
    /// Handle an event and return the new state, or None if no transition
    pub fn on_event(&self, event: HeaderEvent) -> Option<Self> {
        match (self, event) {
            (HeaderState::Inactive, HeaderEvent::Enable) => Some(HeaderState::Active),
            (HeaderState::Active, HeaderEvent::Disable) => Some(HeaderState::Inactive),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, HeaderState::Active)
    }
}

/// Activation predicate: off only when mobile is disabled and the viewport is
/// at or below the breakpoint
pub fn should_run(config: &Configuration, viewport_width: f32) -> bool {
    !(config.disable_mobile && viewport_width <= config.mobile_breakpoint_px)
}

/// Height of a visible admin toolbar, when the header is offset below it
pub fn admin_bar_height<D: Document>(doc: &D, config: &Configuration) -> f32 {
    if !config.admin_bar_offset {
        return 0.0;
    }
    doc.element_by_id(ADMIN_BAR_ID)
        .filter(|&bar| doc.is_visible(bar))
        .map(|bar| doc.offset_height(bar))
        .unwrap_or(0.0)
}

/// Presentation of the managed header
#[derive(Debug)]
pub struct Presentation<E> {
    header: E,
    state: HeaderState,
    hidden: bool,
}

impl<E: Copy> Presentation<E> {
    /// Take over `header`, marking it with [`classes::HEADER`]
    pub fn new<D: Document<Element = E>>(doc: &mut D, header: E) -> Self {
        doc.add_class(header, classes::HEADER);
        Self {
            header,
            state: HeaderState::Inactive,
            hidden: false,
        }
    }

    pub fn header(&self) -> E {
        self.header
    }

    pub fn state(&self) -> HeaderState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Re-evaluate the activation predicate and apply any transition
    ///
    /// Returns whether the header is active afterwards.
    pub fn sync<D: Document<Element = E>>(&mut self, doc: &mut D, config: &Configuration) -> bool {
        let event = if should_run(config, doc.viewport().width) {
            HeaderEvent::Enable
        } else {
            HeaderEvent::Disable
        };

        if let Some(next) = self.state.on_event(event) {
            debug!("Header state {:?} -> {:?}", self.state, next);
            match next {
                HeaderState::Active => self.enter_active(doc, config),
                HeaderState::Inactive => self.enter_inactive(doc),
            }
            self.state = next;
        }
        self.is_active()
    }

    fn enter_active<D: Document<Element = E>>(&mut self, doc: &mut D, config: &Configuration) {
        let header = self.header;
        let transition = if config.reduced_motion {
            0.0
        } else {
            config.transition_speed_ms
        };

        doc.add_class(header, classes::STUCK);
        doc.set_style_property(header, vars::TOP, &px(admin_bar_height(doc, config)));
        doc.set_style_property(header, vars::Z_INDEX, &config.z_index.to_string());
        doc.set_style_property(header, vars::TRANSITION_DURATION, &format!("{}ms", transition));

        let style = config.background_style;
        if matches!(style, BackgroundStyle::Solid | BackgroundStyle::Blur) {
            if let Some(color) = config.sticky_bg_color {
                let background = color.with_alpha(config.sticky_bg_opacity);
                doc.set_style_property(header, vars::BG, &background.to_css());
            }
        }

        match style {
            BackgroundStyle::None => {}
            BackgroundStyle::Solid => {
                doc.add_classes(header, &[classes::HAS_BG, classes::CUSTOM_BG, classes::SOLID]);
            }
            BackgroundStyle::Blur => {
                if !config.reduced_motion {
                    doc.add_classes(header, &[classes::HAS_BG, classes::BLUR]);
                    doc.set_style_property(
                        header,
                        vars::BLUR_PX,
                        &format!("{}px", config.blur_amount_px),
                    );
                }
            }
            BackgroundStyle::Chameleon => {
                doc.add_classes(header, &[classes::HAS_BG, classes::CUSTOM_BG, classes::CHAMELEON]);
            }
        }
    }

    fn enter_inactive<D: Document<Element = E>>(&mut self, doc: &mut D) {
        let header = self.header;
        doc.remove_classes(header, classes::ACTIVE_MARKERS);
        for name in vars::HEADER_VARS {
            doc.remove_style_property(header, name);
        }
        doc.remove_style_property(header, "transform");
        self.hidden = false;
    }

    /// Set the hidden sub-state; ignored (forced false) while inactive
    pub fn set_hidden<D: Document<Element = E>>(&mut self, doc: &mut D, hidden: bool) {
        let hidden = hidden && self.is_active();
        if hidden {
            doc.add_class(self.header, classes::HIDDEN);
            doc.set_style_property(self.header, "transform", HIDDEN_TRANSFORM);
        } else {
            doc.remove_class(self.header, classes::HIDDEN);
            doc.remove_style_property(self.header, "transform");
        }
        if hidden != self.hidden {
            debug!("Header {}", if hidden { "hidden" } else { "revealed" });
        }
        self.hidden = hidden;
    }

    /// Apply a chameleon sample: tinted background plus contrasting text,
    /// or a transparent background when nothing was sampled
    pub fn apply_background_sample<D: Document<Element = E>>(
        &self,
        doc: &mut D,
        config: &Configuration,
        sample: Option<Rgba>,
    ) {
        match sample {
            Some(color) => {
                let background = Rgba::rgb(color.r, color.g, color.b).with_alpha(config.sticky_bg_opacity);
                let contrast = TextContrast::for_color(&color);
                doc.set_style_property(self.header, vars::BG, &background.to_css());
                doc.set_style_property(self.header, vars::TEXT_COLOR, contrast.as_css());
            }
            None => {
                doc.set_style_property(self.header, vars::BG, &Rgba::TRANSPARENT.to_css());
                doc.remove_style_property(self.header, vars::TEXT_COLOR);
            }
        }
    }
}
