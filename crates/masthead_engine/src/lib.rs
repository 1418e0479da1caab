//! Masthead Sticky Header Engine
//!
//! Runtime behavior for a sticky site header: once enabled it marks the
//! header as pinned, manages its background and text contrast, hides it on
//! scroll down and reveals it on scroll up, and compensates the layout shift
//! of the content that follows it.
//!
//! The engine is purely reactive. A host ([`NotificationSource`]) owns the
//! page and delivers [`Notification`]s; every side effect is a mutation on
//! the [`masthead_dom::Document`].
//!
//! # Example
//!
//! ```rust
//! use masthead_dom::prelude::*;
//! use masthead_engine::prelude::*;
//! use serde_json::json;
//!
//! let mut doc = MemoryDocument::new(Viewport::new(1200.0, 800.0));
//! doc.append_to_body(el("header").height(80.0));
//! doc.append_to_body(el("main").height(4000.0));
//!
//! let config = json!({ "enabled": true, "hide_on_scroll_down": true, "hide_delay_ms": 0 });
//! let mut engine = Engine::install(&mut doc, Some(&config), HostCapabilities::default());
//!
//! doc.scroll_to(300.0);
//! engine.handle(&mut doc, Notification::Scroll, std::time::Duration::ZERO);
//! assert!(engine.coordinator().unwrap().is_hidden());
//! ```

pub mod bootstrap;
pub mod chameleon;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod hide_reveal;
pub mod host;
pub mod locator;
pub mod presentation;
pub mod reflow;

pub use bootstrap::{Engine, InertReason};
pub use chameleon::{is_section_like, outermost_section_color, sample_below, TextContrast};
pub use config::{resolve_configuration, BackgroundStyle, Configuration, RawConfig};
pub use coordinator::Coordinator;
pub use error::ConfigError;
pub use hide_reveal::{HideAction, HidePolicy, ScrollTracker};
pub use host::{HostCapabilities, Notification, NotificationSource, Script, ScriptedHost, Step, Tick};
pub use locator::locate_header;
pub use presentation::{classes, vars, HeaderEvent, HeaderState, Presentation};
pub use reflow::Reflow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bootstrap::{Engine, InertReason};
    pub use crate::config::{BackgroundStyle, Configuration};
    pub use crate::coordinator::Coordinator;
    pub use crate::error::ConfigError;
    pub use crate::host::{HostCapabilities, Notification, NotificationSource, Script, ScriptedHost, Step};
    pub use crate::presentation::{classes, vars};
}
