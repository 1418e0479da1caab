//! Masthead Document Model
//!
//! The page-side half of Masthead: a [`Document`] trait describing the DOM
//! capabilities a sticky-header engine needs, plus the pieces every host
//! shares.
//!
//! # Modules
//!
//! - [`document`]: the [`Document`] trait, geometry and lifecycle types
//! - [`selector`]: CSS selector lists (type, class, id, attribute, descendant
//!   and child combinators)
//! - [`color`]: computed-style color parsing and formatting
//! - [`memory`]: [`MemoryDocument`], an in-memory page laid out with Taffy
//!
//! # Example
//!
//! ```rust
//! use masthead_dom::prelude::*;
//!
//! let mut doc = MemoryDocument::new(Viewport::new(800.0, 600.0));
//! doc.append_to_body(el("header").class("site-header").height(64.0));
//!
//! let headers = doc.query_selector_all("body > header.site-header").unwrap();
//! assert_eq!(headers.len(), 1);
//! assert_eq!(doc.offset_height(headers[0]), 64.0);
//! ```

pub mod color;
pub mod document;
pub mod error;
pub mod memory;
pub mod selector;

pub use color::Rgba;
pub use document::{px, Document, ElementBounds, ReadyState, Viewport};
pub use error::{ColorError, Result, SelectorError};
pub use memory::{el, ElementId, ElementSpec, MemoryDocument, PageSpec};
pub use selector::{split_selector_list, SelectorList, SelectorSubject};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::Rgba;
    pub use crate::document::{px, Document, ElementBounds, ReadyState, Viewport};
    pub use crate::error::{ColorError, SelectorError};
    pub use crate::memory::{el, ElementId, ElementSpec, MemoryDocument, PageSpec};
}
