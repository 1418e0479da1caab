//! Notification hosts
//!
//! A host owns the document and tells the engine when something happened:
//! the document became ready, the page scrolled or resized, the header
//! changed size, or time passed. [`NotificationSource`] is the abstraction;
//! [`ScriptedHost`] replays a recorded script against a [`MemoryDocument`]
//! and is what tests and the command line drive.

use std::collections::VecDeque;
use std::time::Duration;

use masthead_dom::{Document, MemoryDocument, ReadyState, Viewport};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::presentation::classes;

/// Something the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// Document finished parsing
    Ready,
    /// Page scroll offset changed
    Scroll,
    /// Viewport size changed
    Resize,
    /// Header element changed size (size observer)
    HeaderResized,
    /// Time advanced; pending timers may be due
    TimerElapsed,
}

/// Which notifications a host can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Host observes element size changes and delivers
    /// [`Notification::HeaderResized`]
    pub size_observer: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            size_observer: true,
        }
    }
}

/// One host turn: the environment changed and maybe a notification fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Delivered notification; `None` when the host could not observe the change
    pub notification: Option<Notification>,
    /// Monotonic host time
    pub now: Duration,
}

/// Source of notifications for an engine
pub trait NotificationSource {
    type Document: Document;

    fn capabilities(&self) -> HostCapabilities;

    fn document(&self) -> &Self::Document;

    fn document_mut(&mut self) -> &mut Self::Document;

    /// Current monotonic time
    fn now(&self) -> Duration;

    /// Advance the host by one turn; `None` when it has nothing left
    fn next_tick(&mut self) -> Option<Tick>;
}

// ============================================================================
// Scripted host
// ============================================================================

/// One scripted change to the environment
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Finish loading the document
    Ready,
    /// Scroll the page to an offset
    ScrollTo { y: f32 },
    /// Resize the viewport
    ResizeViewport { width: f32, height: f32 },
    /// Change the managed header's height
    ResizeHeader { height: f32 },
    /// Let time pass
    Wait { ms: u64 },
}

/// A replayable script
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default = "default_size_observer")]
    pub size_observer: bool,
    pub steps: Vec<Step>,
}

fn default_size_observer() -> bool {
    true
}

impl Script {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            size_observer: true,
            steps,
        }
    }
}

/// Host that replays a [`Script`] against an in-memory page
#[derive(Debug)]
pub struct ScriptedHost {
    doc: MemoryDocument,
    steps: VecDeque<Step>,
    clock: Duration,
    capabilities: HostCapabilities,
    last_step: Option<Step>,
}

impl ScriptedHost {
    pub fn new(doc: MemoryDocument, script: Script) -> Self {
        Self {
            doc,
            steps: script.steps.into(),
            clock: Duration::ZERO,
            capabilities: HostCapabilities {
                size_observer: script.size_observer,
            },
            last_step: None,
        }
    }

    /// Step applied by the most recent [`NotificationSource::next_tick`]
    pub fn last_step(&self) -> Option<&Step> {
        self.last_step.as_ref()
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    pub fn into_document(self) -> MemoryDocument {
        self.doc
    }

    fn apply(&mut self, step: &Step) -> Option<Notification> {
        match *step {
            Step::Ready => {
                if self.doc.ready_state().is_loading() {
                    self.doc.set_ready_state(ReadyState::Interactive);
                }
                Some(Notification::Ready)
            }
            Step::ScrollTo { y } => {
                self.doc.scroll_to(y);
                Some(Notification::Scroll)
            }
            Step::ResizeViewport { width, height } => {
                self.doc.resize_viewport(Viewport::new(width, height));
                Some(Notification::Resize)
            }
            Step::ResizeHeader { height } => {
                let header = match self.doc.query_selector_all(&format!(".{}", classes::HEADER)) {
                    Ok(found) => found.first().copied(),
                    Err(e) => {
                        debug!("Header lookup failed: {}", e);
                        None
                    }
                };
                let Some(header) = header else {
                    debug!("No managed header to resize");
                    return None;
                };
                self.doc.set_height(header, height);
                self.capabilities
                    .size_observer
                    .then_some(Notification::HeaderResized)
            }
            Step::Wait { ms } => {
                self.clock += Duration::from_millis(ms);
                Some(Notification::TimerElapsed)
            }
        }
    }
}

impl NotificationSource for ScriptedHost {
    type Document = MemoryDocument;

    fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    fn document(&self) -> &MemoryDocument {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut MemoryDocument {
        &mut self.doc
    }

    fn now(&self) -> Duration {
        self.clock
    }

    fn next_tick(&mut self) -> Option<Tick> {
        let step = self.steps.pop_front()?;
        let notification = self.apply(&step);
        trace!("Step {:?} -> {:?}", step, notification);
        self.last_step = Some(step);
        Some(Tick {
            notification,
            now: self.clock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masthead_dom::prelude::*;

    fn host(size_observer: bool, steps: Vec<Step>) -> ScriptedHost {
        let mut doc = MemoryDocument::new(Viewport::new(1000.0, 600.0));
        doc.append_to_body(el("header").class(classes::HEADER).height(80.0));
        doc.append_to_body(el("main").height(3000.0));
        doc.set_ready_state(ReadyState::Loading);
        ScriptedHost::new(doc, Script { size_observer, steps })
    }

    #[test]
    fn test_steps_map_to_notifications() {
        let mut host = host(
            true,
            vec![
                Step::Ready,
                Step::ScrollTo { y: 120.0 },
                Step::Wait { ms: 250 },
                Step::ResizeViewport {
                    width: 500.0,
                    height: 600.0,
                },
                Step::ResizeHeader { height: 60.0 },
            ],
        );

        let tick = host.next_tick().unwrap();
        assert_eq!(tick.notification, Some(Notification::Ready));
        assert!(!host.document().ready_state().is_loading());

        assert_eq!(host.next_tick().unwrap().notification, Some(Notification::Scroll));
        assert_eq!(host.document().scroll_y(), 120.0);

        let tick = host.next_tick().unwrap();
        assert_eq!(tick.notification, Some(Notification::TimerElapsed));
        assert_eq!(tick.now, Duration::from_millis(250));

        assert_eq!(host.next_tick().unwrap().notification, Some(Notification::Resize));
        assert_eq!(host.document().viewport().width, 500.0);

        assert_eq!(
            host.next_tick().unwrap().notification,
            Some(Notification::HeaderResized)
        );
        assert_eq!(host.last_step(), Some(&Step::ResizeHeader { height: 60.0 }));
        assert!(host.next_tick().is_none());
    }

    #[test]
    fn test_header_resize_unobserved_without_size_observer() {
        let mut host = host(false, vec![Step::ResizeHeader { height: 40.0 }]);
        let tick = host.next_tick().unwrap();
        assert_eq!(tick.notification, None);

        let header = host.document().first_by_tag("header").unwrap();
        assert_eq!(host.document().offset_height(header), 40.0);
    }

    #[test]
    fn test_script_from_json() {
        let script: Script = serde_json::from_str(
            r#"{ "steps": [
                { "kind": "scroll_to", "y": 40 },
                { "kind": "resize_viewport", "width": 700, "height": 900 },
                { "kind": "wait", "ms": 100 },
                { "kind": "ready" }
            ] }"#,
        )
        .unwrap();
        assert!(script.size_observer);
        assert_eq!(script.steps[0], Step::ScrollTo { y: 40.0 });
        assert_eq!(script.steps[2], Step::Wait { ms: 100 });
        assert_eq!(script.steps.len(), 4);
    }
}
