//! Event coordinator
//!
//! Owns every piece of mutable engine state for one header and drives the
//! components in a fixed order on each notification:
//!
//! 1. fire a due hide timer
//! 2. re-evaluate activation (visual state machine)
//! 3. while active: hide/reveal policy, then chameleon sampling
//! 4. reflow compensation
//!
//! Handlers are plain methods so tests can call them directly; hosts
//! usually go through [`Coordinator::handle`].

use std::time::Duration;

use masthead_dom::Document;
use tracing::{debug, trace};

use crate::chameleon::sample_below;
use crate::config::{BackgroundStyle, Configuration};
use crate::hide_reveal::{HideAction, HidePolicy, ScrollTracker};
use crate::host::{HostCapabilities, Notification};
use crate::presentation::Presentation;
use crate::reflow::Reflow;

/// Runtime state of an installed sticky header
#[derive(Debug)]
pub struct Coordinator<E> {
    config: Configuration,
    presentation: Presentation<E>,
    reflow: Reflow<E>,
    tracker: ScrollTracker,
    hide_policy: Option<HidePolicy>,
    capabilities: HostCapabilities,
}

impl<E: Copy> Coordinator<E> {
    /// Take over `header` and bring it in line with the current page
    pub fn install<D: Document<Element = E>>(
        doc: &mut D,
        header: E,
        config: Configuration,
        capabilities: HostCapabilities,
    ) -> Self {
        let presentation = Presentation::new(doc, header);
        let reflow = Reflow::install(doc, header, &config);
        if !capabilities.size_observer {
            debug!("No size observer; reflow follows scroll and resize only");
        }

        let mut coordinator = Self {
            hide_policy: HidePolicy::from_config(&config),
            tracker: ScrollTracker::new(doc.scroll_y()),
            config,
            presentation,
            reflow,
            capabilities,
        };

        let active = coordinator.presentation.sync(doc, &coordinator.config);
        if active {
            let hidden = coordinator.presentation.is_hidden();
            coordinator.presentation.set_hidden(doc, hidden);
            coordinator.update_chameleon(doc);
        }
        coordinator.sync_reflow(doc);
        coordinator
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// Dispatch a host notification
    pub fn handle<D: Document<Element = E>>(
        &mut self,
        doc: &mut D,
        notification: Notification,
        now: Duration,
    ) {
        trace!("Notification {:?} at {:?}", notification, now);
        match notification {
            Notification::Ready => self.fire_due(doc, now),
            Notification::Scroll => self.on_scroll(doc, now),
            Notification::Resize => self.on_resize(doc, now),
            Notification::HeaderResized => self.on_header_resized(doc, now),
            Notification::TimerElapsed => self.on_timer(doc, now),
        }
    }

    pub fn on_scroll<D: Document<Element = E>>(&mut self, doc: &mut D, now: Duration) {
        self.fire_due(doc, now);

        if self.presentation.sync(doc, &self.config) {
            self.update_hide_reveal(doc, now);
            self.update_chameleon(doc);
        } else {
            self.tracker.record(doc.scroll_y());
            self.tracker.cancel();
        }
        self.sync_reflow(doc);
    }

    pub fn on_resize<D: Document<Element = E>>(&mut self, doc: &mut D, now: Duration) {
        self.fire_due(doc, now);

        if self.presentation.sync(doc, &self.config) {
            self.update_chameleon(doc);
        } else {
            self.tracker.cancel();
        }
        self.sync_reflow(doc);
    }

    pub fn on_header_resized<D: Document<Element = E>>(&mut self, doc: &mut D, now: Duration) {
        self.fire_due(doc, now);
        self.sync_reflow(doc);
    }

    /// Fire the pending hide if its deadline has passed
    pub fn on_timer<D: Document<Element = E>>(&mut self, doc: &mut D, now: Duration) {
        self.fire_due(doc, now);
    }

    // =========================================================================
    // Steps
    // =========================================================================

    fn fire_due<D: Document<Element = E>>(&mut self, doc: &mut D, now: Duration) {
        if !self.tracker.take_due(now) {
            return;
        }
        if self.presentation.is_active() && self.hide_policy.is_some() {
            self.presentation.set_hidden(doc, true);
        }
    }

    fn update_hide_reveal<D: Document<Element = E>>(&mut self, doc: &mut D, now: Duration) {
        let offset = doc.scroll_y();
        let Some(policy) = self.hide_policy else {
            self.tracker.record(offset);
            self.tracker.cancel();
            self.presentation.set_hidden(doc, false);
            return;
        };

        let hidden = match self.tracker.observe(&policy, offset, now) {
            HideAction::HideNow => true,
            HideAction::Reveal => false,
            HideAction::None | HideAction::Armed(_) => self.presentation.is_hidden(),
        };
        self.presentation.set_hidden(doc, hidden);
    }

    fn update_chameleon<D: Document<Element = E>>(&mut self, doc: &mut D) {
        if self.config.background_style != BackgroundStyle::Chameleon {
            return;
        }
        let sample = sample_below(doc, self.presentation.header());
        self.presentation
            .apply_background_sample(doc, &self.config, sample);
    }

    fn sync_reflow<D: Document<Element = E>>(&self, doc: &mut D) {
        self.reflow
            .sync(doc, self.presentation.header(), self.presentation.is_active());
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn header(&self) -> E {
        self.presentation.header()
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.presentation.is_active()
    }

    pub fn is_hidden(&self) -> bool {
        self.presentation.is_hidden()
    }

    pub fn reflow(&self) -> &Reflow<E> {
        &self.reflow
    }

    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    /// When the host should next deliver a timer notification
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tracker.pending_hide()
    }
}
