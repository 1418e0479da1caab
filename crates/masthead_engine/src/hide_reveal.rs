//! Hide on scroll down, reveal on scroll up
//!
//! Direction is decided from the delta between consecutive scroll offsets.
//! Moves within the sensitivity band are ignored. Hiding can be debounced:
//! a single pending deadline lives in the [`ScrollTracker`], re-armed by
//! every further downward move and dropped by an upward one.

use std::time::Duration;

use tracing::debug;

use crate::config::Configuration;

/// Tuning for the hide/reveal policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HidePolicy {
    /// Scroll delta (px) that counts as a direction change
    pub sensitivity: f32,
    /// Debounce before hiding; zero hides immediately
    pub delay: Duration,
    pub reveal_on_scroll_up: bool,
}

impl HidePolicy {
    /// Policy for a configuration, `None` when hiding is disabled or
    /// reduced motion is requested
    pub fn from_config(config: &Configuration) -> Option<Self> {
        if !config.hide_on_scroll_down || config.reduced_motion {
            return None;
        }
        Some(Self {
            sensitivity: config.hide_sensitivity_px,
            delay: Duration::try_from_secs_f64(config.hide_delay_ms / 1000.0)
                .unwrap_or(Duration::MAX),
            reveal_on_scroll_up: config.reveal_on_scroll_up,
        })
    }
}

/// What the header should do after a scroll observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideAction {
    /// Leave the hidden state alone
    None,
    /// Hide right away
    HideNow,
    /// A hide is scheduled for the given deadline
    Armed(Duration),
    /// Show the header again
    Reveal,
}

/// Last scroll offset and the pending hide deadline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollTracker {
    last_offset: f32,
    pending_hide: Option<Duration>,
}

impl ScrollTracker {
    pub fn new(initial_offset: f32) -> Self {
        Self {
            last_offset: initial_offset,
            pending_hide: None,
        }
    }

    pub fn last_offset(&self) -> f32 {
        self.last_offset
    }

    /// Deadline of the armed hide, if any
    pub fn pending_hide(&self) -> Option<Duration> {
        self.pending_hide
    }

    /// Run the policy for a new scroll offset observed at `now`
    pub fn observe(&mut self, policy: &HidePolicy, offset: f32, now: Duration) -> HideAction {
        let delta = offset - self.last_offset;
        self.last_offset = offset;

        if delta > policy.sensitivity {
            self.cancel();
            if policy.delay.is_zero() {
                return HideAction::HideNow;
            }
            let deadline = now.saturating_add(policy.delay);
            debug!("Hide armed for {:?}", deadline);
            self.pending_hide = Some(deadline);
            HideAction::Armed(deadline)
        } else if delta < -policy.sensitivity && policy.reveal_on_scroll_up {
            self.cancel();
            HideAction::Reveal
        } else {
            HideAction::None
        }
    }

    /// Track an offset without running the policy
    pub fn record(&mut self, offset: f32) {
        self.last_offset = offset;
    }

    /// Drop any pending hide
    pub fn cancel(&mut self) {
        if self.pending_hide.take().is_some() {
            debug!("Pending hide canceled");
        }
    }

    /// Consume the pending hide if its deadline has passed
    pub fn take_due(&mut self, now: Duration) -> bool {
        match self.pending_hide {
            Some(deadline) if deadline <= now => {
                self.pending_hide = None;
                true
            }
            _ => false,
        }
    }
}
