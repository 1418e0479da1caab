//! Engine installation
//!
//! Installation never fails outwardly: a missing or broken configuration, a
//! disabled engine or a page without a header all leave the page untouched
//! and the engine [`Engine::Inert`]. While the document is still loading,
//! installation is deferred until the host reports [`Notification::Ready`].

use std::time::Duration;

use masthead_dom::Document;
use tracing::debug;

use crate::config::{resolve_configuration, Configuration};
use crate::coordinator::Coordinator;
use crate::error::ConfigError;
use crate::host::{HostCapabilities, Notification, NotificationSource};
use crate::locator::locate_header;

/// Why the engine does nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InertReason {
    /// No usable configuration
    Config(ConfigError),
    /// Configuration has `enabled: false`
    Disabled,
    /// No header element on the page
    NoHeader,
}

impl std::fmt::Display for InertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InertReason::Config(e) => write!(f, "{}", e),
            InertReason::Disabled => write!(f, "disabled by configuration"),
            InertReason::NoHeader => write!(f, "no header element found"),
        }
    }
}

/// Lifecycle of the sticky-header engine on one page
#[derive(Debug)]
pub enum Engine<E> {
    Inert(InertReason),
    /// Waiting for the document to finish loading
    Pending {
        config: Box<Configuration>,
        capabilities: HostCapabilities,
    },
    Running(Box<Coordinator<E>>),
}

impl<E: Copy> Engine<E> {
    /// Resolve the configuration and install on `doc`
    ///
    /// `fallback` stands in for a configuration value provided outside the
    /// page's data island.
    pub fn install<D: Document<Element = E>>(
        doc: &mut D,
        fallback: Option<&serde_json::Value>,
        capabilities: HostCapabilities,
    ) -> Self {
        let config = match resolve_configuration(doc, fallback) {
            Ok(config) => config,
            Err(e) => {
                debug!("Sticky header inert: {}", e);
                return Engine::Inert(InertReason::Config(e));
            }
        };

        if !config.enabled {
            debug!("Sticky header disabled");
            return Engine::Inert(InertReason::Disabled);
        }

        if doc.ready_state().is_loading() {
            debug!("Document loading, deferring sticky header setup");
            return Engine::Pending {
                config: Box::new(config),
                capabilities,
            };
        }

        Self::start(doc, config, capabilities)
    }

    fn start<D: Document<Element = E>>(
        doc: &mut D,
        config: Configuration,
        capabilities: HostCapabilities,
    ) -> Self {
        match locate_header(doc, &config.selectors) {
            Some(header) => {
                debug!("Sticky header installed");
                Engine::Running(Box::new(Coordinator::install(
                    doc,
                    header,
                    config,
                    capabilities,
                )))
            }
            None => {
                debug!("Sticky header inert: no header element");
                Engine::Inert(InertReason::NoHeader)
            }
        }
    }

    /// Deliver a notification
    pub fn handle<D: Document<Element = E>>(
        &mut self,
        doc: &mut D,
        notification: Notification,
        now: Duration,
    ) {
        match self {
            Engine::Pending {
                config,
                capabilities,
            } => {
                if notification == Notification::Ready {
                    let config = (**config).clone();
                    let capabilities = *capabilities;
                    *self = Self::start(doc, config, capabilities);
                }
            }
            Engine::Running(coordinator) => coordinator.handle(doc, notification, now),
            Engine::Inert(_) => {}
        }
    }

    /// Run every remaining host turn through the engine
    pub fn drive<S>(&mut self, source: &mut S)
    where
        S: NotificationSource,
        S::Document: Document<Element = E>,
    {
        while let Some(tick) = source.next_tick() {
            if let Some(notification) = tick.notification {
                self.handle(source.document_mut(), notification, tick.now);
            }
        }
    }

    pub fn coordinator(&self) -> Option<&Coordinator<E>> {
        match self {
            Engine::Running(coordinator) => Some(coordinator),
            _ => None,
        }
    }

    pub fn inert_reason(&self) -> Option<&InertReason> {
        match self {
            Engine::Inert(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Engine::Running(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Engine::Pending { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_ISLAND_ID;
    use masthead_dom::prelude::*;
    use serde_json::json;

    fn page() -> MemoryDocument {
        let mut doc = MemoryDocument::default();
        doc.append_to_body(
            el("div")
                .class("wp-site-blocks")
                .child(el("header").height(80.0))
                .child(el("main").height(2000.0)),
        );
        doc
    }

    #[test]
    fn test_absent_config_is_inert() {
        let mut doc = page();
        let engine = Engine::install(&mut doc, None, HostCapabilities::default());
        assert_eq!(
            engine.inert_reason(),
            Some(&InertReason::Config(ConfigError::Absent))
        );
    }

    #[test]
    fn test_disabled_config_is_inert() {
        let mut doc = page();
        let fallback = json!({ "enabled": false });
        let engine = Engine::install(&mut doc, Some(&fallback), HostCapabilities::default());
        assert_eq!(engine.inert_reason(), Some(&InertReason::Disabled));
    }

    #[test]
    fn test_no_header_is_inert() {
        let mut doc = MemoryDocument::default();
        doc.append_to_body(el("main").height(500.0));
        let fallback = json!({ "enabled": true });
        let engine = Engine::install(&mut doc, Some(&fallback), HostCapabilities::default());
        assert_eq!(engine.inert_reason(), Some(&InertReason::NoHeader));
    }

    #[test]
    fn test_installs_from_island() {
        let mut doc = page();
        doc.append_to_body(el("script").id(CONFIG_ISLAND_ID).text(r#"{"enabled":true}"#));
        let engine = Engine::install(&mut doc, None, HostCapabilities::default());
        let coordinator = engine.coordinator().unwrap();
        assert!(coordinator.is_active());
        assert_eq!(doc.first_by_tag("header"), Some(coordinator.header()));
    }

    #[test]
    fn test_deferred_until_ready() {
        let mut doc = page();
        doc.set_ready_state(ReadyState::Loading);
        let fallback = json!({ "enabled": true });
        let mut engine = Engine::install(&mut doc, Some(&fallback), HostCapabilities::default());
        assert!(engine.is_pending());

        engine.handle(&mut doc, Notification::Scroll, Duration::ZERO);
        assert!(engine.is_pending());

        doc.set_ready_state(ReadyState::Interactive);
        engine.handle(&mut doc, Notification::Ready, Duration::ZERO);
        assert!(engine.is_running());

        // a second ready notification does not reinstall
        let header = engine.coordinator().unwrap().header();
        engine.handle(&mut doc, Notification::Ready, Duration::ZERO);
        assert_eq!(engine.coordinator().unwrap().header(), header);
        assert_eq!(doc.query_selector_all(".bsh-header").unwrap().len(), 1);
    }
}
