// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event delivery between catalog nodes.
//!
//! Events and handlers are declared by name in static tables on each node.
//! Resolving a name yields an [`EventRef`] or [`HandlerRef`] that carries the
//! table index, so dispatch never looks a name up again.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::model::Message;
use crate::traits::CatalogNode;

/// What travels along a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Message(Message),
    Text(String),
    Empty,
}

/// A validated reference to one of a node's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventRef {
    index: usize,
    name: &'static str,
}

impl EventRef {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A validated reference to one of a node's handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    index: usize,
    name: &'static str,
}

impl HandlerRef {
    /// Resolve `name` against the handlers `node` declares.
    pub fn resolve(node: &dyn CatalogNode, name: &str) -> Option<HandlerRef> {
        let handlers = node.handlers();
        handlers
            .iter()
            .position(|h| *h == name)
            .map(|index| HandlerRef {
                index,
                name: handlers[index],
            })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

struct Connection {
    receiver: Weak<dyn CatalogNode>,
    handler: HandlerRef,
}

impl Connection {
    fn is(&self, receiver: &Weak<dyn CatalogNode>, handler: HandlerRef) -> bool {
        self.handler == handler && Weak::ptr_eq(&self.receiver, receiver)
    }
}

/// The outgoing events of one node and the connections attached to each.
///
/// Receivers are held weakly; a connection whose receiver has been dropped is
/// skipped on delivery and pruned on the next `connect`/`disconnect`.
pub struct Signals {
    names: &'static [&'static str],
    connections: Vec<RwLock<Vec<Connection>>>,
}

impl Signals {
    pub fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            connections: names.iter().map(|_| RwLock::new(Vec::new())).collect(),
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    /// Resolve an event name declared by this node.
    pub fn resolve(&self, event: &str) -> Option<EventRef> {
        self.names
            .iter()
            .position(|n| *n == event)
            .map(|index| EventRef {
                index,
                name: self.names[index],
            })
    }

    /// Attach `receiver`'s `handler` to `event`.
    ///
    /// Returns `false` when the same receiver/handler pair is already attached,
    /// leaving exactly one connection in place.
    pub fn connect(&self, event: EventRef, receiver: &Arc<dyn CatalogNode>, handler: HandlerRef) -> bool {
        let Some(slot) = self.connections.get(event.index) else {
            return false;
        };
        let receiver = Arc::downgrade(receiver);
        let mut connections = slot.write().unwrap_or_else(PoisonError::into_inner);
        connections.retain(|c| c.receiver.strong_count() > 0);
        if connections.iter().any(|c| c.is(&receiver, handler)) {
            return false;
        }
        connections.push(Connection { receiver, handler });
        true
    }

    /// Detach `receiver`'s `handler` from `event`. Returns whether anything was removed.
    pub fn disconnect(&self, event: EventRef, receiver: &Weak<dyn CatalogNode>, handler: HandlerRef) -> bool {
        let Some(slot) = self.connections.get(event.index) else {
            return false;
        };
        let mut connections = slot.write().unwrap_or_else(PoisonError::into_inner);
        let found = connections.iter().any(|c| c.is(receiver, handler));
        connections.retain(|c| c.receiver.strong_count() > 0 && !c.is(receiver, handler));
        found
    }

    /// Number of live connections on `event`.
    pub fn connection_count(&self, event: EventRef) -> usize {
        self.connections
            .get(event.index)
            .map(|slot| {
                slot.read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .iter()
                    .filter(|c| c.receiver.strong_count() > 0)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Deliver `payload` to every handler attached to `event`.
    ///
    /// The connection list is copied out before any handler runs, so handlers
    /// may emit further events, including on this node. Returns the number of
    /// handlers invoked.
    pub fn emit(&self, event: EventRef, payload: &Payload) -> usize {
        let targets: Vec<(Arc<dyn CatalogNode>, HandlerRef)> = match self.connections.get(event.index) {
            Some(slot) => slot
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter_map(|c| c.receiver.upgrade().map(|r| (r, c.handler)))
                .collect(),
            None => return 0,
        };

        for (receiver, handler) in &targets {
            receiver.invoke(*handler, payload);
        }
        targets.len()
    }

    /// Resolve `event` by name and emit on it; unknown names deliver nothing.
    pub fn emit_named(&self, event: &str, payload: &Payload) -> usize {
        match self.resolve(event) {
            Some(event) => self.emit(event, payload),
            None => 0,
        }
    }
}

impl std::fmt::Debug for Signals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signals")
            .field("events", &self.names)
            .field(
                "connections",
                &self
                    .connections
                    .iter()
                    .map(|slot| slot.read().unwrap_or_else(PoisonError::into_inner).len())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// A node that records every delivery it receives.
    pub struct RecordingNode {
        pub signals: Signals,
        pub deliveries: Mutex<Vec<(&'static str, Payload)>>,
    }

    impl RecordingNode {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                signals: Signals::new(&["telemetryReady", "commandSent"]),
                deliveries: Mutex::new(Vec::new()),
            })
        }

        pub fn delivered(&self) -> Vec<(&'static str, Payload)> {
            self.deliveries.lock().unwrap().clone()
        }
    }

    impl CatalogNode for RecordingNode {
        fn kind(&self) -> &'static str {
            "recording"
        }

        fn signals(&self) -> &Signals {
            &self.signals
        }

        fn handlers(&self) -> &'static [&'static str] {
            &["onTelemetry", "onCommand"]
        }

        fn invoke(&self, handler: HandlerRef, payload: &Payload) {
            self.deliveries.lock().unwrap().push((handler.name(), payload.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingNode;
    use super::*;

    #[test]
    fn test_resolve_declared_names_only() {
        let node = RecordingNode::new();
        assert_eq!(node.signals.resolve("commandSent").map(|e| e.name()), Some("commandSent"));
        assert!(node.signals.resolve("nope").is_none());
        assert_eq!(HandlerRef::resolve(node.as_ref(), "onCommand").map(|h| h.index()), Some(1));
        assert!(HandlerRef::resolve(node.as_ref(), "onNothing").is_none());
    }

    #[test]
    fn test_connect_is_unique_per_receiver_and_handler() {
        let source = RecordingNode::new();
        let sink = RecordingNode::new();
        let sink_node: Arc<dyn CatalogNode> = sink.clone();
        let event = source.signals.resolve("telemetryReady").unwrap();
        let handler = HandlerRef::resolve(sink_node.as_ref(), "onTelemetry").unwrap();

        assert!(source.signals.connect(event, &sink_node, handler));
        assert!(!source.signals.connect(event, &sink_node, handler));
        assert_eq!(source.signals.connection_count(event), 1);

        let delivered = source.signals.emit(event, &Payload::Text("frame".to_string()));
        assert_eq!(delivered, 1);
        assert_eq!(sink.delivered(), vec![("onTelemetry", Payload::Text("frame".to_string()))]);
    }

    #[test]
    fn test_disconnect_and_dropped_receivers() {
        let source = RecordingNode::new();
        let event = source.signals.resolve("telemetryReady").unwrap();

        let sink: Arc<dyn CatalogNode> = RecordingNode::new();
        let handler = HandlerRef::resolve(sink.as_ref(), "onTelemetry").unwrap();
        source.signals.connect(event, &sink, handler);
        assert!(source.signals.disconnect(event, &Arc::downgrade(&sink), handler));
        assert!(!source.signals.disconnect(event, &Arc::downgrade(&sink), handler));
        assert_eq!(source.signals.connection_count(event), 0);

        source.signals.connect(event, &sink, handler);
        drop(sink);
        assert_eq!(source.signals.connection_count(event), 0);
        assert_eq!(source.signals.emit(event, &Payload::Empty), 0);
    }

    #[test]
    fn test_emit_named_unknown_event_delivers_nothing() {
        let source = RecordingNode::new();
        assert_eq!(source.signals.emit_named("missing", &Payload::Empty), 0);
    }
}
