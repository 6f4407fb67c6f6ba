// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::catalog::{HandlerRef, Payload, Signals};
use crate::model::Message;
use crate::traits::CatalogNode;

const EVENTS: &[&str] = &["received"];
const HANDLERS: &[&str] = &["transmit"];

/// Attribute set on every echoed message unless configured otherwise.
pub const ACK_ATTRIBUTE: &str = "ack";

/// A device link that answers every command it is given with the same message
/// as telemetry, marked `ack = true`.
pub struct LoopbackDevice {
    signals: Signals,
    ack_attribute: RwLock<String>,
    echoed: AtomicU64,
}

impl LoopbackDevice {
    pub fn new() -> Self {
        Self::with_ack_attribute(ACK_ATTRIBUTE)
    }

    /// A loopback marking its echoes with the attribute `name`.
    pub fn with_ack_attribute(name: impl Into<String>) -> Self {
        Self {
            signals: Signals::new(EVENTS),
            ack_attribute: RwLock::new(name.into()),
            echoed: AtomicU64::new(0),
        }
    }

    pub fn ack_attribute(&self) -> String {
        self.ack_attribute
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_ack_attribute(&self, name: impl Into<String>) {
        *self.ack_attribute.write().unwrap_or_else(PoisonError::into_inner) = name.into();
    }

    pub fn transmit(&self, command: &Message) -> usize {
        let reply = command.clone().with_attribute(self.ack_attribute(), true);
        self.echoed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(device = %reply.device(), record = reply.name(), "loopback echo");
        self.signals.emit_named(EVENTS[0], &Payload::Message(reply))
    }

    /// Number of commands echoed so far.
    pub fn echoed(&self) -> u64 {
        self.echoed.load(Ordering::Relaxed)
    }
}

impl Default for LoopbackDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogNode for LoopbackDevice {
    fn kind(&self) -> &'static str {
        "loopback"
    }

    fn signals(&self) -> &Signals {
        &self.signals
    }

    fn handlers(&self) -> &'static [&'static str] {
        HANDLERS
    }

    fn invoke(&self, _handler: HandlerRef, payload: &Payload) {
        if let Payload::Message(command) = payload {
            self.transmit(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::signal::test_support::RecordingNode;
    use crate::model::{DeviceIdentifier, Variant};
    use std::sync::Arc;

    #[test]
    fn test_echo_marks_acknowledgement() {
        let link = Arc::new(LoopbackDevice::new());
        let sink = RecordingNode::new();
        let sink_node: Arc<dyn CatalogNode> = sink.clone();
        let event = link.signals().resolve("received").unwrap();
        let handler = HandlerRef::resolve(sink_node.as_ref(), "onTelemetry").unwrap();
        link.signals().connect(event, &sink_node, handler);

        let transmit = HandlerRef::resolve(link.as_ref(), "transmit").unwrap();
        let command = Message::new(DeviceIdentifier::new("sat1"), "ping").with_attribute("seq", 7u64);
        link.invoke(transmit, &Payload::Message(command));
        link.invoke(transmit, &Payload::Text("not a command".to_string()));

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 1);
        let Payload::Message(reply) = &delivered[0].1 else {
            panic!("expected a message payload");
        };
        assert_eq!(reply.attribute("seq"), Some(&Variant::UInt(7)));
        assert_eq!(reply.attribute(ACK_ATTRIBUTE), Some(&Variant::Bool(true)));
        assert_eq!(link.echoed(), 1);
    }

    #[test]
    fn test_configured_ack_attribute() {
        let link = LoopbackDevice::with_ack_attribute("echoed");
        let sink = RecordingNode::new();
        let sink_node: Arc<dyn CatalogNode> = sink.clone();
        let event = link.signals().resolve("received").unwrap();
        let handler = HandlerRef::resolve(sink_node.as_ref(), "onTelemetry").unwrap();
        link.signals().connect(event, &sink_node, handler);

        link.transmit(&Message::new(DeviceIdentifier::new("sat1"), "ping"));
        link.set_ack_attribute("seen");
        link.transmit(&Message::new(DeviceIdentifier::new("sat1"), "ping"));

        let delivered = sink.delivered();
        let default_absent: Vec<bool> = delivered
            .iter()
            .map(|(_, payload)| match payload {
                Payload::Message(reply) => reply.attribute(ACK_ATTRIBUTE).is_none(),
                _ => false,
            })
            .collect();
        assert_eq!(default_absent, vec![true, true]);
        let Payload::Message(first) = &delivered[0].1 else {
            panic!("expected a message payload");
        };
        assert_eq!(first.attribute("echoed"), Some(&Variant::Bool(true)));
        let Payload::Message(second) = &delivered[1].1 else {
            panic!("expected a message payload");
        };
        assert_eq!(second.attribute("seen"), Some(&Variant::Bool(true)));
    }
}
