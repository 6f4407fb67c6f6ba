// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::{Arc, Weak};

use crate::catalog::{EventRef, HandlerRef};
use crate::traits::CatalogNode;

/// One declared "connect" request, registered under the id of the receiver it targets.
///
/// The source node is referenced weakly; its lifetime belongs to whoever loaded the
/// catalog.
#[derive(Clone)]
pub struct BindingDescriptor {
    id: String,
    source: Weak<dyn CatalogNode>,
    source_kind: &'static str,
    event_name: String,
    handler_name: String,
}

impl BindingDescriptor {
    pub fn new(
        id: impl Into<String>,
        source: &Arc<dyn CatalogNode>,
        event_name: impl Into<String>,
        handler_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: Arc::downgrade(source),
            source_kind: source.kind(),
            event_name: event_name.into(),
            handler_name: handler_name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> Option<Arc<dyn CatalogNode>> {
        self.source.upgrade()
    }

    pub fn source_kind(&self) -> &'static str {
        self.source_kind
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }
}

impl fmt::Debug for BindingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingDescriptor")
            .field("id", &self.id)
            .field("source_kind", &self.source_kind)
            .field("event", &self.event_name)
            .field("handler", &self.handler_name)
            .field("source_alive", &(self.source.strong_count() > 0))
            .finish()
    }
}

/// A plain identified node: `id` resolves to `receiver`.
#[derive(Clone)]
pub struct ReceiverDeclaration {
    id: String,
    receiver: Weak<dyn CatalogNode>,
    kind: &'static str,
}

impl ReceiverDeclaration {
    pub fn new(id: impl Into<String>, receiver: &Arc<dyn CatalogNode>) -> Self {
        Self {
            id: id.into(),
            receiver: Arc::downgrade(receiver),
            kind: receiver.kind(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn receiver(&self) -> Option<Arc<dyn CatalogNode>> {
        self.receiver.upgrade()
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Debug for ReceiverDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverDeclaration")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("receiver_alive", &(self.receiver.strong_count() > 0))
            .finish()
    }
}

/// A relationship the resolver has connected, from a source event to a receiver handler.
#[derive(Clone)]
pub struct EstablishedBinding {
    pub(crate) id: String,
    pub(crate) source: Weak<dyn CatalogNode>,
    pub(crate) source_kind: &'static str,
    pub(crate) event: EventRef,
    pub(crate) receiver: Weak<dyn CatalogNode>,
    pub(crate) receiver_kind: &'static str,
    pub(crate) handler: HandlerRef,
}

impl EstablishedBinding {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_kind(&self) -> &'static str {
        self.source_kind
    }

    pub fn event(&self) -> EventRef {
        self.event
    }

    pub fn receiver_kind(&self) -> &'static str {
        self.receiver_kind
    }

    pub fn handler(&self) -> HandlerRef {
        self.handler
    }

    /// Same source, event, receiver and handler.
    pub(crate) fn same_wiring(&self, other: &EstablishedBinding) -> bool {
        self.event == other.event
            && self.handler == other.handler
            && Weak::ptr_eq(&self.source, &other.source)
            && Weak::ptr_eq(&self.receiver, &other.receiver)
    }

    /// Detach this binding from its source, if the source is still alive.
    pub(crate) fn disconnect(&self) -> bool {
        match self.source.upgrade() {
            Some(source) => source.signals().disconnect(self.event, &self.receiver, self.handler),
            None => false,
        }
    }
}

impl fmt::Display for EstablishedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> '{}' {}.{}",
            self.source_kind,
            self.event.name(),
            self.id,
            self.receiver_kind,
            self.handler.name()
        )
    }
}

impl fmt::Debug for EstablishedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EstablishedBinding({})", self)
    }
}
