// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Deferred two-phase wiring of catalog nodes.
//!
//! Catalog nodes may name each other in any document order, so nothing is
//! connected while the document is read. Nodes with `connect` children register
//! a [`BindingDescriptor`] per child through [`CatalogWiringResolver::sender`],
//! plain identified nodes register through [`CatalogWiringResolver::receiver`],
//! and a single [`CatalogWiringResolver::finalize`] pass afterwards matches the
//! two by id and connects events to handlers.
//!
//! # Rules
//!
//! - Registering an id a second time replaces the earlier registration.
//! - A sender without a receiver is reported as unresolved and skipped.
//! - Event and handler names are checked against the nodes' declared tables
//!   during finalize; unknown names are reported as malformed and skipped.
//! - `finalize` can run any number of times. Each run leaves the wiring equal to
//!   the current registrations: unchanged bindings are reconfirmed, changed or
//!   vanished ones are disconnected.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use the_tmtc_console::catalog::CatalogWiringResolver;
//! use the_tmtc_console::multiplex::MultiplexHub;
//! use the_tmtc_console::nodes::Terminal;
//! use the_tmtc_console::traits::CatalogNode;
//!
//! let terminal: Arc<dyn CatalogNode> = Arc::new(Terminal::new());
//! let hub: Arc<dyn CatalogNode> = Arc::new(MultiplexHub::new());
//!
//! let mut resolver = CatalogWiringResolver::new();
//! // forward reference: the receiver is declared after the sender
//! resolver.sender("multiplex", &terminal, "send", "received_from_user").unwrap();
//! resolver.receiver("multiplex", &hub).unwrap();
//!
//! let report = resolver.finalize();
//! assert_eq!(report.established, vec!["multiplex".to_string()]);
//! assert!(report.diagnostics.is_empty());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::{BindingDescriptor, EstablishedBinding, HandlerRef, ReceiverDeclaration};
use crate::errors::CatalogError;
use crate::observability::messages::{catalog::*, StructuredLog};
use crate::traits::CatalogNode;

/// Which side of a binding a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Sender,
    Receiver,
}

impl NodeRole {
    fn as_str(self) -> &'static str {
        match self {
            NodeRole::Sender => "sender",
            NodeRole::Receiver => "receiver",
        }
    }
}

/// Non-fatal findings of a finalize pass. Each one leaves its binding out of the wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringDiagnostic {
    /// No receiver is registered under the sender's id
    Unresolved {
        id: String,
        event: String,
        handler: String,
    },
    /// The source node does not raise the named event
    UnknownEvent {
        id: String,
        source_kind: &'static str,
        event: String,
    },
    /// The receiver node has no handler with that name
    UnknownHandler {
        id: String,
        receiver_kind: &'static str,
        handler: String,
    },
    /// A registered node was dropped before finalize
    Released { id: String, role: NodeRole },
}

impl WiringDiagnostic {
    pub fn id(&self) -> &str {
        match self {
            WiringDiagnostic::Unresolved { id, .. }
            | WiringDiagnostic::UnknownEvent { id, .. }
            | WiringDiagnostic::UnknownHandler { id, .. }
            | WiringDiagnostic::Released { id, .. } => id,
        }
    }

    /// Wiring that names events or handlers the nodes do not have.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            WiringDiagnostic::UnknownEvent { .. } | WiringDiagnostic::UnknownHandler { .. }
        )
    }

    fn log(&self) {
        match self {
            WiringDiagnostic::Unresolved { id, event, handler } => UnresolvedBinding {
                id,
                event,
                handler,
            }
            .log(),
            WiringDiagnostic::UnknownEvent { id, .. } | WiringDiagnostic::UnknownHandler { id, .. } => {
                let reason = self.to_string();
                MalformedBinding { id, reason: &reason }.log()
            }
            WiringDiagnostic::Released { id, role } => ReleasedNode {
                id,
                role: role.as_str(),
            }
            .log(),
        }
    }
}

impl fmt::Display for WiringDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WiringDiagnostic::Unresolved { id, event, handler } => {
                write!(f, "binding '{}' ({} -> {}) has no receiver", id, event, handler)
            }
            WiringDiagnostic::UnknownEvent {
                id,
                source_kind,
                event,
            } => write!(
                f,
                "binding '{}': a {} node raises no event named '{}'",
                id, source_kind, event
            ),
            WiringDiagnostic::UnknownHandler {
                id,
                receiver_kind,
                handler,
            } => write!(
                f,
                "binding '{}': a {} node has no handler named '{}'",
                id, receiver_kind, handler
            ),
            WiringDiagnostic::Released { id, role } => {
                write!(f, "binding '{}': the {} has been released", id, role.as_str())
            }
        }
    }
}

/// Outcome of one [`CatalogWiringResolver::finalize`] pass. Id lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Bindings connected by this pass
    pub established: Vec<String>,
    /// Bindings that were already connected and remain so
    pub reconfirmed: Vec<String>,
    /// Bindings from an earlier pass that were disconnected
    pub retracted: Vec<String>,
    pub diagnostics: Vec<WiringDiagnostic>,
}

impl FinalizeReport {
    pub fn unresolved(&self) -> impl Iterator<Item = &WiringDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, WiringDiagnostic::Unresolved { .. }))
    }

    pub fn malformed(&self) -> impl Iterator<Item = &WiringDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_malformed())
    }

    /// Number of bindings wired after this pass.
    pub fn wired(&self) -> usize {
        self.established.len() + self.reconfirmed.len()
    }
}

/// Sender and receiver registrations lifted out of a resolver, so an aborted
/// re-read can put them back.
#[derive(Default)]
pub struct Registrations {
    senders: HashMap<String, BindingDescriptor>,
    receivers: HashMap<String, ReceiverDeclaration>,
}

impl Registrations {
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty() && self.receivers.is_empty()
    }
}

/// Collects sender and receiver registrations and wires them in one finalize pass.
#[derive(Default)]
pub struct CatalogWiringResolver {
    senders: HashMap<String, BindingDescriptor>,
    receivers: HashMap<String, ReceiverDeclaration>,
    established: HashMap<String, EstablishedBinding>,
}

impl CatalogWiringResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending binding from `source`'s `event` to the `handler` of
    /// whatever node is registered as receiver `id`.
    pub fn sender(
        &mut self,
        id: impl Into<String>,
        source: &Arc<dyn CatalogNode>,
        event: &str,
        handler: &str,
    ) -> Result<(), CatalogError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CatalogError::EmptyId);
        }
        if event.is_empty() {
            return Err(CatalogError::EmptyEventName { id });
        }
        if handler.is_empty() {
            return Err(CatalogError::EmptyHandlerName { id });
        }

        SenderRegistered {
            id: &id,
            event,
            handler,
            replaced: self.senders.contains_key(&id),
        }
        .log();
        let descriptor = BindingDescriptor::new(id.clone(), source, event, handler);
        self.senders.insert(id, descriptor);
        Ok(())
    }

    /// Register `receiver` under `id`.
    pub fn receiver(&mut self, id: impl Into<String>, receiver: &Arc<dyn CatalogNode>) -> Result<(), CatalogError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CatalogError::EmptyId);
        }

        let replaced = self
            .receivers
            .insert(id.clone(), ReceiverDeclaration::new(id.clone(), receiver))
            .is_some();
        ReceiverRegistered {
            id: &id,
            kind: receiver.kind(),
            replaced,
        }
        .log();
        Ok(())
    }

    pub fn senders(&self) -> &HashMap<String, BindingDescriptor> {
        &self.senders
    }

    pub fn receivers(&self) -> &HashMap<String, ReceiverDeclaration> {
        &self.receivers
    }

    /// Drop every sender and receiver registration ahead of re-reading a
    /// document. Established wiring stays until the next `finalize` retracts it.
    pub fn clear_registrations(&mut self) {
        self.senders.clear();
        self.receivers.clear();
    }

    /// Remove and return every registration. Established wiring is untouched.
    pub fn take_registrations(&mut self) -> Registrations {
        Registrations {
            senders: std::mem::take(&mut self.senders),
            receivers: std::mem::take(&mut self.receivers),
        }
    }

    /// Replace the current registrations with `saved`.
    pub fn restore_registrations(&mut self, saved: Registrations) {
        self.senders = saved.senders;
        self.receivers = saved.receivers;
    }

    /// Bindings connected by the most recent finalize, sorted by id.
    pub fn established(&self) -> Vec<&EstablishedBinding> {
        let mut bindings: Vec<&EstablishedBinding> = self.established.values().collect();
        bindings.sort_by(|a, b| a.id.cmp(&b.id));
        bindings
    }

    /// Match every sender to the receiver with the same id and connect them.
    pub fn finalize(&mut self) -> FinalizeReport {
        let started = FinalizeStarted {
            sender_count: self.senders.len(),
            receiver_count: self.receivers.len(),
        };
        let span = started.span("catalog_finalize");
        let _guard = span.enter();
        started.log();
        let start_time = Instant::now();

        let mut report = FinalizeReport::default();
        let mut ids: Vec<&String> = self.senders.keys().collect();
        ids.sort();

        let mut desired: Vec<(EstablishedBinding, Arc<dyn CatalogNode>, Arc<dyn CatalogNode>)> = Vec::new();
        for id in ids {
            match self.resolve(id) {
                Ok(resolved) => desired.push(resolved),
                Err(diagnostic) => report.diagnostics.push(diagnostic),
            }
        }

        // disconnect anything whose registration changed or vanished
        let mut previous: Vec<(String, EstablishedBinding)> = self.established.drain().collect();
        previous.sort_by(|a, b| a.0.cmp(&b.0));
        for (id, old) in previous {
            let still_wanted = desired
                .iter()
                .any(|(binding, _, _)| binding.id == id && binding.same_wiring(&old));
            if !still_wanted {
                old.disconnect();
                BindingRetracted {
                    id: &id,
                    event: old.event.name(),
                    handler: old.handler.name(),
                }
                .log();
                report.retracted.push(id);
            }
        }

        for (binding, source, receiver) in desired {
            if source.signals().connect(binding.event, &receiver, binding.handler) {
                BindingEstablished {
                    id: &binding.id,
                    source_kind: binding.source_kind,
                    event: binding.event.name(),
                    receiver_kind: binding.receiver_kind,
                    handler: binding.handler.name(),
                }
                .log();
                report.established.push(binding.id.clone());
            } else {
                report.reconfirmed.push(binding.id.clone());
            }
            self.established.insert(binding.id.clone(), binding);
        }

        for diagnostic in &report.diagnostics {
            diagnostic.log();
        }

        FinalizeCompleted {
            established: report.established.len(),
            reconfirmed: report.reconfirmed.len(),
            retracted: report.retracted.len(),
            unresolved: report.unresolved().count(),
            malformed: report.malformed().count(),
            duration: start_time.elapsed(),
        }
        .log();

        report
    }

    /// Validate one sender against its receiver and the nodes' declared tables.
    fn resolve(
        &self,
        id: &str,
    ) -> Result<(EstablishedBinding, Arc<dyn CatalogNode>, Arc<dyn CatalogNode>), WiringDiagnostic> {
        let released = |role| WiringDiagnostic::Released {
            id: id.to_string(),
            role,
        };

        let descriptor = &self.senders[id];
        let source = descriptor.source().ok_or_else(|| released(NodeRole::Sender))?;
        let declaration = self
            .receivers
            .get(id)
            .ok_or_else(|| WiringDiagnostic::Unresolved {
                id: id.to_string(),
                event: descriptor.event_name().to_string(),
                handler: descriptor.handler_name().to_string(),
            })?;
        let receiver = declaration.receiver().ok_or_else(|| released(NodeRole::Receiver))?;

        let event = source
            .signals()
            .resolve(descriptor.event_name())
            .ok_or_else(|| WiringDiagnostic::UnknownEvent {
                id: id.to_string(),
                source_kind: source.kind(),
                event: descriptor.event_name().to_string(),
            })?;
        let handler = HandlerRef::resolve(receiver.as_ref(), descriptor.handler_name()).ok_or_else(|| {
            WiringDiagnostic::UnknownHandler {
                id: id.to_string(),
                receiver_kind: receiver.kind(),
                handler: descriptor.handler_name().to_string(),
            }
        })?;

        let binding = EstablishedBinding {
            id: id.to_string(),
            source: Arc::downgrade(&source),
            source_kind: source.kind(),
            event,
            receiver: Arc::downgrade(&receiver),
            receiver_kind: receiver.kind(),
            handler,
        };
        Ok((binding, source, receiver))
    }
}

impl fmt::Debug for CatalogWiringResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogWiringResolver")
            .field("senders", &self.senders.keys().collect::<Vec<_>>())
            .field("receivers", &self.receivers.keys().collect::<Vec<_>>())
            .field("established", &self.established.len())
            .finish()
    }
}
