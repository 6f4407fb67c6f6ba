// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the catalog wiring resolver.
//!
//! This module contains message types for logging events related to:
//! * Sender and receiver registration (including last-write-wins replacement)
//! * The finalize pass and the bindings it establishes, reconfirms or retracts
//! * Unresolved, malformed and released bindings

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A sender binding was registered.
///
/// # Log Level
/// `debug!` - Registration detail
pub struct SenderRegistered<'a> {
    pub id: &'a str,
    pub event: &'a str,
    pub handler: &'a str,
    pub replaced: bool,
}

impl Display for SenderRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.replaced {
            write!(
                f,
                "Sender '{}' re-registered ({} -> {}), previous registration replaced",
                self.id, self.event, self.handler
            )
        } else {
            write!(f, "Sender '{}' registered ({} -> {})", self.id, self.event, self.handler)
        }
    }
}

impl StructuredLog for SenderRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            id = self.id,
            event = self.event,
            handler = self.handler,
            replaced = self.replaced,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "sender",
            span_name = name,
            id = self.id,
            event = self.event,
            handler = self.handler,
        )
    }
}

/// A receiver declaration was registered.
///
/// # Log Level
/// `debug!` - Registration detail
pub struct ReceiverRegistered<'a> {
    pub id: &'a str,
    pub kind: &'a str,
    pub replaced: bool,
}

impl Display for ReceiverRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.replaced {
            write!(
                f,
                "Receiver '{}' ({}) re-registered, previous registration replaced",
                self.id, self.kind
            )
        } else {
            write!(f, "Receiver '{}' ({}) registered", self.id, self.kind)
        }
    }
}

impl StructuredLog for ReceiverRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            id = self.id,
            kind = self.kind,
            replaced = self.replaced,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("receiver", span_name = name, id = self.id, kind = self.kind)
    }
}

/// Finalize pass started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_tmtc_console::observability::messages::catalog::FinalizeStarted;
///
/// let msg = FinalizeStarted {
///     sender_count: 3,
///     receiver_count: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct FinalizeStarted {
    pub sender_count: usize,
    pub receiver_count: usize,
}

impl Display for FinalizeStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Resolving catalog wiring: {} senders, {} receivers",
            self.sender_count, self.receiver_count
        )
    }
}

impl StructuredLog for FinalizeStarted {
    fn log(&self) {
        tracing::info!(
            sender_count = self.sender_count,
            receiver_count = self.receiver_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "finalize",
            span_name = name,
            sender_count = self.sender_count,
            receiver_count = self.receiver_count,
        )
    }
}

/// A binding was connected during finalize.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BindingEstablished<'a> {
    pub id: &'a str,
    pub source_kind: &'a str,
    pub event: &'a str,
    pub receiver_kind: &'a str,
    pub handler: &'a str,
}

impl Display for BindingEstablished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Connected {}.{} -> '{}' {}.{}",
            self.source_kind, self.event, self.id, self.receiver_kind, self.handler
        )
    }
}

impl StructuredLog for BindingEstablished<'_> {
    fn log(&self) {
        tracing::info!(
            id = self.id,
            source_kind = self.source_kind,
            event = self.event,
            receiver_kind = self.receiver_kind,
            handler = self.handler,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "binding",
            span_name = name,
            id = self.id,
            event = self.event,
            handler = self.handler,
        )
    }
}

/// A previously established binding was disconnected because its registration
/// changed or disappeared.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BindingRetracted<'a> {
    pub id: &'a str,
    pub event: &'a str,
    pub handler: &'a str,
}

impl Display for BindingRetracted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Disconnected stale binding '{}' ({} -> {})",
            self.id, self.event, self.handler
        )
    }
}

impl StructuredLog for BindingRetracted<'_> {
    fn log(&self) {
        tracing::info!(id = self.id, event = self.event, handler = self.handler, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("binding", span_name = name, id = self.id)
    }
}

/// A sender has no receiver with the same id.
///
/// # Log Level
/// `warn!` - Non-fatal, the binding is left out of the wiring
///
/// # Example
/// ```
/// use the_tmtc_console::observability::messages::catalog::UnresolvedBinding;
///
/// let msg = UnresolvedBinding {
///     id: "devX",
///     event: "ev",
///     handler: "h",
/// };
///
/// assert_eq!(msg.to_string(), "Binding 'devX' (ev -> h) has no receiver; left unresolved");
/// ```
pub struct UnresolvedBinding<'a> {
    pub id: &'a str,
    pub event: &'a str,
    pub handler: &'a str,
}

impl Display for UnresolvedBinding<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Binding '{}' ({} -> {}) has no receiver; left unresolved",
            self.id, self.event, self.handler
        )
    }
}

impl StructuredLog for UnresolvedBinding<'_> {
    fn log(&self) {
        tracing::warn!(id = self.id, event = self.event, handler = self.handler, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("binding", span_name = name, id = self.id)
    }
}

/// A binding names an event or handler its node does not declare.
///
/// # Log Level
/// `error!` - Configuration failure requiring attention
pub struct MalformedBinding<'a> {
    pub id: &'a str,
    pub reason: &'a str,
}

impl Display for MalformedBinding<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Binding '{}' is malformed: {}", self.id, self.reason)
    }
}

impl StructuredLog for MalformedBinding<'_> {
    fn log(&self) {
        tracing::error!(id = self.id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("binding", span_name = name, id = self.id)
    }
}

/// A registered node was dropped by its owner before finalize.
///
/// # Log Level
/// `warn!` - Non-fatal, the binding is left out of the wiring
pub struct ReleasedNode<'a> {
    pub id: &'a str,
    pub role: &'a str,
}

impl Display for ReleasedNode<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "The {} registered under '{}' has been released; binding skipped",
            self.role, self.id
        )
    }
}

impl StructuredLog for ReleasedNode<'_> {
    fn log(&self) {
        tracing::warn!(id = self.id, role = self.role, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("binding", span_name = name, id = self.id, role = self.role)
    }
}

/// Finalize pass completed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct FinalizeCompleted {
    pub established: usize,
    pub reconfirmed: usize,
    pub retracted: usize,
    pub unresolved: usize,
    pub malformed: usize,
    pub duration: Duration,
}

impl Display for FinalizeCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Catalog wiring resolved in {:?}: {} established, {} reconfirmed, {} retracted, {} unresolved, {} malformed",
            self.duration,
            self.established,
            self.reconfirmed,
            self.retracted,
            self.unresolved,
            self.malformed
        )
    }
}

impl StructuredLog for FinalizeCompleted {
    fn log(&self) {
        tracing::info!(
            established = self.established,
            reconfirmed = self.reconfirmed,
            retracted = self.retracted,
            unresolved = self.unresolved,
            malformed = self.malformed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "finalize",
            span_name = name,
            established = self.established,
            unresolved = self.unresolved,
        )
    }
}

/// Two nodes were connected directly, outside the catalog document.
///
/// # Log Level
/// `info!` - Important operational event
pub struct NodesLinked<'a> {
    pub source_id: &'a str,
    pub event: &'a str,
    pub receiver_id: &'a str,
    pub handler: &'a str,
}

impl Display for NodesLinked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Linked '{}'.{} -> '{}'.{}",
            self.source_id, self.event, self.receiver_id, self.handler
        )
    }
}

impl StructuredLog for NodesLinked<'_> {
    fn log(&self) {
        tracing::info!(
            source_id = self.source_id,
            event = self.event,
            receiver_id = self.receiver_id,
            handler = self.handler,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("link", span_name = name, source_id = self.source_id)
    }
}
