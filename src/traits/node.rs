// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::catalog::{HandlerRef, Payload, Signals};

/// An object that can take part in catalog wiring.
///
/// A node raises the events listed by its [`Signals`] and accepts deliveries on
/// the handlers it names in [`CatalogNode::handlers`]. Both tables are static, so
/// a binding can be validated once at finalize time and dispatched by index
/// afterwards.
pub trait CatalogNode: Send + Sync {
    /// Short kind label used in diagnostics (`multiplex`, `terminal`, ...).
    fn kind(&self) -> &'static str;

    /// Outgoing events of this node.
    fn signals(&self) -> &Signals;

    /// Names of the handlers this node accepts deliveries on.
    fn handlers(&self) -> &'static [&'static str];

    /// Deliver `payload` to the handler `handler` refers to.
    fn invoke(&self, handler: HandlerRef, payload: &Payload);
}
