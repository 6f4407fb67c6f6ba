// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by resolver registration calls and direct node wiring.

use thiserror::Error;

/// Structurally invalid input to `sender`/`receiver`, or a direct link that
/// names something its nodes do not declare.
///
/// Everything else the resolver encounters (unresolved ids, replaced
/// registrations, unknown event or handler names) is a diagnostic carried in the
/// finalize report, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("registration id must not be empty")]
    EmptyId,

    #[error("binding '{id}' names an empty event")]
    EmptyEventName { id: String },

    #[error("binding '{id}' names an empty handler")]
    EmptyHandlerName { id: String },

    /// Direct wiring named a node the catalog does not hold.
    #[error("no node with id '{0}'")]
    UnknownNode(String),

    #[error("{kind} node has no event '{event}'")]
    UnknownEvent { kind: &'static str, event: String },

    #[error("{kind} node has no handler '{handler}'")]
    UnknownHandler { kind: &'static str, handler: String },
}
