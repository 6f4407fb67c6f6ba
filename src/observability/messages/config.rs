// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for catalog loading and validation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Catalog document read from disk.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CatalogLoaded<'a> {
    pub path: &'a str,
    pub node_count: usize,
}

impl Display for CatalogLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded catalog '{}' with {} nodes", self.path, self.node_count)
    }
}

impl StructuredLog for CatalogLoaded<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, node_count = self.node_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("catalog", span_name = name, path = self.path)
    }
}

/// The same node id appears more than once; the later node wins.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
///
/// # Example
/// ```
/// use the_tmtc_console::observability::messages::config::DuplicateNodeId;
///
/// let msg = DuplicateNodeId { node_id: "terminal" };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct DuplicateNodeId<'a> {
    pub node_id: &'a str,
}

impl Display for DuplicateNodeId<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Duplicate node id '{}': the later declaration replaces the earlier one",
            self.node_id
        )
    }
}

impl StructuredLog for DuplicateNodeId<'_> {
    fn log(&self) {
        tracing::warn!(node_id = self.node_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("catalog", span_name = name, node_id = self.node_id)
    }
}

/// Catalog validation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct CatalogValidationFailed {
    pub error_count: usize,
}

impl Display for CatalogValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Catalog validation failed with {} errors", self.error_count)
    }
}

impl StructuredLog for CatalogValidationFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("catalog", span_name = name, error_count = self.error_count)
    }
}

/// Catalog nodes walked and registered with the resolver.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CatalogProcessed {
    pub node_count: usize,
    pub sender_count: usize,
    pub receiver_count: usize,
}

impl Display for CatalogProcessed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processed {} catalog nodes: {} senders, {} receivers",
            self.node_count, self.sender_count, self.receiver_count
        )
    }
}

impl StructuredLog for CatalogProcessed {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            sender_count = self.sender_count,
            receiver_count = self.receiver_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("catalog", span_name = name, node_count = self.node_count)
    }
}
