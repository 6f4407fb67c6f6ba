// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for device tables and the multiplex hub.
//!
//! This module contains message types for logging events related to:
//! * Table configuration and teardown
//! * Index population and overhead accounting
//! * Counter restoration after a bulk load
//! * Message routing between the user side and device links

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A device table was created.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TableConfigured<'a> {
    pub device: &'a str,
}

impl Display for TableConfigured<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Multiplex table configured for device '{}'", self.device)
    }
}

impl StructuredLog for TableConfigured<'_> {
    fn log(&self) {
        tracing::info!(device = self.device, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("table", span_name = name, device = self.device)
    }
}

/// A device table was torn down.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TableDeconfigured<'a> {
    pub device: &'a str,
    pub record_count: u32,
}

impl Display for TableDeconfigured<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Multiplex table for device '{}' deconfigured ({} records dropped)",
            self.device, self.record_count
        )
    }
}

impl StructuredLog for TableDeconfigured<'_> {
    fn log(&self) {
        tracing::info!(device = self.device, record_count = self.record_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("table", span_name = name, device = self.device)
    }
}

/// A cache miss populated an index entry.
///
/// # Log Level
/// `debug!` - Per-operation detail
///
/// # Example
/// ```
/// use the_tmtc_console::observability::messages::multiplex::IndexPopulated;
///
/// let msg = IndexPopulated {
///     device: "sat1",
///     name: "eps",
///     overhead_temporal: 1,
///     overhead_spatial: 1,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct IndexPopulated<'a> {
    pub device: &'a str,
    pub name: &'a str,
    pub overhead_temporal: u32,
    pub overhead_spatial: u32,
}

impl Display for IndexPopulated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Indexed '{}/{}' (overhead temporal={}, spatial={})",
            self.device, self.name, self.overhead_temporal, self.overhead_spatial
        )
    }
}

impl StructuredLog for IndexPopulated<'_> {
    fn log(&self) {
        tracing::debug!(
            device = self.device,
            record = self.name,
            overhead_temporal = self.overhead_temporal,
            overhead_spatial = self.overhead_spatial,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("index", span_name = name, device = self.device, record = self.name)
    }
}

/// Counters were restored from a snapshot.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CountersRestored<'a> {
    pub device: &'a str,
    pub overhead_temporal: u32,
    pub overhead_spatial: u32,
    pub record_count: u32,
}

impl Display for CountersRestored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Restored table '{}': {} records, overhead temporal={}, spatial={}",
            self.device, self.record_count, self.overhead_temporal, self.overhead_spatial
        )
    }
}

impl StructuredLog for CountersRestored<'_> {
    fn log(&self) {
        tracing::info!(
            device = self.device,
            record_count = self.record_count,
            overhead_temporal = self.overhead_temporal,
            overhead_spatial = self.overhead_spatial,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("restore", span_name = name, device = self.device)
    }
}

/// A message was stored and forwarded by the hub.
///
/// # Log Level
/// `debug!` - Per-message detail
pub struct MessageRouted<'a> {
    pub device: &'a str,
    pub name: &'a str,
    pub direction: &'a str,
}

impl Display for MessageRouted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Routed '{}/{}' {}", self.device, self.name, self.direction)
    }
}

impl StructuredLog for MessageRouted<'_> {
    fn log(&self) {
        tracing::debug!(
            device = self.device,
            record = self.name,
            direction = self.direction,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("route", span_name = name, device = self.device, direction = self.direction)
    }
}

/// A message could not be routed.
///
/// # Log Level
/// `warn!` - Degraded behavior, the message is dropped
pub struct MessageDropped<'a> {
    pub device: &'a str,
    pub name: &'a str,
    pub reason: &'a dyn std::error::Error,
}

impl Display for MessageDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dropped '{}/{}': {}", self.device, self.name, self.reason)
    }
}

impl StructuredLog for MessageDropped<'_> {
    fn log(&self) {
        tracing::warn!(
            device = self.device,
            record = self.name,
            reason = %self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("route", span_name = name, device = self.device)
    }
}
