// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it through `tracing` with its fields attached at the
//! level documented on the type.
//!
//! * `catalog` - Resolver registration and finalize events
//! * `config` - Catalog document loading and validation
//! * `multiplex` - Device table and hub events
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_tmtc_console::observability::messages::multiplex::TableConfigured;
//! use the_tmtc_console::observability::messages::StructuredLog;
//!
//! let msg = TableConfigured { device: "sat1" };
//!
//! let span = msg.span("configure");
//! let _guard = span.enter();
//! msg.log();
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod catalog;
pub mod config;
pub mod multiplex;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
