// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging in the console core. Message types follow a struct-based pattern
//! with `Display` trait implementation so that:
//!
//! * Log text lives in one place instead of being scattered through the code
//! * Every event carries the same structured fields wherever it is raised
//! * Diagnostics such as unresolved bindings are greppable by type
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::catalog` - Registration and finalize events of the wiring resolver
//! * `messages::config` - Catalog document loading and validation
//! * `messages::multiplex` - Device table lifecycle, indexing and routing
//!
//! # Usage
//!
//! ```rust
//! use the_tmtc_console::observability::messages::catalog::UnresolvedBinding;
//! use the_tmtc_console::observability::messages::StructuredLog;
//!
//! let msg = UnresolvedBinding {
//!     id: "devX",
//!     event: "ev",
//!     handler: "h",
//! };
//!
//! msg.log();
//! ```

pub mod messages;
