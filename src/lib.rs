// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod catalog;    // deferred wiring of catalog nodes
pub mod config;     // catalog documents + constants
pub mod errors;     // error handling
pub mod model;      // messages and attributes
pub mod multiplex;  // per-device tables and the hub
pub mod nodes;      // terminal, loopback link, factory
pub mod observability;
pub mod traits;     // unified abstractions
