// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod catalog;
mod config;
mod multiplex;

pub use catalog::CatalogError;
pub use config::{ConfigError, ValidationError};
pub use multiplex::MultiplexError;
