// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use loader::{
    load_and_validate_catalog, load_catalog, CatalogConfig, ConnectConfig, NodeConfig, NodeKind,
    PropertyType,
};
pub use validation::validate_catalog;
