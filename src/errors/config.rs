// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::CatalogError;
use thiserror::Error;

/// Structural problems found while validating a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A node has an empty `id` attribute
    #[error("Node at position {position} has an empty id")]
    EmptyNodeId {
        /// Zero-based position of the node in the document
        position: usize,
    },
    /// A `connect` child is missing one of its attributes
    #[error("Node '{node_id}' has a connect element with an empty '{field}'")]
    EmptyConnectField {
        node_id: String,
        /// One of `id`, `signal`, `slot`
        field: &'static str,
    },
    /// An option was given to a node kind that does not understand it
    #[error("Node '{node_id}' of kind '{kind}' does not accept the '{option}' option")]
    UnexpectedOption {
        node_id: String,
        kind: &'static str,
        option: &'static str,
    },
    /// A property the node kind does not know
    #[error("Node '{node_id}' of kind '{kind}' has no property '{property}'")]
    UnknownProperty {
        node_id: String,
        kind: &'static str,
        property: String,
    },
    /// A known property with a value of the wrong type
    #[error("Property '{property}' of node '{node_id}' must be {expected}")]
    InvalidProperty {
        node_id: String,
        property: String,
        expected: &'static str,
    },
    /// A multiplex lists the same device twice
    #[error("Multiplex '{node_id}' lists device '{device}' more than once")]
    DuplicateDevice { node_id: String, device: String },
}

/// Errors surfaced by catalog loading and processing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Catalog validation failed:\n{}", join_lines(.0))]
    Validation(Vec<ValidationError>),

    #[error("node '{node_id}': {source}")]
    Registration {
        node_id: String,
        #[source]
        source: CatalogError,
    },

    /// Wiring that names events or handlers the nodes do not declare.
    #[error("Malformed wiring:\n{}", .0.join("\n"))]
    MalformedWiring(Vec<String>),

    /// Reprocessing a document changed the kind of an already running node.
    #[error("node '{node_id}' changed kind from '{existing}' to '{requested}'")]
    KindChanged {
        node_id: String,
        existing: &'static str,
        requested: &'static str,
    },
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
