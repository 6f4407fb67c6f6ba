//! Structural validation of catalog documents.
//!
//! Validation looks at each node on its own and collects every problem it
//! finds instead of stopping at the first. It does not check that `connect`
//! targets exist or that signal and slot names are real: forward references are
//! the normal case, and names are checked against the node implementations when
//! the wiring is finalized.
//!
//! # Checks
//!
//! 1. **Identity**: a node that carries an `id` must not leave it empty
//! 2. **Connect entries**: `id`, `signal` and `slot` are all required
//! 3. **Options**: `devices` is only understood by `multiplex` nodes, and may not
//!    repeat a device
//! 4. **Properties**: each property must be one the node kind knows, with a value
//!    of the expected type
//!
//! Repeated node ids are not an error. The later node replaces the earlier one
//! when the catalog is read.
//!
//! # Example
//! ```rust
//! use the_tmtc_console::config::{validate_catalog, CatalogConfig};
//! use the_tmtc_console::errors::ValidationError;
//!
//! let catalog: CatalogConfig = serde_yaml::from_str(r#"
//! nodes:
//!   - id: link
//!     kind: loopback
//!     devices: [sat1]
//! "#).unwrap();
//!
//! let errors = validate_catalog(&catalog).unwrap_err();
//! assert!(matches!(errors[0], ValidationError::UnexpectedOption { option: "devices", .. }));
//! ```

use std::collections::HashSet;

use crate::config::{CatalogConfig, NodeConfig, NodeKind};
use crate::errors::ValidationError;

/// Check every node of `catalog`, returning all problems found.
pub fn validate_catalog(catalog: &CatalogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (position, node) in catalog.nodes.iter().enumerate() {
        validate_identity(position, node, &mut errors);
        validate_connects(position, node, &mut errors);
        validate_options(position, node, &mut errors);
        validate_properties(position, node, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_identity(position: usize, node: &NodeConfig, errors: &mut Vec<ValidationError>) {
    if matches!(node.id.as_deref(), Some(id) if id.trim().is_empty()) {
        errors.push(ValidationError::EmptyNodeId { position });
    }
}

fn validate_connects(position: usize, node: &NodeConfig, errors: &mut Vec<ValidationError>) {
    for connect in &node.connect {
        let fields = [
            ("id", &connect.id),
            ("signal", &connect.signal),
            ("slot", &connect.slot),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                errors.push(ValidationError::EmptyConnectField {
                    node_id: node.label(position),
                    field,
                });
            }
        }
    }
}

fn validate_options(position: usize, node: &NodeConfig, errors: &mut Vec<ValidationError>) {
    let Some(devices) = &node.devices else {
        return;
    };

    if node.kind != NodeKind::Multiplex {
        errors.push(ValidationError::UnexpectedOption {
            node_id: node.label(position),
            kind: node.kind.as_str(),
            option: "devices",
        });
        return;
    }

    let mut seen = HashSet::new();
    for device in devices {
        if !seen.insert(device.as_str()) {
            errors.push(ValidationError::DuplicateDevice {
                node_id: node.label(position),
                device: device.clone(),
            });
        }
    }
}

fn validate_properties(position: usize, node: &NodeConfig, errors: &mut Vec<ValidationError>) {
    let known = node.kind.properties();
    for record in node.property_records() {
        match known.iter().find(|(name, _)| *name == record.name()) {
            None => errors.push(ValidationError::UnknownProperty {
                node_id: node.label(position),
                kind: node.kind.as_str(),
                property: record.name().to_string(),
            }),
            Some((_, expected)) if !expected.accepts(record.value()) => {
                errors.push(ValidationError::InvalidProperty {
                    node_id: node.label(position),
                    property: record.name().to_string(),
                    expected: expected.as_str(),
                })
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> CatalogConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_catalog_with_forward_reference() {
        let catalog = parse(
            r#"
nodes:
  - id: terminal
    kind: terminal
    connect:
      - { id: multiplex, signal: send, slot: received_from_user }
  - id: multiplex
    kind: multiplex
    devices: [sat1, sat2]
"#,
        );
        assert!(validate_catalog(&catalog).is_ok());
    }

    #[test]
    fn test_validation_table() {
        struct TestCase {
            name: &'static str,
            yaml: &'static str,
            expected: Vec<ValidationError>,
        }

        let test_cases = vec![
            TestCase {
                name: "empty id",
                yaml: "nodes:\n  - { id: '  ', kind: terminal }\n",
                expected: vec![ValidationError::EmptyNodeId { position: 0 }],
            },
            TestCase {
                name: "missing signal and slot",
                yaml: "nodes:\n  - kind: loopback\n    connect:\n      - { id: multiplex }\n",
                expected: vec![
                    ValidationError::EmptyConnectField {
                        node_id: "#0".to_string(),
                        field: "signal",
                    },
                    ValidationError::EmptyConnectField {
                        node_id: "#0".to_string(),
                        field: "slot",
                    },
                ],
            },
            TestCase {
                name: "devices on terminal",
                yaml: "nodes:\n  - { id: t, kind: terminal, devices: [] }\n",
                expected: vec![ValidationError::UnexpectedOption {
                    node_id: "t".to_string(),
                    kind: "terminal",
                    option: "devices",
                }],
            },
            TestCase {
                name: "repeated device",
                yaml: "nodes:\n  - { id: mux, kind: multiplex, devices: [sat1, sat2, sat1] }\n",
                expected: vec![ValidationError::DuplicateDevice {
                    node_id: "mux".to_string(),
                    device: "sat1".to_string(),
                }],
            },
            TestCase {
                name: "unknown property",
                yaml: "nodes:\n  - { id: mux, kind: multiplex, properties: { prompt: '>' } }\n",
                expected: vec![ValidationError::UnknownProperty {
                    node_id: "mux".to_string(),
                    kind: "multiplex",
                    property: "prompt".to_string(),
                }],
            },
            TestCase {
                name: "property of the wrong type",
                yaml: "nodes:\n  - { id: t, kind: terminal, properties: { transcript_limit: many } }\n",
                expected: vec![ValidationError::InvalidProperty {
                    node_id: "t".to_string(),
                    property: "transcript_limit".to_string(),
                    expected: "an unsigned integer",
                }],
            },
            TestCase {
                name: "known properties",
                yaml: "nodes:\n  - { id: t, kind: terminal, properties: { transcript_limit: 10 } }\n  - { id: l, kind: loopback, properties: { ack_attribute: echoed } }\n",
                expected: vec![],
            },
            TestCase {
                name: "repeated node id is allowed",
                yaml: "nodes:\n  - { id: t, kind: terminal }\n  - { id: t, kind: terminal }\n",
                expected: vec![],
            },
        ];

        for case in test_cases {
            let catalog = parse(case.yaml);
            let errors = validate_catalog(&catalog).err().unwrap_or_default();
            assert_eq!(errors, case.expected, "{}", case.name);
        }
    }
}
