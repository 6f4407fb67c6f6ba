// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{ACK_ATTRIBUTE_PROPERTY, TRANSCRIPT_LIMIT_PROPERTY};
use crate::errors::ConfigError;
use crate::model::{AttributeRecord, Variant};
use crate::observability::messages::{config::*, StructuredLog};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A catalog document: the nodes of a console and the wiring between them.
///
/// Nodes may be listed in any order; a `connect` entry may name a node that
/// only appears further down the document.
///
/// # Example
/// ```yaml
/// nodes:
///   - id: multiplex
///     kind: multiplex
///     devices: [sat1, sat2]
///     connect:
///       - id: terminal
///         signal: send_to_user
///         slot: received
///       - { id: link, signal: send_to_device, slot: transmit }
///   - id: terminal
///     kind: terminal
///     properties:
///       transcript_limit: 200
///   - id: link
///     kind: loopback
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub nodes: Vec<NodeConfig>,
}

/// One node of the catalog.
///
/// # Fields
/// * `id` - Identifier other nodes connect to (optional for pure senders)
/// * `kind` - Which node implementation to build
/// * `devices` - Devices a multiplex keeps tables for (multiplex only)
/// * `properties` - Named values that tune the node, see [`NodeKind::properties`]
/// * `connect` - Outgoing wiring; a node with any `connect` entries is a sender
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub id: Option<String>,
    pub kind: NodeKind,
    pub devices: Option<Vec<String>>,
    #[serde(default)]
    pub properties: BTreeMap<String, Variant>,
    #[serde(default)]
    pub connect: Vec<ConnectConfig>,
}

impl NodeConfig {
    /// The id, or a positional label for nodes without one.
    pub fn label(&self, position: usize) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("#{}", position),
        }
    }

    /// The configured properties as attribute records, ordered by name.
    pub fn property_records(&self) -> Vec<AttributeRecord> {
        self.properties
            .iter()
            .map(|(name, value)| AttributeRecord::new(name.as_str(), value.clone()))
            .collect()
    }
}

/// Node implementations a catalog can name.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Multiplex,
    Terminal,
    Loopback,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Multiplex => "multiplex",
            NodeKind::Terminal => "terminal",
            NodeKind::Loopback => "loopback",
        }
    }

    /// Properties this kind understands, with the value type of each.
    pub fn properties(&self) -> &'static [(&'static str, PropertyType)] {
        match self {
            NodeKind::Multiplex => &[],
            NodeKind::Terminal => &[(TRANSCRIPT_LIMIT_PROPERTY, PropertyType::UInt)],
            NodeKind::Loopback => &[(ACK_ATTRIBUTE_PROPERTY, PropertyType::Text)],
        }
    }
}

/// Value type a node property must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    UInt,
    Text,
}

impl PropertyType {
    pub fn accepts(&self, value: &Variant) -> bool {
        matches!(
            (self, value),
            (PropertyType::UInt, Variant::UInt(_)) | (PropertyType::Text, Variant::Text(_))
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::UInt => "an unsigned integer",
            PropertyType::Text => "text",
        }
    }
}

/// A `connect` child: wire this node's `signal` to the `slot` handler of the
/// node registered as `id`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ConnectConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub slot: String,
}

/// Load a catalog document from a YAML file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let catalog: CatalogConfig = serde_yaml::from_str(&content)?;

    CatalogLoaded {
        path: &path.display().to_string(),
        node_count: catalog.nodes.len(),
    }
    .log();
    Ok(catalog)
}

/// Load a catalog document and check its structure.
///
/// Every structural problem in the document is reported at once.
pub fn load_and_validate_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig, ConfigError> {
    let catalog = load_catalog(path)?;

    if let Err(errors) = crate::config::validate_catalog(&catalog) {
        CatalogValidationFailed {
            error_count: errors.len(),
        }
        .log();
        return Err(ConfigError::Validation(errors));
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_catalog(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_catalog() {
        let yaml = r#"
nodes:
  - id: multiplex
    kind: multiplex
    devices: [sat1]
    connect:
      - { id: terminal, signal: send_to_user, slot: received }
  - id: terminal
    kind: terminal
  - kind: loopback
    connect:
      - id: multiplex
        signal: received
        slot: received_from_device
"#;

        let catalog: CatalogConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(catalog.nodes.len(), 3);
        assert_eq!(catalog.nodes[0].kind, NodeKind::Multiplex);
        assert_eq!(catalog.nodes[0].devices, Some(vec!["sat1".to_string()]));
        assert_eq!(catalog.nodes[0].connect[0].slot, "received");
        assert!(catalog.nodes[1].connect.is_empty());
        assert_eq!(catalog.nodes[2].id, None);
        assert_eq!(catalog.nodes[2].label(2), "#2");
    }

    #[test]
    fn test_properties_become_attribute_records() {
        let yaml = r#"
nodes:
  - id: terminal
    kind: terminal
    properties:
      transcript_limit: 50
  - id: link
    kind: loopback
    properties: { ack_attribute: echoed }
  - id: multiplex
    kind: multiplex
"#;

        let catalog: CatalogConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            catalog.nodes[0].property_records(),
            vec![AttributeRecord::new(TRANSCRIPT_LIMIT_PROPERTY, 50u64)]
        );
        assert_eq!(
            catalog.nodes[1].property_records(),
            vec![AttributeRecord::new(ACK_ATTRIBUTE_PROPERTY, "echoed")]
        );
        assert!(catalog.nodes[2].property_records().is_empty());

        let (name, expected) = NodeKind::Terminal.properties()[0];
        assert_eq!(name, TRANSCRIPT_LIMIT_PROPERTY);
        assert!(expected.accepts(&Variant::UInt(50)));
        assert!(!expected.accepts(&Variant::Text("50".to_string())));
    }

    #[test]
    fn test_unknown_kind_is_a_parse_error() {
        let yaml = r#"
nodes:
  - id: radio
    kind: transceiver
"#;
        assert!(serde_yaml::from_str::<CatalogConfig>(yaml).is_err());
    }

    #[test]
    fn test_load_and_validate_valid_catalog() {
        let file = write_catalog(
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

        let catalog = load_and_validate_catalog(file.path()).unwrap();
        assert_eq!(catalog.nodes.len(), 2);
    }

    #[test]
    fn test_load_and_validate_reports_every_problem() {
        let file = write_catalog(
            r#"
nodes:
  - id: ""
    kind: terminal
  - id: link
    kind: loopback
    devices: [sat1]
    connect:
      - { id: multiplex, signal: received }
"#,
        );

        let err = load_and_validate_catalog(file.path()).unwrap_err();
        let ConfigError::Validation(errors) = &err else {
            panic!("expected validation failure, got {err}");
        };
        assert_eq!(errors.len(), 3);
        let rendered = err.to_string();
        assert!(rendered.contains("Node at position 0 has an empty id"));
        assert!(rendered.contains("does not accept the 'devices' option"));
        assert!(rendered.contains("empty 'slot'"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_catalog(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_yaml_is_yaml_error() {
        let file = write_catalog("nodes: [ { id: a, kind: ");
        assert!(matches!(load_catalog(file.path()), Err(ConfigError::Yaml(_))));
    }
}
