// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::consts::{ACK_ATTRIBUTE_PROPERTY, DEFAULT_TRANSCRIPT_LIMIT, TRANSCRIPT_LIMIT_PROPERTY};
use crate::config::{NodeConfig, NodeKind};
use crate::model::{AttributeRecord, DeviceIdentifier, Variant};
use crate::nodes::ACK_ATTRIBUTE;
use crate::multiplex::MultiplexHub;
use crate::nodes::{LoopbackDevice, Terminal};
use crate::traits::CatalogNode;

/// A node built from the catalog, keeping its concrete type.
#[derive(Clone)]
pub enum NodeHandle {
    Multiplex(Arc<MultiplexHub>),
    Terminal(Arc<Terminal>),
    Loopback(Arc<LoopbackDevice>),
}

impl NodeHandle {
    /// The same node as a wiring participant.
    pub fn as_node(&self) -> Arc<dyn CatalogNode> {
        match self {
            NodeHandle::Multiplex(hub) => hub.clone(),
            NodeHandle::Terminal(terminal) => terminal.clone(),
            NodeHandle::Loopback(link) => link.clone(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeHandle::Multiplex(_) => NodeKind::Multiplex,
            NodeHandle::Terminal(_) => NodeKind::Terminal,
            NodeHandle::Loopback(_) => NodeKind::Loopback,
        }
    }

    pub fn as_multiplex(&self) -> Option<&Arc<MultiplexHub>> {
        match self {
            NodeHandle::Multiplex(hub) => Some(hub),
            _ => None,
        }
    }

    pub fn as_terminal(&self) -> Option<&Arc<Terminal>> {
        match self {
            NodeHandle::Terminal(terminal) => Some(terminal),
            _ => None,
        }
    }

    pub fn as_loopback(&self) -> Option<&Arc<LoopbackDevice>> {
        match self {
            NodeHandle::Loopback(link) => Some(link),
            _ => None,
        }
    }
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeHandle({})", self.kind().as_str())
    }
}

/// Builds catalog nodes from their configuration.
pub struct NodeFactory;

impl NodeFactory {
    /// Create the node `config` describes.
    ///
    /// The `kind` field selects the implementation:
    /// - "multiplex" -> MultiplexHub, with a table per entry of `devices`
    /// - "terminal" -> Terminal, keeping `transcript_limit` entries
    /// - "loopback" -> LoopbackDevice, marking echoes with `ack_attribute`
    pub fn create(config: &NodeConfig) -> NodeHandle {
        match config.kind {
            NodeKind::Multiplex => NodeHandle::Multiplex(Arc::new(MultiplexHub::with_devices(
                Self::devices(config),
            ))),
            NodeKind::Terminal => NodeHandle::Terminal(Arc::new(Terminal::with_transcript_limit(
                Self::transcript_limit(config),
            ))),
            NodeKind::Loopback => NodeHandle::Loopback(Arc::new(LoopbackDevice::with_ack_attribute(
                Self::ack_attribute(config),
            ))),
        }
    }

    /// Apply `config` to a node that already exists, keeping its identity.
    ///
    /// A multiplex gains tables for newly listed devices and loses the tables
    /// of devices no longer listed; other kinds take their properties again.
    /// Returns `false` when the kinds differ.
    pub fn reconfigure(existing: &NodeHandle, config: &NodeConfig) -> bool {
        if existing.kind() != config.kind {
            return false;
        }
        match existing {
            NodeHandle::Multiplex(hub) => {
                let wanted: Vec<DeviceIdentifier> = Self::devices(config).collect();
                for device in hub.devices() {
                    if !wanted.contains(&device) {
                        hub.deconfigure(&device);
                    }
                }
                for device in wanted {
                    hub.configure(device);
                }
            }
            NodeHandle::Terminal(terminal) => terminal.set_transcript_limit(Self::transcript_limit(config)),
            NodeHandle::Loopback(link) => link.set_ack_attribute(Self::ack_attribute(config)),
        }
        true
    }

    /// List all node kinds a catalog can name
    pub fn available_kinds() -> Vec<&'static str> {
        vec!["multiplex", "terminal", "loopback"]
    }

    fn transcript_limit(config: &NodeConfig) -> usize {
        Self::property(config, TRANSCRIPT_LIMIT_PROPERTY)
            .and_then(|value| value.as_uint())
            .map_or(DEFAULT_TRANSCRIPT_LIMIT, |limit| {
                usize::try_from(limit).unwrap_or(usize::MAX)
            })
    }

    fn ack_attribute(config: &NodeConfig) -> String {
        Self::property(config, ACK_ATTRIBUTE_PROPERTY)
            .and_then(|value| value.as_text().map(str::to_string))
            .unwrap_or_else(|| ACK_ATTRIBUTE.to_string())
    }

    fn property(config: &NodeConfig, name: &str) -> Option<Variant> {
        config
            .property_records()
            .into_iter()
            .find(|record| record.name() == name)
            .map(AttributeRecord::into_value)
    }

    fn devices(config: &NodeConfig) -> impl Iterator<Item = DeviceIdentifier> + '_ {
        config
            .devices
            .iter()
            .flatten()
            .map(|device| DeviceIdentifier::new(device.as_str()))
    }
}
