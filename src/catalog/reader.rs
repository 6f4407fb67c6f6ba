// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Walks a catalog document, builds its nodes and registers them with the
//! resolver.
//!
//! For each node, in document order: a node with `connect` children calls
//! `sender` once per child, with the child's `id` naming the receiver; any
//! other node that carries an `id` calls `receiver` once. After the walk,
//! `finalize` runs exactly once.
//!
//! A receiver id takes a single sender. Paths the document cannot express,
//! such as the return half of a duplex pair, are added with [`Catalog::link`].

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{CatalogWiringResolver, FinalizeReport, HandlerRef};
use crate::config::{CatalogConfig, NodeConfig, NodeKind};
use crate::errors::{CatalogError, ConfigError};
use crate::multiplex::MultiplexHub;
use crate::nodes::{NodeFactory, NodeHandle, Terminal};
use crate::observability::messages::{catalog::NodesLinked, config::*, StructuredLog};

/// Reads catalog documents into a wired [`Catalog`].
pub struct CatalogReader;

impl CatalogReader {
    /// Build and wire every node of `config`.
    ///
    /// Fails on a structurally invalid registration and on wiring that names
    /// events or handlers the nodes do not have. Unresolved bindings are not an
    /// error; they are listed in the report.
    pub fn read(config: &CatalogConfig) -> Result<Catalog, ConfigError> {
        let mut catalog = Catalog::default();
        catalog.reprocess(config)?;
        Ok(catalog)
    }
}

/// The nodes of a catalog and the resolver that wired them.
///
/// The catalog owns its nodes; connections between them only hold weak
/// references, so dropping the catalog tears the wiring down.
#[derive(Default)]
pub struct Catalog {
    nodes: BTreeMap<String, NodeHandle>,
    anonymous: Vec<NodeHandle>,
    resolver: CatalogWiringResolver,
    report: FinalizeReport,
}

impl Catalog {
    /// Walk `config` again against the same resolver.
    ///
    /// Nodes whose id is still present are kept (a multiplex keeps its tables)
    /// and reconfigured; nodes that disappeared are dropped; bindings that no
    /// longer match the document are retracted by the finalize pass.
    ///
    /// Node kinds and registrations are checked before any node is changed. A
    /// `KindChanged` or `Registration` error leaves the nodes, registrations
    /// and wiring as they were.
    pub fn reprocess(&mut self, config: &CatalogConfig) -> Result<&FinalizeReport, ConfigError> {
        let span = tracing::info_span!("catalog_read", node_count = config.nodes.len());
        let _guard = span.enter();

        let planned = config
            .nodes
            .iter()
            .enumerate()
            .map(|(position, node)| self.plan_node(position, node))
            .collect::<Result<Vec<_>, _>>()?;

        let previous = self.resolver.take_registrations();
        let (sender_count, receiver_count) = match self.register(config, &planned) {
            Ok(counts) => counts,
            Err(e) => {
                self.resolver.restore_registrations(previous);
                return Err(e);
            }
        };

        let mut nodes = BTreeMap::new();
        let mut anonymous = Vec::new();
        for (node, (handle, reused)) in config.nodes.iter().zip(planned) {
            if reused {
                NodeFactory::reconfigure(&handle, node);
            }
            match &node.id {
                Some(id) => {
                    if nodes.insert(id.clone(), handle).is_some() {
                        DuplicateNodeId { node_id: id }.log();
                    }
                }
                None => anonymous.push(handle),
            }
        }

        self.nodes = nodes;
        self.anonymous = anonymous;
        CatalogProcessed {
            node_count: config.nodes.len(),
            sender_count,
            receiver_count,
        }
        .log();

        let report = self.resolver.finalize();
        let malformed: Vec<String> = report.malformed().map(|d| d.to_string()).collect();
        self.report = report;
        if !malformed.is_empty() {
            return Err(ConfigError::MalformedWiring(malformed));
        }
        Ok(&self.report)
    }

    /// Connect `source_id`'s `event` directly to `receiver_id`'s `handler`.
    ///
    /// Both names are checked against the nodes before anything is connected.
    /// Returns `false` if the connection already existed.
    pub fn link(
        &self,
        source_id: &str,
        event: &str,
        receiver_id: &str,
        handler: &str,
    ) -> Result<bool, CatalogError> {
        let source = self
            .node(source_id)
            .ok_or_else(|| CatalogError::UnknownNode(source_id.to_string()))?
            .as_node();
        let receiver = self
            .node(receiver_id)
            .ok_or_else(|| CatalogError::UnknownNode(receiver_id.to_string()))?
            .as_node();

        let event_ref = source
            .signals()
            .resolve(event)
            .ok_or_else(|| CatalogError::UnknownEvent {
                kind: source.kind(),
                event: event.to_string(),
            })?;
        let handler_ref =
            HandlerRef::resolve(receiver.as_ref(), handler).ok_or_else(|| CatalogError::UnknownHandler {
                kind: receiver.kind(),
                handler: handler.to_string(),
            })?;

        let connected = source.signals().connect(event_ref, &receiver, handler_ref);
        if connected {
            NodesLinked {
                source_id,
                event,
                receiver_id,
                handler,
            }
            .log();
        }
        Ok(connected)
    }

    pub fn node(&self, id: &str) -> Option<&NodeHandle> {
        self.nodes.get(id)
    }

    /// Identified nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeHandle)> {
        self.nodes.iter().map(|(id, handle)| (id.as_str(), handle))
    }

    /// Ids of the identified nodes of `kind`.
    pub fn ids_of(&self, kind: NodeKind) -> Vec<&str> {
        self.nodes()
            .filter(|(_, handle)| handle.kind() == kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of nodes, with or without an id.
    pub fn node_count(&self) -> usize {
        self.nodes.len() + self.anonymous.len()
    }

    /// The first multiplex hub, by id.
    pub fn multiplex(&self) -> Option<&Arc<MultiplexHub>> {
        self.nodes.values().find_map(NodeHandle::as_multiplex)
    }

    /// The first terminal, by id.
    pub fn terminal(&self) -> Option<&Arc<Terminal>> {
        self.nodes.values().find_map(NodeHandle::as_terminal)
    }

    pub fn resolver(&self) -> &CatalogWiringResolver {
        &self.resolver
    }

    /// Report of the most recent finalize pass.
    pub fn report(&self) -> &FinalizeReport {
        &self.report
    }

    /// The node `node` will be: the existing one with its id, or a new one.
    /// The flag is `true` for a reused node.
    fn plan_node(&self, position: usize, node: &NodeConfig) -> Result<(NodeHandle, bool), ConfigError> {
        let existing = node.id.as_deref().and_then(|id| self.nodes.get(id));
        match existing {
            Some(handle) if handle.kind() == node.kind => Ok((handle.clone(), true)),
            Some(handle) => Err(ConfigError::KindChanged {
                node_id: node.label(position),
                existing: handle.kind().as_str(),
                requested: node.kind.as_str(),
            }),
            None => Ok((NodeFactory::create(node), false)),
        }
    }

    /// Register every planned node. Returns the sender and receiver counts.
    fn register(
        &mut self,
        config: &CatalogConfig,
        planned: &[(NodeHandle, bool)],
    ) -> Result<(usize, usize), ConfigError> {
        let mut sender_count = 0;
        let mut receiver_count = 0;

        for (position, (node, (handle, _))) in config.nodes.iter().zip(planned).enumerate() {
            let object = handle.as_node();
            let registration = |source| ConfigError::Registration {
                node_id: node.label(position),
                source,
            };

            if !node.connect.is_empty() {
                for connect in &node.connect {
                    self.resolver
                        .sender(connect.id.as_str(), &object, &connect.signal, &connect.slot)
                        .map_err(registration)?;
                    sender_count += 1;
                }
            } else if let Some(id) = &node.id {
                self.resolver
                    .receiver(id.as_str(), &object)
                    .map_err(registration)?;
                receiver_count += 1;
            }
        }
        Ok((sender_count, receiver_count))
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("nodes", &self.nodes)
            .field("anonymous", &self.anonymous.len())
            .field("resolver", &self.resolver)
            .finish()
    }
}
