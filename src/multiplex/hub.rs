// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The multiplex hub: routes messages between the user side and device links,
//! recording each one in the table of the device it addresses.
//!
//! Tables are created and torn down by the hub. Each table sits in its own
//! `RwLock`, so queries on one device run concurrently while an update or a
//! select on the same device holds it exclusively. No lock is held while an
//! event is emitted.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::catalog::{HandlerRef, Payload, Signals};
use crate::errors::MultiplexError;
use crate::model::{DeviceIdentifier, Message, Variant};
use crate::multiplex::{DeviceMultiplexTable, SelectCriteria, TableSnapshot, TableStats};
use crate::observability::messages::{multiplex::*, StructuredLog};
use crate::traits::CatalogNode;

pub type SharedTable = Arc<RwLock<DeviceMultiplexTable>>;

const EVENTS: &[&str] = &["send_to_device", "send_to_user"];
const HANDLERS: &[&str] = &["received_from_user", "received_from_device"];

const RECEIVED_FROM_USER: usize = 0;
const RECEIVED_FROM_DEVICE: usize = 1;

/// Which way a message is travelling through the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Command from the user side towards a device
    Uplink,
    /// Telemetry from a device towards the user side
    Downlink,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Uplink => "user -> device",
            Direction::Downlink => "device -> user",
        }
    }

    fn event(self) -> &'static str {
        match self {
            Direction::Uplink => EVENTS[0],
            Direction::Downlink => EVENTS[1],
        }
    }
}

pub struct MultiplexHub {
    signals: Signals,
    tables: RwLock<BTreeMap<DeviceIdentifier, SharedTable>>,
}

impl MultiplexHub {
    pub fn new() -> Self {
        Self {
            signals: Signals::new(EVENTS),
            tables: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_devices<I>(devices: I) -> Self
    where
        I: IntoIterator<Item = DeviceIdentifier>,
    {
        let hub = Self::new();
        for device in devices {
            hub.configure(device);
        }
        hub
    }

    /// Create an empty table for `device`. Returns `false` if one already exists.
    pub fn configure(&self, device: DeviceIdentifier) -> bool {
        let mut tables = self.write_tables();
        if tables.contains_key(&device) {
            return false;
        }
        TableConfigured {
            device: device.as_str(),
        }
        .log();
        let table = DeviceMultiplexTable::new(device.clone());
        tables.insert(device, Arc::new(RwLock::new(table)));
        true
    }

    /// Install a table rebuilt elsewhere, e.g. from a snapshot, replacing any
    /// table already configured for its device.
    pub fn install(&self, table: DeviceMultiplexTable) -> Option<SharedTable> {
        let device = table.device().clone();
        TableConfigured {
            device: device.as_str(),
        }
        .log();
        self.write_tables().insert(device, Arc::new(RwLock::new(table)))
    }

    /// Remove the table of `device` from the hub and hand it back.
    pub fn deconfigure(&self, device: &DeviceIdentifier) -> Option<SharedTable> {
        let removed = self.write_tables().remove(device)?;
        let record_count = read_table(&removed).record_count();
        TableDeconfigured {
            device: device.as_str(),
            record_count,
        }
        .log();
        Some(removed)
    }

    pub fn table(&self, device: &DeviceIdentifier) -> Option<SharedTable> {
        self.read_tables().get(device).cloned()
    }

    /// Configured devices, in identifier order.
    pub fn devices(&self) -> Vec<DeviceIdentifier> {
        self.read_tables().keys().cloned().collect()
    }

    /// Record a command from the user side and forward it to the device links.
    pub fn received_from_user(&self, message: Message) -> Result<usize, MultiplexError> {
        self.route(message, Direction::Uplink)
    }

    /// Record telemetry from a device link and forward it to the user side.
    pub fn received_from_device(&self, message: Message) -> Result<usize, MultiplexError> {
        self.route(message, Direction::Downlink)
    }

    pub fn query(&self, template: &Message) -> Option<Message> {
        let table = self.table(template.device())?;
        let found = read_table(&table).query(template);
        found
    }

    pub fn query_value(&self, device: &DeviceIdentifier, name: &str) -> Option<Variant> {
        let table = self.table(device)?;
        let found = read_table(&table).query_value(name);
        found
    }

    pub fn stats(&self, device: &DeviceIdentifier) -> Option<TableStats> {
        let table = self.table(device)?;
        let stats = read_table(&table).stats();
        Some(stats)
    }

    pub fn snapshot(&self, device: &DeviceIdentifier) -> Option<TableSnapshot> {
        let table = self.table(device)?;
        let snapshot = read_table(&table).snapshot();
        Some(snapshot)
    }

    pub fn select(&self, device: &DeviceIdentifier, criteria: &mut SelectCriteria) -> Result<(), MultiplexError> {
        let table = self
            .table(device)
            .ok_or_else(|| MultiplexError::UnknownDevice(device.clone()))?;
        write_table(&table).select(criteria);
        Ok(())
    }

    /// Store `message` in its device table, then emit it in `direction`.
    ///
    /// Returns the number of handlers the message was delivered to.
    fn route(&self, message: Message, direction: Direction) -> Result<usize, MultiplexError> {
        let table = self
            .table(message.device())
            .ok_or_else(|| MultiplexError::UnknownDevice(message.device().clone()))?;
        write_table(&table).update(message.clone())?;

        MessageRouted {
            device: message.device().as_str(),
            name: message.name(),
            direction: direction.label(),
        }
        .log();

        Ok(self.signals.emit_named(direction.event(), &Payload::Message(message)))
    }

    fn read_tables(&self) -> RwLockReadGuard<'_, BTreeMap<DeviceIdentifier, SharedTable>> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tables(&self) -> RwLockWriteGuard<'_, BTreeMap<DeviceIdentifier, SharedTable>> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MultiplexHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MultiplexHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiplexHub")
            .field("devices", &self.devices())
            .field("signals", &self.signals)
            .finish()
    }
}

impl CatalogNode for MultiplexHub {
    fn kind(&self) -> &'static str {
        "multiplex"
    }

    fn signals(&self) -> &Signals {
        &self.signals
    }

    fn handlers(&self) -> &'static [&'static str] {
        HANDLERS
    }

    fn invoke(&self, handler: HandlerRef, payload: &Payload) {
        let Payload::Message(message) = payload else {
            tracing::debug!(handler = handler.name(), "multiplex ignores non-message payload");
            return;
        };
        let routed = match handler.index() {
            RECEIVED_FROM_USER => self.received_from_user(message.clone()),
            RECEIVED_FROM_DEVICE => self.received_from_device(message.clone()),
            _ => return,
        };
        if let Err(e) = routed {
            MessageDropped {
                device: message.device().as_str(),
                name: message.name(),
                reason: &e,
            }
            .log();
        }
    }
}

pub(crate) fn read_table(table: &SharedTable) -> RwLockReadGuard<'_, DeviceMultiplexTable> {
    table.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_table(table: &SharedTable) -> RwLockWriteGuard<'_, DeviceMultiplexTable> {
    table.write().unwrap_or_else(PoisonError::into_inner)
}
