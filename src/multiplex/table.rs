// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-device message store with explicit overhead accounting.
//!
//! A [`DeviceMultiplexTable`] keeps the messages of one device in arrival order
//! together with three counters that never derive from one another:
//!
//! - `record_count`: application-domain records, one per distinct message name
//! - `overhead_temporal`: index maintenance operations performed
//! - `overhead_spatial`: index entries allocated
//!
//! # Index
//!
//! The name index is populated lazily. A lookup that finds its key in the index
//! is free; a lookup that has to scan the message sequence adds the key to the
//! index and charges both overhead counters. Updates never populate the index,
//! so repeated updates of a key cost nothing until the key is first queried.
//!
//! # Locking
//!
//! Queries take `&self` and may run concurrently; the index and the overhead
//! counters sit behind an internal mutex so a cache miss can populate them.
//! `update`, `select` and `remove` take `&mut self`. The hub keeps each table
//! in its own `RwLock` to get that shared/exclusive split per device.
//!
//! # Example
//!
//! ```rust
//! use the_tmtc_console::model::{DeviceIdentifier, Message, Variant};
//! use the_tmtc_console::multiplex::DeviceMultiplexTable;
//!
//! let sat = DeviceIdentifier::new("sat1");
//! let mut table = DeviceMultiplexTable::new(sat.clone());
//!
//! for voltage in 0..100u64 {
//!     table.update(Message::new(sat.clone(), "eps").with_attribute("voltage", voltage)).unwrap();
//! }
//! assert_eq!(table.record_count(), 1);
//! assert_eq!(table.overhead_temporal(), 0);
//!
//! let found = table.query(&Message::new(sat.clone(), "eps")).unwrap();
//! assert_eq!(found.attribute("voltage"), Some(&Variant::UInt(99)));
//! assert!(table.overhead_temporal() > 0);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::consts::{INDEX_ENTRY_FOOTPRINT, INDEX_OPERATION_COST};
use crate::errors::MultiplexError;
use crate::model::{AttributeRecord, DeviceIdentifier, Message, MessageKey, Variant};
use crate::multiplex::{Filter, OverheadCounter, SelectCriteria};
use crate::observability::messages::{multiplex::*, StructuredLog};

/// Lifecycle of a table. `Indexed` is never left once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableState {
    Empty,
    Populated,
    Indexed,
}

#[derive(Debug, Default)]
struct KeyIndex {
    positions: HashMap<String, usize>,
    temporal: OverheadCounter,
    spatial: OverheadCounter,
    warmed: bool,
}

/// Serializable table state for bulk save and restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub device: DeviceIdentifier,
    pub messages: Vec<Message>,
    pub overhead_temporal: u32,
    pub overhead_spatial: u32,
    pub record_count: u32,
}

/// Counter readout of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub state: TableState,
    pub record_count: u32,
    pub overhead_temporal: u32,
    pub overhead_spatial: u32,
}

/// Messages of one device, with overhead accounting.
#[derive(Debug)]
pub struct DeviceMultiplexTable {
    device: DeviceIdentifier,
    messages: Vec<Message>,
    /// Update sequence number of each message, parallel to `messages`.
    revisions: Vec<u64>,
    next_revision: u64,
    index: Mutex<KeyIndex>,
    record_count: u32,
    populated: bool,
}

impl DeviceMultiplexTable {
    pub fn new(device: DeviceIdentifier) -> Self {
        Self {
            device,
            messages: Vec::new(),
            revisions: Vec::new(),
            next_revision: 0,
            index: Mutex::new(KeyIndex::default()),
            record_count: 0,
            populated: false,
        }
    }

    /// Rebuild a table from a snapshot.
    ///
    /// Counters are taken from the snapshot as saved; `record_count` in particular
    /// is not recomputed from the message list. The index starts cold, and
    /// messages count as updated in their saved order.
    pub fn restore(snapshot: TableSnapshot) -> Self {
        let mut table = Self::new(snapshot.device);
        table.populated = !snapshot.messages.is_empty();
        table.messages = snapshot.messages;
        table.next_revision = table.messages.len() as u64;
        table.revisions = (0..table.next_revision).collect();
        table.set_overhead_temporal(snapshot.overhead_temporal);
        table.set_overhead_spatial(snapshot.overhead_spatial);
        table.set_record_count(snapshot.record_count);

        CountersRestored {
            device: table.device.as_str(),
            overhead_temporal: snapshot.overhead_temporal,
            overhead_spatial: snapshot.overhead_spatial,
            record_count: snapshot.record_count,
        }
        .log();
        table
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            device: self.device.clone(),
            messages: self.messages.clone(),
            overhead_temporal: self.overhead_temporal(),
            overhead_spatial: self.overhead_spatial(),
            record_count: self.record_count,
        }
    }

    pub fn device(&self) -> &DeviceIdentifier {
        &self.device
    }

    pub fn stats(&self) -> TableStats {
        let index = self.lock_index();
        TableStats {
            state: self.state_of(&index),
            record_count: self.record_count,
            overhead_temporal: index.temporal.get(),
            overhead_spatial: index.spatial.get(),
        }
    }

    pub fn state(&self) -> TableState {
        self.state_of(&self.lock_index())
    }

    fn state_of(&self, index: &KeyIndex) -> TableState {
        if index.warmed {
            TableState::Indexed
        } else if self.populated {
            TableState::Populated
        } else {
            TableState::Empty
        }
    }

    /// Stored messages in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn overhead_temporal(&self) -> u32 {
        self.lock_index().temporal.get()
    }

    /// Restore path only; live accounting happens inside the table operations.
    pub fn set_overhead_temporal(&mut self, value: u32) {
        self.index_mut().temporal = OverheadCounter::new(value);
    }

    pub fn overhead_spatial(&self) -> u32 {
        self.lock_index().spatial.get()
    }

    /// Restore path only; live accounting happens inside the table operations.
    pub fn set_overhead_spatial(&mut self, value: u32) {
        self.index_mut().spatial = OverheadCounter::new(value);
    }

    /// The number of application-domain records, independent of index entries.
    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    pub fn set_record_count(&mut self, value: u32) {
        self.record_count = value;
    }

    /// The stored message with the template's key, if any.
    pub fn query(&self, template: &Message) -> Option<Message> {
        if template.device() != &self.device {
            return None;
        }
        self.locate(template.name()).map(|pos| self.messages[pos].clone())
    }

    /// The current value of the attribute `name`.
    ///
    /// Of all stored messages carrying the attribute, the one updated last
    /// supplies the value.
    pub fn query_value(&self, name: &str) -> Option<Variant> {
        self.messages
            .iter()
            .zip(&self.revisions)
            .filter_map(|(message, revision)| message.attribute(name).map(|value| (revision, value)))
            .max_by_key(|(revision, _)| **revision)
            .map(|(_, value)| value.clone())
    }

    /// Insert `message`, or replace the stored message with the same key.
    pub fn update(&mut self, message: Message) -> Result<(), MultiplexError> {
        if message.device() != &self.device {
            return Err(MultiplexError::DeviceMismatch {
                table: self.device.clone(),
                message: message.device().clone(),
            });
        }
        match self.position_for_update(message.name()) {
            Some(pos) => {
                self.messages[pos] = message;
                self.touch(pos);
            }
            None => self.append(message),
        }
        Ok(())
    }

    /// Set the attribute `name` on the message keyed by `name`, creating the
    /// message if it does not exist yet.
    pub fn update_value(&mut self, name: &str, value: impl Into<Variant>) {
        let record = AttributeRecord::new(name, value);
        match self.position_for_update(name) {
            Some(pos) => {
                self.messages[pos].set_attribute(record);
                self.touch(pos);
            }
            None => {
                let mut message = Message::new(self.device.clone(), name);
                message.set_attribute(record);
                self.append(message);
            }
        }
    }

    /// Evaluate `criteria.filter` and write the matches into `criteria`.
    pub fn select(&mut self, criteria: &mut SelectCriteria) {
        criteria.clear();
        if let Filter::Name(name) = &criteria.filter {
            let found = self.locate(name);
            if let Some(pos) = found {
                criteria.push(&self.messages[pos]);
            }
            return;
        }
        for message in &self.messages {
            if criteria.filter.accepts(message) {
                criteria.push(message);
            }
        }
    }

    /// Remove the record with `key`.
    ///
    /// Dropping an index entry releases its footprint and re-pointing the entries
    /// behind it is charged as maintenance.
    pub fn remove(&mut self, key: &MessageKey) -> Option<Message> {
        if key.device != self.device {
            return None;
        }
        let pos = self.position_for_update(&key.name)?;
        let removed = self.messages.remove(pos);
        self.revisions.remove(pos);

        let index = self.index_mut();
        if index.positions.remove(&key.name).is_some() {
            index.spatial.release(INDEX_ENTRY_FOOTPRINT);
            index.temporal.charge(INDEX_OPERATION_COST);
        }
        for entry in index.positions.values_mut() {
            if *entry > pos {
                *entry -= 1;
                index.temporal.charge(INDEX_OPERATION_COST);
            }
        }
        self.record_count = self.record_count.saturating_sub(1);
        Some(removed)
    }

    fn append(&mut self, message: Message) {
        let revision = self.bump_revision();
        self.messages.push(message);
        self.revisions.push(revision);
        self.record_count = self.record_count.saturating_add(1);
        self.populated = true;
    }

    fn touch(&mut self, pos: usize) {
        let revision = self.bump_revision();
        self.revisions[pos] = revision;
    }

    fn bump_revision(&mut self) -> u64 {
        let revision = self.next_revision;
        self.next_revision += 1;
        revision
    }

    /// Find `name` through a warm index entry or a plain scan; never populates.
    fn position_for_update(&mut self, name: &str) -> Option<usize> {
        if let Some(&pos) = self.index_mut().positions.get(name) {
            return Some(pos);
        }
        self.messages.iter().position(|m| m.name() == name)
    }

    /// Find `name`, populating the index on a miss.
    fn locate(&self, name: &str) -> Option<usize> {
        let mut index = self.lock_index();
        if let Some(&pos) = index.positions.get(name) {
            return Some(pos);
        }
        let pos = self.messages.iter().position(|m| m.name() == name)?;

        index.positions.insert(name.to_string(), pos);
        index.temporal.charge(INDEX_OPERATION_COST);
        index.spatial.charge(INDEX_ENTRY_FOOTPRINT);
        index.warmed = true;
        IndexPopulated {
            device: self.device.as_str(),
            name,
            overhead_temporal: index.temporal.get(),
            overhead_spatial: index.spatial.get(),
        }
        .log();
        Some(pos)
    }

    fn lock_index(&self) -> MutexGuard<'_, KeyIndex> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn index_mut(&mut self) -> &mut KeyIndex {
        self.index.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sat() -> DeviceIdentifier {
        DeviceIdentifier::new("sat1")
    }

    fn eps(voltage: u64) -> Message {
        Message::new(sat(), "eps").with_attribute("voltage", voltage)
    }

    #[test]
    fn test_record_count_equals_distinct_keys() {
        let names = ["eps", "adcs", "obc", "eps", "adcs", "comms", "eps"];
        let mut table = DeviceMultiplexTable::new(sat());
        for name in names {
            table.update(Message::new(sat(), name)).unwrap();
        }
        assert_eq!(table.record_count(), 4);

        let mut reversed = DeviceMultiplexTable::new(sat());
        for name in names.iter().rev() {
            reversed.update(Message::new(sat(), *name)).unwrap();
        }
        assert_eq!(reversed.record_count(), 4);
    }

    #[test]
    fn test_update_existing_key_replaces_value() {
        let mut table = DeviceMultiplexTable::new(sat());
        table.update(eps(28)).unwrap();
        // warm the index so the second update goes through it
        assert!(table.query(&Message::new(sat(), "eps")).is_some());
        table.update(eps(31)).unwrap();

        assert_eq!(table.record_count(), 1);
        let found = table.query(&Message::new(sat(), "eps")).unwrap();
        assert_eq!(found.attribute("voltage"), Some(&Variant::UInt(31)));
    }

    #[test]
    fn test_query_missing_key_is_absent() {
        let mut table = DeviceMultiplexTable::new(sat());
        assert!(table.query(&Message::new(sat(), "eps")).is_none());

        table.update(eps(28)).unwrap();
        assert!(table.query(&Message::new(sat(), "adcs")).is_none());
        assert!(table.query(&Message::new(DeviceIdentifier::new("sat2"), "eps")).is_none());
        assert_eq!(table.query_value("temperature"), None);
    }

    #[test]
    fn test_query_value_returns_latest_update() {
        let mut table = DeviceMultiplexTable::new(sat());
        table.update_value("mode", "nominal");
        table.update_value("mode", "safe");

        assert_eq!(table.query_value("mode"), Some(Variant::Text("safe".to_string())));
        assert_eq!(table.record_count(), 1);
    }

    #[test]
    fn test_query_value_falls_back_to_message_attributes() {
        let mut table = DeviceMultiplexTable::new(sat());
        table.update(eps(28)).unwrap();
        table
            .update(Message::new(sat(), "power").with_attribute("voltage", 30u64))
            .unwrap();

        assert_eq!(table.query_value("voltage"), Some(Variant::UInt(30)));
    }

    #[test]
    fn test_query_value_follows_update_order_not_arrival_order() {
        let mut table = DeviceMultiplexTable::new(sat());
        table.update(eps(28)).unwrap();
        table
            .update(Message::new(sat(), "power").with_attribute("voltage", 30u64))
            .unwrap();
        table.update(eps(31)).unwrap();
        assert_eq!(table.query_value("voltage"), Some(Variant::UInt(31)));

        table.update_value("voltage", 12u64);
        assert_eq!(table.query_value("voltage"), Some(Variant::UInt(12)));

        table.remove(&MessageKey::new(sat(), "voltage"));
        assert_eq!(table.query_value("voltage"), Some(Variant::UInt(31)));
    }

    #[test]
    fn test_overhead_independent_of_record_count() {
        let mut table = DeviceMultiplexTable::new(sat());
        for v in 0..100 {
            table.update(eps(v)).unwrap();
        }
        assert_eq!(table.record_count(), 1);
        assert_eq!(table.overhead_temporal(), 0);
        assert_eq!(table.overhead_spatial(), 0);

        table.query(&Message::new(sat(), "eps")).unwrap();
        assert!(table.overhead_temporal() > 0);
        assert!(table.overhead_spatial() > 0);
        assert_eq!(table.record_count(), 1);
    }

    #[test]
    fn test_warm_queries_do_not_grow_overhead() {
        let mut table = DeviceMultiplexTable::new(sat());
        table.update(eps(28)).unwrap();
        table.update(Message::new(sat(), "adcs")).unwrap();

        let template = Message::new(sat(), "eps");
        table.query(&template);
        let (temporal, spatial) = (table.overhead_temporal(), table.overhead_spatial());
        for _ in 0..10 {
            table.query(&template);
        }
        assert_eq!(table.overhead_temporal(), temporal);
        assert_eq!(table.overhead_spatial(), spatial);

        let mut previous = temporal;
        for name in ["adcs", "eps", "adcs"] {
            table.query(&Message::new(sat(), name));
            assert!(table.overhead_temporal() >= previous);
            previous = table.overhead_temporal();
        }
        assert_eq!(table.overhead_temporal(), 2 * INDEX_OPERATION_COST);
        assert_eq!(table.overhead_spatial(), 2 * INDEX_ENTRY_FOOTPRINT);
    }

    #[test]
    fn test_state_progression() {
        let mut table = DeviceMultiplexTable::new(sat());
        assert_eq!(table.state(), TableState::Empty);

        table.update(eps(28)).unwrap();
        assert_eq!(table.state(), TableState::Populated);

        table.query(&Message::new(sat(), "eps"));
        assert_eq!(table.state(), TableState::Indexed);

        table.update(Message::new(sat(), "adcs")).unwrap();
        table.remove(&MessageKey::new(sat(), "eps"));
        assert_eq!(table.state(), TableState::Indexed);
    }

    #[test]
    fn test_update_rejects_foreign_device() {
        let mut table = DeviceMultiplexTable::new(sat());
        let err = table
            .update(Message::new(DeviceIdentifier::new("sat2"), "eps"))
            .unwrap_err();
        assert_eq!(
            err,
            MultiplexError::DeviceMismatch {
                table: sat(),
                message: DeviceIdentifier::new("sat2"),
            }
        );
        assert_eq!(table.record_count(), 0);
    }

    #[test]
    fn test_select_table_driven() {
        struct TestCase {
            name: &'static str,
            filter: Filter,
            expected: Vec<&'static str>,
        }

        let mut table = DeviceMultiplexTable::new(sat());
        table.update(eps(28)).unwrap();
        table
            .update(Message::new(sat(), "adcs").with_attribute("mode", "pointing"))
            .unwrap();
        table
            .update(Message::new(sat(), "obc").with_attribute("mode", "safe"))
            .unwrap();

        let test_cases = vec![
            TestCase { name: "all", filter: Filter::All, expected: vec!["eps", "adcs", "obc"] },
            TestCase { name: "by name", filter: Filter::Name("adcs".to_string()), expected: vec!["adcs"] },
            TestCase {
                name: "has attribute",
                filter: Filter::HasAttribute("mode".to_string()),
                expected: vec!["adcs", "obc"],
            },
            TestCase {
                name: "attribute equals",
                filter: Filter::AttributeEquals("mode".to_string(), Variant::from("safe")),
                expected: vec!["obc"],
            },
            TestCase {
                name: "predicate",
                filter: Filter::predicate(|m| m.name().starts_with('e')),
                expected: vec!["eps"],
            },
            TestCase { name: "no match", filter: Filter::Name("comms".to_string()), expected: vec![] },
        ];

        for case in test_cases {
            let mut criteria = SelectCriteria::new(case.filter);
            table.select(&mut criteria);
            let names: Vec<&str> = criteria.matches().iter().map(|m| m.name()).collect();
            assert_eq!(names, case.expected, "{}", case.name);
        }
    }

    #[test]
    fn test_select_projection_and_reuse() {
        let mut table = DeviceMultiplexTable::new(sat());
        table
            .update(
                Message::new(sat(), "eps")
                    .with_attribute("voltage", 28u64)
                    .with_attribute("current", 2u64),
            )
            .unwrap();

        let mut criteria = SelectCriteria::new(Filter::All).with_projection(["current"]);
        table.select(&mut criteria);
        table.select(&mut criteria);

        assert_eq!(criteria.matches().len(), 1);
        assert_eq!(criteria.matches()[0].attributes().len(), 1);
        assert_eq!(criteria.matches()[0].attribute("current"), Some(&Variant::UInt(2)));
    }

    #[test]
    fn test_select_empty_table_is_empty_result() {
        let mut table = DeviceMultiplexTable::new(sat());
        let mut criteria = SelectCriteria::new(Filter::HasAttribute("voltage".to_string()));
        table.select(&mut criteria);
        assert!(criteria.matches().is_empty());
    }

    #[test]
    fn test_remove_repoints_index_and_releases_footprint() {
        let mut table = DeviceMultiplexTable::new(sat());
        for name in ["eps", "adcs", "obc"] {
            table.update(Message::new(sat(), name)).unwrap();
        }
        for name in ["eps", "obc"] {
            table.query(&Message::new(sat(), name));
        }
        assert_eq!(table.overhead_spatial(), 2);
        assert_eq!(table.overhead_temporal(), 2);

        let removed = table.remove(&MessageKey::new(sat(), "eps")).unwrap();
        assert_eq!(removed.name(), "eps");
        assert_eq!(table.record_count(), 2);
        assert_eq!(table.overhead_spatial(), 1);
        // one removal plus re-pointing the "obc" entry
        assert_eq!(table.overhead_temporal(), 4);

        let obc = table.query(&Message::new(sat(), "obc")).unwrap();
        assert_eq!(obc.name(), "obc");
        assert!(table.remove(&MessageKey::new(sat(), "eps")).is_none());
    }

    #[test]
    fn test_overhead_release_clamps_at_zero() {
        let mut table = DeviceMultiplexTable::new(sat());
        table.update(eps(28)).unwrap();
        table.query(&Message::new(sat(), "eps"));
        // a restore path lowered the counter below the live index footprint
        table.set_overhead_spatial(0);

        table.remove(&MessageKey::new(sat(), "eps"));
        assert_eq!(table.overhead_spatial(), 0);

        table.set_record_count(0);
        table.update(eps(1)).unwrap();
        table.set_record_count(0);
        table.remove(&MessageKey::new(sat(), "eps"));
        assert_eq!(table.record_count(), 0);
    }

    #[test]
    fn test_snapshot_restore_keeps_counters_verbatim() {
        let mut table = DeviceMultiplexTable::new(sat());
        table.update(eps(28)).unwrap();
        table.update_value("mode", "safe");
        table.query(&Message::new(sat(), "eps"));
        table.set_record_count(40);

        let json = serde_json::to_string(&table.snapshot()).unwrap();
        let snapshot: TableSnapshot = serde_json::from_str(&json).unwrap();
        let restored = DeviceMultiplexTable::restore(snapshot);

        assert_eq!(restored.record_count(), 40);
        assert_eq!(restored.overhead_temporal(), 1);
        assert_eq!(restored.overhead_spatial(), 1);
        assert_eq!(restored.messages().len(), 2);
        assert_eq!(restored.state(), TableState::Populated);
        assert_eq!(restored.query_value("mode"), Some(Variant::Text("safe".to_string())));
    }
}
