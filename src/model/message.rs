// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AttributeRecord, DeviceIdentifier, Variant};

/// Identifying key of a [`Message`]: the device it belongs to and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageKey {
    pub device: DeviceIdentifier,
    pub name: String,
}

impl MessageKey {
    pub fn new(device: DeviceIdentifier, name: impl Into<String>) -> Self {
        Self {
            device,
            name: name.into(),
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.name)
    }
}

/// A telemetry or telecommand record keyed by (device, name).
///
/// The wire encoding belongs to the message codec; the console only needs the
/// key and a settable attribute collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    device: DeviceIdentifier,
    name: String,
    #[serde(default)]
    attributes: Vec<AttributeRecord>,
}

impl Message {
    pub fn new(device: DeviceIdentifier, name: impl Into<String>) -> Self {
        Self {
            device,
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.set_attribute(AttributeRecord::new(name, value));
        self
    }

    pub fn device(&self) -> &DeviceIdentifier {
        &self.device
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> MessageKey {
        MessageKey::new(self.device.clone(), self.name.clone())
    }

    pub fn matches_key(&self, key: &MessageKey) -> bool {
        self.device == key.device && self.name == key.name
    }

    pub fn attributes(&self) -> &[AttributeRecord] {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Vec<AttributeRecord>) {
        self.attributes = attributes;
    }

    pub fn attribute(&self, name: &str) -> Option<&Variant> {
        self.attributes
            .iter()
            .find(|a| a.name() == name)
            .map(AttributeRecord::value)
    }

    /// Replace the attribute with the same name, or append it.
    pub fn set_attribute(&mut self, record: AttributeRecord) {
        match self.attributes.iter_mut().find(|a| a.name() == record.name()) {
            Some(slot) => *slot = record,
            None => self.attributes.push(record),
        }
    }

    /// Copy of this message keeping only the named attributes.
    pub fn project(&self, names: &[String]) -> Message {
        Message {
            device: self.device.clone(),
            name: self.name.clone(),
            attributes: self
                .attributes
                .iter()
                .filter(|a| names.iter().any(|n| n == a.name()))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.name)?;
        for (i, record) in self.attributes.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}={}", sep, record.name(), record.value())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sat() -> DeviceIdentifier {
        DeviceIdentifier::new("sat1")
    }

    #[test]
    fn test_set_attribute_replaces_by_name() {
        let mut m = Message::new(sat(), "eps")
            .with_attribute("voltage", 28u64)
            .with_attribute("current", 2u64);
        m.set_attribute(AttributeRecord::new("voltage", 27u64));

        assert_eq!(m.attributes().len(), 2);
        assert_eq!(m.attribute("voltage"), Some(&Variant::UInt(27)));
        assert_eq!(m.attribute("missing"), None);
    }

    #[test]
    fn test_project_keeps_requested_attributes_in_order() {
        let m = Message::new(sat(), "eps")
            .with_attribute("voltage", 28u64)
            .with_attribute("current", 2u64)
            .with_attribute("mode", "nominal");
        let projected = m.project(&["mode".to_string(), "voltage".to_string()]);

        let names: Vec<&str> = projected.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["voltage", "mode"]);
        assert_eq!(projected.key(), m.key());
    }

    #[test]
    fn test_key_display() {
        let key = MessageKey::new(sat(), "adcs");
        assert_eq!(key.to_string(), "sat1/adcs");
        assert!(Message::new(sat(), "adcs").matches_key(&key));
    }

    #[test]
    fn test_display_lists_attributes_in_order() {
        let m = Message::new(sat(), "eps")
            .with_attribute("voltage", 28u64)
            .with_attribute("ack", true);
        assert_eq!(m.to_string(), "sat1/eps voltage=28, ack=true");
        assert_eq!(Message::new(sat(), "obc").to_string(), "sat1/obc");
    }
}
