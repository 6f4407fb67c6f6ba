// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque, immutable name of one device within the system.
///
/// Identifiers are handed out by the device registry; cloning shares the
/// underlying string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceIdentifier(Arc<str>);

impl DeviceIdentifier {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceIdentifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DeviceIdentifier {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identifiers_compare_by_value() {
        let a = DeviceIdentifier::new("sat1");
        let b = DeviceIdentifier::from("sat1".to_string());
        assert_eq!(a, b);

        let set: HashSet<DeviceIdentifier> = [a, b, DeviceIdentifier::new("sat2")].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_identifier_serializes_as_plain_string() {
        let id = DeviceIdentifier::new("ground-station");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ground-station\"");
        let back: DeviceIdentifier = serde_json::from_str("\"ground-station\"").unwrap();
        assert_eq!(back.as_str(), "ground-station");
    }
}
