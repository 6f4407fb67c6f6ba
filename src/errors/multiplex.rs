// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::model::DeviceIdentifier;
use thiserror::Error;

/// Errors for multiplex table and hub operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultiplexError {
    /// A message addressed to one device was handed to another device's table.
    #[error("table for device '{table}' cannot store a message for device '{message}'")]
    DeviceMismatch {
        table: DeviceIdentifier,
        message: DeviceIdentifier,
    },

    /// The hub has no table configured for the device.
    #[error("device '{0}' is not configured on this multiplex")]
    UnknownDevice(DeviceIdentifier),
}
