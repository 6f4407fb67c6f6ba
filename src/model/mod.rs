// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Records shared by the catalog and the multiplex: attributes, device
//! identifiers and keyed messages.

mod attribute;
mod device;
mod message;

pub use attribute::{AttributeRecord, Variant};
pub use device::DeviceIdentifier;
pub use message::{Message, MessageKey};
