// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-device message tables and the hub that routes messages through them.

mod hub;
mod overhead;
mod select;
mod table;

pub use hub::{Direction, MultiplexHub, SharedTable};
pub use overhead::OverheadCounter;
pub use select::{Filter, SelectCriteria};
pub use table::{DeviceMultiplexTable, TableSnapshot, TableState, TableStats};
