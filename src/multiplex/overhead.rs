// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// One overhead accumulator of a device table.
///
/// Charges saturate at `u32::MAX`; releases clamp at zero instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverheadCounter(u32);

impl OverheadCounter {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn charge(&mut self, amount: u32) {
        self.0 = self.0.saturating_add(amount);
    }

    pub fn release(&mut self, amount: u32) {
        self.0 = self.0.saturating_sub(amount);
    }
}
