// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concrete catalog nodes and the factory that builds them from configuration.
//! The multiplex hub lives in [`crate::multiplex`].

mod factory;
mod loopback;
mod terminal;

pub use factory::{NodeFactory, NodeHandle};
pub use loopback::{LoopbackDevice, ACK_ATTRIBUTE};
pub use terminal::{Terminal, TranscriptEntry};
