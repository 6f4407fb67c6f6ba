// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Catalog wiring: event delivery between nodes, the deferred resolver that
//! connects them, and the reader that feeds a catalog document into it.

mod descriptor;
mod reader;
mod resolver;
pub(crate) mod signal;

pub use descriptor::{BindingDescriptor, EstablishedBinding, ReceiverDeclaration};
pub use reader::{Catalog, CatalogReader};
pub use resolver::{CatalogWiringResolver, FinalizeReport, NodeRole, Registrations, WiringDiagnostic};
pub use signal::{EventRef, HandlerRef, Payload, Signals};
