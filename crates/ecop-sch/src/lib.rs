//! Shared data model for schematic edit compilation.
//!
//! This crate holds the read-only inputs of a compile call and the two IR
//! documents that flow through it. Everything here is serialisable with
//! `serde` so it can be loaded from and written to the JSON files exchanged
//! with the command producer and the execution layer.
//!
//! * [`catalog::Catalog`] – the part catalog, keyed by part id.
//! * [`snapshot::Snapshot`] – the schematic as it exists now.
//! * [`commands::CommandsDoc`] – the requested edit, in producer order.
//! * [`actions::ActionsDoc`] – the ordered, execution-ready edit.

pub mod actions;
pub mod catalog;
pub mod commands;
pub mod io;
pub mod position;
pub mod snapshot;

pub use actions::{Action, ActionsDoc};
pub use catalog::{Catalog, CatalogError, Part};
pub use commands::{Command, CommandsDoc};
pub use position::{Layer, Placement};
pub use snapshot::{Snapshot, SnapshotComponent, SnapshotError, SnapshotNet};
