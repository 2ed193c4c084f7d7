//! Core domain types for randex.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`item`] | Reference handles and enriched items |
//! | [`diagnostics`] | Per-item failure events and the sink they are recorded into |
//! | [`dashboard`] | List/detail view state and the placeholder lifecycle |

pub mod dashboard;
pub mod diagnostics;
pub mod item;

pub use dashboard::{Dashboard, Phase};
pub use diagnostics::{DiagnosticEvent, DiagnosticSink, FailureKind};
pub use item::{EnrichedItem, HandleError, ReferenceHandle};
