//! Snapshot loading, validation and editing.
//!
//! A snapshot is the full users + boards data set fetched in one shot.
//! Edits rewrite it wholesale.

pub mod edit;
pub mod loader;
pub mod validate;

pub use edit::{AssignEdit, CardRef, HoursEdit};
pub use loader::{load_snapshot, save_snapshot};
pub use validate::{repair, validate, Repair, SnapshotWarning};
