//! Shared report types and serialization for the border simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod record;
pub mod report;

pub use record::{generate_run_id, ReportRecord, RunHeader};
pub use report::{CountryReport, LocaleReport, StateCounts, TickReport};
