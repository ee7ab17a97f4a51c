//! Report Records
//!
//! Line records written to a run's JSONL report file.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::TickReport;

/// Generates a fresh run identifier.
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// First record of every report file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHeader {
    pub run_id: String,
    pub seed: u64,
    pub agent_count: u32,
    pub locale_count: u32,
    /// Name of the theory preset, if one was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theory: Option<String>,
}

impl RunHeader {
    pub fn new(seed: u64, agent_count: u32, locale_count: u32) -> Self {
        Self {
            run_id: generate_run_id(),
            seed,
            agent_count,
            locale_count,
            theory: None,
        }
    }

    pub fn with_theory(mut self, theory: impl Into<String>) -> Self {
        self.theory = Some(theory.into());
        self
    }
}

/// One line of a report file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum ReportRecord {
    Header(RunHeader),
    Tick(TickReport),
}
