//! Output Generation
//!
//! Per-tick statistics and the JSONL report logger.

pub mod logger;
pub mod stats;

pub use logger::*;
pub use stats::*;
