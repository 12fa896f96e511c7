//! Data Models
//!
//! Application-level data structures. The task model and analysis
//! parameters live in `forceqc-core` and are re-exported here so callers
//! have a single import surface.

pub mod analysis;
pub mod chart;
pub mod history;
pub mod narrative;
pub mod settings;

pub use forceqc_core::{AnalysisParams, Task, TaskStatus, ToleranceInput, ValidatedParams};
