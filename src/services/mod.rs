//! Services
//!
//! Business logic: the analysis engine adapter, result normalization, task
//! orchestration, the history and chart catalogs, narrative generation, and
//! report synthesis.

pub mod charts;
pub mod engine;
pub mod history;
pub mod narrative;
pub mod normalizer;
pub mod orchestrator;
pub mod report;
