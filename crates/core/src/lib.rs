//! ForceQC Core
//!
//! Foundational types shared across the ForceQC workspace: the core error
//! type, the task model and its lifecycle rules, analysis parameter
//! validation, the `OneOrMany` shape primitive used at the engine result
//! boundary, and the task-store abstraction the orchestrator is built on.
//!
//! This crate stays dependency-light (serde + tokio sync + thiserror) so
//! that every other crate can depend on it without pulling in the
//! application stack.

pub mod error;
pub mod params;
pub mod shape;
pub mod store;
pub mod task;

pub use error::{CoreError, CoreResult};
pub use params::{AnalysisParams, ToleranceInput, ValidatedParams};
pub use shape::OneOrMany;
pub use store::{InMemoryTaskStore, TaskStore};
pub use task::{Task, TaskStatus};
