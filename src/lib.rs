//! ForceQC
//!
//! Force measurement analysis orchestration: stages CSV measurement files,
//! drives the external statistical analysis engine as a child process,
//! normalizes and catalogs its results, and synthesizes composite Markdown
//! reports that can blend in AI-generated narrative commentary.
//!
//! The HTTP layer in front of this crate is thin I/O; everything with
//! state, ordering, or failure-composition concerns lives here.

pub mod models;
pub mod services;
pub mod utils;

pub use models::settings::AppConfig;
pub use services::charts::ChartCatalog;
pub use services::engine::AnalysisEngine;
pub use services::history::HistoryStore;
pub use services::narrative::{NarrativeClient, NarrativeGenerator, NarrativeStore};
pub use services::orchestrator::TaskOrchestrator;
pub use services::report::ReportBuilder;
pub use utils::error::{AppError, AppResult};
pub use utils::paths::StorageLayout;
