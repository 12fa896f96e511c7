//! Chart Models
//!
//! Descriptors for the chart images an analysis run emits, and the fixed
//! category ordering used everywhere charts are listed or rendered.

use serde::{Deserialize, Serialize};

/// Fixed set of chart categories, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartCategory {
    Basic,
    Deviation,
    ProcessControl,
    Spatial,
    Advanced,
    Capability,
    Dashboard,
    ErrorDistribution,
    MultiSource,
}

impl ChartCategory {
    /// All categories in their fixed display order.
    pub const ORDERED: [ChartCategory; 9] = [
        Self::Basic,
        Self::Deviation,
        Self::ProcessControl,
        Self::Spatial,
        Self::Advanced,
        Self::Capability,
        Self::Dashboard,
        Self::ErrorDistribution,
        Self::MultiSource,
    ];

    /// Position in the fixed display order.
    pub fn order(&self) -> usize {
        Self::ORDERED
            .iter()
            .position(|c| c == self)
            .unwrap_or(Self::ORDERED.len())
    }

    /// Human-readable section label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Basic Analysis",
            Self::Deviation => "Deviation Analysis",
            Self::ProcessControl => "Statistical Process Control",
            Self::Spatial => "Spatial Analysis",
            Self::Advanced => "Advanced Analysis",
            Self::Capability => "Process Capability",
            Self::Dashboard => "Quality Dashboard",
            Self::ErrorDistribution => "Error Distribution",
            Self::MultiSource => "Multi-Source Variation",
        }
    }
}

/// A generated chart image with its catalog metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDescriptor {
    /// Stable id (the file stem)
    pub chart_id: String,
    /// Display title
    pub title: String,
    /// Category used for grouping and ordering
    pub category: ChartCategory,
    /// One-line description of what the chart shows
    pub description: String,
    /// Reading guidance rendered alongside the chart
    pub interpretation: String,
    /// Absolute on-disk path of the image
    pub file_path: String,
    /// Public retrieval path served by the static file layer
    pub public_path: String,
    /// Bare file name within the run directory
    pub file_name: String,
}
