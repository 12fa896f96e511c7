//! Analysis Result Models
//!
//! The canonical, shape-stable representation of one run's analysis output
//! (`NormalizedResult`) and the typed section structs the report enumerates
//! field-by-field. Sections the system only passes through to API
//! consumers stay as raw JSON values.
//!
//! Every numeric field defaults, because the engine omits sections it has
//! no data for (for example spatial analysis on a dataset without
//! coordinates).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input-data quality summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub missing_values: u64,
    #[serde(default)]
    pub duplicate_rows: u64,
    #[serde(default)]
    pub force_min: f64,
    #[serde(default)]
    pub force_max: f64,
    #[serde(default)]
    pub force_mean: f64,
    #[serde(default)]
    pub force_std: f64,
}

/// Whole-dataset statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    #[serde(default)]
    pub samples: u64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub std_dev: f64,
    #[serde(default)]
    pub cv_percent: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub success_rate: f64,
}

/// Per-target-force statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetStats {
    #[serde(default)]
    pub target_force: f64,
    #[serde(default)]
    pub samples: u64,
    /// Combined success rate against both tolerance criteria, in percent
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub mean_force: f64,
    #[serde(default)]
    pub mean_abs_deviation: f64,
    #[serde(default)]
    pub max_abs_deviation: f64,
    #[serde(default)]
    pub std_dev: f64,
    #[serde(default)]
    pub tolerance_abs: f64,
    #[serde(default)]
    pub tolerance_pct: f64,
}

/// Process capability indices for one target force.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityStats {
    #[serde(default)]
    pub target_force: f64,
    #[serde(default)]
    pub cp: f64,
    #[serde(default)]
    pub cpk: f64,
    /// Engine-assigned rating, e.g. "excellent", "adequate", "inadequate"
    #[serde(default)]
    pub rating: String,
}

/// Performance broken down by fixture position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionStats {
    #[serde(default)]
    pub position_group: String,
    #[serde(default)]
    pub target_force: f64,
    #[serde(default)]
    pub samples: u64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub mean_abs_deviation: f64,
    #[serde(default)]
    pub std_dev: f64,
}

/// Repeatability/accuracy summary of the robot applying the force.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotConsistency {
    /// Coefficient of variation per target force, keyed by target label
    #[serde(default)]
    pub force_repeatability: BTreeMap<String, f64>,
    /// Positional standard deviation per axis, keyed by axis label
    #[serde(default)]
    pub position_accuracy: BTreeMap<String, f64>,
}

/// Variation attributed to sources beyond the measurement itself:
/// fixture position and robot behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiSourceVariation {
    #[serde(default)]
    pub performance_by_position: Vec<PositionStats>,
    #[serde(default)]
    pub robot_consistency: RobotConsistency,
}

/// Canonical shape of one completed run's analysis output.
///
/// Single-aggregate sections are plain objects here no matter how the
/// engine serialized them; collection sections are lists. See the result
/// normalizer for the coercion rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedResult {
    #[serde(default)]
    pub data_summary: DataSummary,
    #[serde(default)]
    pub overall_stats: OverallStats,
    #[serde(default)]
    pub target_analysis: Vec<TargetStats>,
    #[serde(default)]
    pub trend_stats: Vec<Value>,
    #[serde(default)]
    pub outlier_summary: Vec<Value>,
    #[serde(default)]
    pub stability_analysis: Vec<Value>,
    #[serde(default)]
    pub change_point_analysis: Vec<Value>,
    #[serde(default)]
    pub autocorr_analysis: Vec<Value>,
    #[serde(default)]
    pub process_capability: Vec<CapabilityStats>,
    #[serde(default)]
    pub spatial_analysis: BTreeMap<String, Value>,
    #[serde(default)]
    pub error_distribution_analysis: BTreeMap<String, Value>,
    #[serde(default)]
    pub multi_source_variation_analysis: MultiSourceVariation,
}

impl NormalizedResult {
    /// Total sample count across the per-target breakdown.
    pub fn total_samples(&self) -> u64 {
        self.target_analysis.iter().map(|t| t.samples).sum()
    }

    /// Success rate weighted by each target's sample count, in percent.
    /// All-zero sample counts yield 0 rather than dividing by zero.
    pub fn weighted_success_rate(&self) -> f64 {
        let total = self.total_samples();
        if total == 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .target_analysis
            .iter()
            .map(|t| t.success_rate * t.samples as f64)
            .sum();
        weighted / total as f64
    }

    /// Unweighted mean of the per-target success rates, in percent. Used by
    /// the report conclusion; history records use the weighted form.
    pub fn mean_success_rate(&self) -> f64 {
        if self.target_analysis.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.target_analysis.iter().map(|t| t.success_rate).sum();
        sum / self.target_analysis.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(samples: u64, success_rate: f64) -> TargetStats {
        TargetStats {
            samples,
            success_rate,
            ..TargetStats::default()
        }
    }

    #[test]
    fn test_weighted_success_rate() {
        let result = NormalizedResult {
            target_analysis: vec![target(3, 100.0), target(1, 0.0)],
            ..NormalizedResult::default()
        };
        assert_eq!(result.weighted_success_rate(), 75.0);
    }

    #[test]
    fn test_weighted_success_rate_zero_samples() {
        let result = NormalizedResult {
            target_analysis: vec![target(0, 100.0), target(0, 50.0)],
            ..NormalizedResult::default()
        };
        assert_eq!(result.weighted_success_rate(), 0.0);
    }

    #[test]
    fn test_mean_success_rate() {
        let result = NormalizedResult {
            target_analysis: vec![target(3, 100.0), target(1, 0.0)],
            ..NormalizedResult::default()
        };
        assert_eq!(result.mean_success_rate(), 50.0);
        assert_eq!(NormalizedResult::default().mean_success_rate(), 0.0);
    }

    #[test]
    fn test_sections_default_when_absent() {
        let result: NormalizedResult = serde_json::from_str("{}").unwrap();
        assert!(result.target_analysis.is_empty());
        assert_eq!(result.data_summary, DataSummary::default());
        assert!(result.spatial_analysis.is_empty());
    }

    #[test]
    fn test_target_stats_tolerates_unknown_fields() {
        let json = r#"{"target_force": 25.0, "samples": 10, "success_rate": 90.0, "median_force": 24.9}"#;
        let stats: TargetStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.target_force, 25.0);
        assert_eq!(stats.samples, 10);
    }
}
