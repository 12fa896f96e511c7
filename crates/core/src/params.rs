//! Analysis Parameters
//!
//! Submission parameters for one analysis run, and their validation into
//! the expanded form the engine adapter consumes. Tolerances may be given
//! as one scalar (broadcast over every target) or as a list matched
//! one-to-one with the targets; validation resolves both into per-target
//! lists so nothing downstream has to care about the input shape.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A tolerance specification: a single value applied to every target, or
/// one value per target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToleranceInput {
    Scalar(f64),
    List(Vec<f64>),
}

impl ToleranceInput {
    /// Expand into one value per target.
    ///
    /// A scalar is broadcast; a list must match the target count exactly.
    /// All values must be strictly positive.
    fn expand(&self, field: &str, target_count: usize) -> CoreResult<Vec<f64>> {
        match self {
            Self::Scalar(value) => {
                if *value <= 0.0 {
                    return Err(CoreError::validation(format!(
                        "{} must be greater than 0",
                        field
                    )));
                }
                Ok(vec![*value; target_count])
            }
            Self::List(values) => {
                if values.len() != target_count {
                    return Err(CoreError::validation(format!(
                        "{} list length ({}) must match the number of target forces ({})",
                        field,
                        values.len(),
                        target_count
                    )));
                }
                if values.iter().any(|v| *v <= 0.0) {
                    return Err(CoreError::validation(format!(
                        "{} values must be greater than 0",
                        field
                    )));
                }
                Ok(values.clone())
            }
        }
    }
}

/// Parameters for one analysis submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Reference to the uploaded measurement file (a `.csv` suffix is
    /// tolerated and stripped)
    pub source_id: String,
    /// Target force values, in newtons
    pub target_forces: Vec<f64>,
    /// Absolute tolerance in newtons, scalar or per-target list
    pub tolerance_abs: ToleranceInput,
    /// Percentage tolerance, scalar or per-target list
    pub tolerance_pct: ToleranceInput,
}

/// Parameters after validation: targets deduplicated and sorted ascending,
/// tolerances expanded to one entry per target.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParams {
    pub source_id: String,
    pub target_forces: Vec<f64>,
    pub tolerance_abs: Vec<f64>,
    pub tolerance_pct: Vec<f64>,
}

impl AnalysisParams {
    /// Validate and expand the parameters.
    ///
    /// Targets are deduplicated and sorted ascending; tolerances are
    /// expanded against the deduplicated target count, so a list tolerance
    /// must match the count of distinct targets.
    pub fn validate(&self) -> CoreResult<ValidatedParams> {
        if self.source_id.trim().is_empty() {
            return Err(CoreError::validation("source_id must not be empty"));
        }
        if self.target_forces.is_empty() {
            return Err(CoreError::validation("target force list must not be empty"));
        }
        if self.target_forces.iter().any(|f| *f <= 0.0 || !f.is_finite()) {
            return Err(CoreError::validation(
                "target forces must be finite and greater than 0",
            ));
        }

        let mut targets = self.target_forces.clone();
        targets.sort_by(|a, b| a.total_cmp(b));
        targets.dedup();

        let tolerance_abs = self.tolerance_abs.expand("tolerance_abs", targets.len())?;
        let tolerance_pct = self.tolerance_pct.expand("tolerance_pct", targets.len())?;

        Ok(ValidatedParams {
            source_id: source_stem(&self.source_id),
            target_forces: targets,
            tolerance_abs,
            tolerance_pct,
        })
    }
}

/// Strip a trailing `.csv` suffix from an uploaded-file reference so path
/// construction never doubles the extension.
fn source_stem(source_id: &str) -> String {
    source_id
        .strip_suffix(".csv")
        .unwrap_or(source_id)
        .to_string()
}
