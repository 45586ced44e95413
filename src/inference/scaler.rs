/// Pre-fitted standard scaler.
///
/// The scaler is exported from the training environment as JSON:
///
/// ```json
/// { "mean": [0.21, 4.3, ...], "scale": [0.47, 2.9, ...] }
/// ```
///
/// `transform` applies `(x - mean) / scale` column by column. A zero scale
/// entry (a constant column at fit time) is treated as 1, matching how the
/// scaler was fitted. No fitting happens here.

use serde::Deserialize;
use std::path::Path;

use crate::model::ModelError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Builds a scaler from already-known statistics.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelError> {
        let scaler = Self { mean, scale };
        scaler.check_shape("<inline>")?;
        Ok(scaler)
    }

    /// Reads a scaler exported as JSON.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = super::read_artifact(path)?;
        let scaler: StandardScaler =
            serde_json::from_str(&text).map_err(|e| ModelError::MalformedArtifact {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        scaler.check_shape(&path.display().to_string())?;
        Ok(scaler)
    }

    fn check_shape(&self, origin: &str) -> Result<(), ModelError> {
        if self.mean.len() != self.scale.len() {
            return Err(ModelError::MalformedArtifact {
                path: origin.to_string(),
                reason: format!(
                    "mean has {} entries but scale has {}",
                    self.mean.len(),
                    self.scale.len()
                ),
            });
        }
        if self.mean.is_empty() {
            return Err(ModelError::MalformedArtifact {
                path: origin.to_string(),
                reason: "scaler has no features".to_string(),
            });
        }
        Ok(())
    }

    /// Number of features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Scales one sample. The length must match the fitted width exactly.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        if x.len() != self.mean.len() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.mean.len(),
                actual: x.len(),
            });
        }

        Ok(x.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(value, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (value - mean) / scale
            })
            .collect())
    }
}
