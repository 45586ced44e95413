/// RawMeasurements, FeatureVector, Potability, ModelError
/// core data structures and error handling
///
/// Core data types for the water potability predictor.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no model evaluation, only types and the
/// fixed-order feature vector assembly that the scaler depends on.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Feature codes
// ---------------------------------------------------------------------------

/// Raw measurement codes, in the order the scaler and classifier were fitted on.
pub const RAW_FEATURES: [&str; 9] = [
    "NH4", "BSK5", "Suspended", "O2", "NO3", "NO2", "SO4", "PO4", "CL",
];

/// Derived feature codes, appended after the raw features in the 12-feature variant.
pub const DERIVED_FEATURES: [&str; 3] = ["NO3_NO2", "NH4_NO2", "O2_per_Suspended"];

// ---------------------------------------------------------------------------
// Measurement types
// ---------------------------------------------------------------------------

/// One water sample as entered by the user, all values in mg/L.
///
/// Field names on the wire match the feature codes (`NH4`, `BSK5`, ...)
/// so the same struct backs both the HTML form and the JSON API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurements {
    #[serde(rename = "NH4")]
    pub nh4: f64,
    #[serde(rename = "BSK5")]
    pub bsk5: f64,
    #[serde(rename = "Suspended")]
    pub suspended: f64,
    #[serde(rename = "O2")]
    pub o2: f64,
    #[serde(rename = "NO3")]
    pub no3: f64,
    #[serde(rename = "NO2")]
    pub no2: f64,
    #[serde(rename = "SO4")]
    pub so4: f64,
    #[serde(rename = "PO4")]
    pub po4: f64,
    #[serde(rename = "CL")]
    pub cl: f64,
}

impl RawMeasurements {
    /// Values in `RAW_FEATURES` order.
    pub fn to_array(&self) -> [f64; 9] {
        [
            self.nh4,
            self.bsk5,
            self.suspended,
            self.o2,
            self.no3,
            self.no2,
            self.so4,
            self.po4,
            self.cl,
        ]
    }

    /// `(code, value)` pairs in `RAW_FEATURES` order, for labelled display.
    pub fn labelled(&self) -> Vec<(&'static str, f64)> {
        RAW_FEATURES.iter().copied().zip(self.to_array()).collect()
    }
}

/// Which feature layout the loaded scaler/classifier pair expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// The nine raw measurements only.
    #[default]
    Raw,
    /// Nine raw measurements followed by the three derived ratios.
    Derived,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        match self {
            FeatureSet::Raw => RAW_FEATURES.len(),
            FeatureSet::Derived => RAW_FEATURES.len() + DERIVED_FEATURES.len(),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        match self {
            FeatureSet::Raw => RAW_FEATURES.to_vec(),
            FeatureSet::Derived => RAW_FEATURES
                .iter()
                .chain(DERIVED_FEATURES.iter())
                .copied()
                .collect(),
        }
    }
}

impl std::fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureSet::Raw => write!(f, "raw ({} features)", self.len()),
            FeatureSet::Derived => write!(f, "derived ({} features)", self.len()),
        }
    }
}

/// An ordered, named feature vector ready for scaling.
///
/// Created fresh for every prediction and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub feature_set: FeatureSet,
    pub names: Vec<&'static str>,
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Prediction types
// ---------------------------------------------------------------------------

/// Classifier class label that means "safe to drink".
pub const POTABLE_CLASS: i64 = 1;

/// Binary potability label. No confidence score is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Potability {
    Potable,
    NotPotable,
}

impl Potability {
    /// Maps a raw classifier class label onto the binary outcome.
    pub fn from_class(class: i64) -> Self {
        if class == POTABLE_CLASS {
            Potability::Potable
        } else {
            Potability::NotPotable
        }
    }

    pub fn is_potable(&self) -> bool {
        matches!(self, Potability::Potable)
    }
}

impl std::fmt::Display for Potability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Potability::Potable => write!(f, "Safe"),
            Potability::NotPotable => write!(f, "Not Safe"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when loading or evaluating the model artifacts.
#[derive(Debug, PartialEq)]
pub enum ModelError {
    /// An artifact file does not exist or could not be opened.
    ArtifactNotFound(String),
    /// An artifact file was read but its contents are unusable.
    MalformedArtifact { path: String, reason: String },
    /// The feature vector length does not match what the artifact was fitted on.
    FeatureCountMismatch { expected: usize, actual: usize },
    /// The classifier contains no trees or no classes.
    EmptyModel,
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::ArtifactNotFound(path) => write!(f, "Model artifact not found: {}", path),
            ModelError::MalformedArtifact { path, reason } => {
                write!(f, "Malformed model artifact {}: {}", path, reason)
            }
            ModelError::FeatureCountMismatch { expected, actual } => write!(
                f,
                "Feature count mismatch: model expects {} features, got {}",
                expected, actual
            ),
            ModelError::EmptyModel => write!(f, "Classifier has no trees or classes"),
        }
    }
}

impl std::error::Error for ModelError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
