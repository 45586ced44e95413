/// Scaling and classification of a feature vector.
///
/// Both artifacts are loaded once at start-up and never modified. Their
/// compatibility with the configured feature set is not checked up front;
/// a width mismatch surfaces as `ModelError::FeatureCountMismatch` on the
/// first prediction and ends that interaction.
///
/// Submodules:
/// - `scaler`: pre-fitted standard scaler.
/// - `classifier`: random forest / logistic decision functions.

pub mod classifier;
pub mod scaler;

use std::path::Path;

use crate::config::ModelConfig;
use crate::logging::{self, Component};
use crate::model::{FeatureSet, FeatureVector, ModelError, Potability};

pub use classifier::Classifier;
pub use scaler::StandardScaler;

/// Reads an artifact file into memory, mapping I/O failures to `ArtifactNotFound`.
fn read_artifact(path: &Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path)
        .map_err(|e| ModelError::ArtifactNotFound(format!("{} ({})", path.display(), e)))
}

/// Width disagreements between the artifacts and the configured feature set.
///
/// Any entry here means every prediction will fail with a feature count
/// mismatch; load still succeeds.
fn width_warnings(
    scaler: &StandardScaler,
    classifier: &Classifier,
    feature_set: FeatureSet,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if scaler.n_features() != feature_set.len() {
        warnings.push(format!(
            "Scaler expects {} features but feature set is {}; predictions will fail",
            scaler.n_features(),
            feature_set
        ));
    }
    if classifier.n_features() != scaler.n_features() {
        warnings.push(format!(
            "Classifier expects {} features but scaler produces {}; predictions will fail",
            classifier.n_features(),
            scaler.n_features()
        ));
    }
    warnings
}

/// The loaded scaler/classifier pair.
#[derive(Debug, Clone)]
pub struct Predictor {
    scaler: StandardScaler,
    classifier: Classifier,
}

impl Predictor {
    pub fn new(scaler: StandardScaler, classifier: Classifier) -> Self {
        Self { scaler, classifier }
    }

    /// Loads both artifacts from the configured paths.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        let scaler = StandardScaler::load(&config.scaler_path)?;
        logging::info(
            Component::Model,
            None,
            &format!(
                "Loaded scaler from {} ({} features)",
                config.scaler_path.display(),
                scaler.n_features()
            ),
        );

        let classifier = Classifier::load(&config.classifier_path)?;
        logging::info(
            Component::Model,
            None,
            &format!(
                "Loaded classifier from {} ({})",
                config.classifier_path.display(),
                classifier.describe()
            ),
        );

        for warning in width_warnings(&scaler, &classifier, config.feature_set) {
            logging::warn(Component::Model, None, &warning);
        }

        Ok(Self::new(scaler, classifier))
    }

    /// Scales the vector and returns the classifier's binary verdict.
    pub fn predict(&self, features: &FeatureVector) -> Result<Potability, ModelError> {
        let scaled = self.scaler.transform(&features.values)?;
        let class = self.classifier.predict_label(&scaled)?;
        Ok(Potability::from_class(class))
    }
}
