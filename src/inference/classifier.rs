/// Pre-trained potability classifier.
///
/// The classifier is exported as tagged JSON. Two shapes are understood:
///
/// - `"random_forest"`: an ensemble of decision trees in flattened array form
///   (one entry per node in each of `children_left`, `children_right`,
///   `feature`, `threshold`, `value`; `-1` children mark a leaf).
/// - `"logistic"`: a linear decision function `coef · x + intercept`.
///
/// Both return a raw class label; mapping that label onto potability is
/// the caller's job.

use serde::Deserialize;
use std::path::Path;

use crate::model::ModelError;

/// Child index marking a leaf node.
const LEAF: i64 = -1;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    RandomForest(RandomForest),
    Logistic(LogisticModel),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    /// Width of the feature vector the forest was fitted on.
    pub n_features: usize,
    /// Class labels, indexed the same way as each leaf's `value` row.
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts (or weighted fractions), one row per node.
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    pub coef: Vec<f64>,
    pub intercept: f64,
    /// `[negative, positive]` class labels.
    pub classes: Vec<i64>,
}

impl Classifier {
    /// Reads a classifier exported as JSON.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = super::read_artifact(path)?;
        let classifier: Classifier =
            serde_json::from_str(&text).map_err(|e| ModelError::MalformedArtifact {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        classifier.check_structure(&path.display().to_string())?;
        Ok(classifier)
    }

    /// Number of features the classifier was fitted on.
    pub fn n_features(&self) -> usize {
        match self {
            Classifier::RandomForest(forest) => forest.n_features,
            Classifier::Logistic(model) => model.coef.len(),
        }
    }

    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            Classifier::RandomForest(forest) => format!(
                "random forest, {} trees, {} features",
                forest.trees.len(),
                forest.n_features
            ),
            Classifier::Logistic(model) => {
                format!("logistic regression, {} features", model.coef.len())
            }
        }
    }

    /// Predicts the class label for one already-scaled sample.
    pub fn predict_label(&self, x: &[f64]) -> Result<i64, ModelError> {
        if x.len() != self.n_features() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features(),
                actual: x.len(),
            });
        }
        match self {
            Classifier::RandomForest(forest) => forest.predict_label(x),
            Classifier::Logistic(model) => model.predict_label(x),
        }
    }

    fn check_structure(&self, path: &str) -> Result<(), ModelError> {
        let malformed = |reason: String| ModelError::MalformedArtifact {
            path: path.to_string(),
            reason,
        };

        match self {
            Classifier::RandomForest(forest) => {
                if forest.trees.is_empty() || forest.classes.is_empty() {
                    return Err(ModelError::EmptyModel);
                }
                for (t, tree) in forest.trees.iter().enumerate() {
                    tree.check_structure(forest.n_features, forest.classes.len())
                        .map_err(|reason| malformed(format!("tree {}: {}", t, reason)))?;
                }
            }
            Classifier::Logistic(model) => {
                if model.classes.len() != 2 {
                    return Err(malformed(format!(
                        "logistic model needs exactly 2 classes, found {}",
                        model.classes.len()
                    )));
                }
                if model.coef.is_empty() {
                    return Err(ModelError::EmptyModel);
                }
            }
        }
        Ok(())
    }
}

impl RandomForest {
    /// Averages per-tree class probabilities; the first class with the highest
    /// mean probability wins.
    fn predict_label(&self, x: &[f64]) -> Result<i64, ModelError> {
        let mut totals = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (total, p) in totals.iter_mut().zip(tree.predict_proba(x)) {
                *total += p;
            }
        }

        let mut best = 0;
        for (i, total) in totals.iter().enumerate() {
            if *total > totals[best] {
                best = i;
            }
        }
        self.classes.get(best).copied().ok_or(ModelError::EmptyModel)
    }
}

impl DecisionTree {
    /// Index of the leaf this sample lands in.
    ///
    /// Trees were grown on single-precision inputs, so each value is rounded
    /// to `f32` before it is compared with the split threshold.
    fn leaf_for(&self, x: &[f64]) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let value = x[self.feature[node] as usize] as f32 as f64;
            node = if value <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let counts = &self.value[self.leaf_for(x)];
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            counts.iter().map(|c| c / total).collect()
        } else {
            vec![0.0; counts.len()]
        }
    }

    /// Validates array lengths and child/feature indices so traversal
    /// cannot index out of bounds or loop.
    fn check_structure(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n_nodes = self.children_left.len();
        if n_nodes == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n_nodes
            || self.feature.len() != n_nodes
            || self.threshold.len() != n_nodes
            || self.value.len() != n_nodes
        {
            return Err("node arrays have different lengths".to_string());
        }

        for node in 0..n_nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {} has only one child", node));
                }
                if self.value[node].len() != n_classes {
                    return Err(format!(
                        "leaf {} has {} class values, expected {}",
                        node,
                        self.value[node].len(),
                        n_classes
                    ));
                }
                continue;
            }
            // Children always follow their parent in depth-first export order,
            // which also rules out cycles.
            for child in [left, right] {
                if child <= node as i64 || child as usize >= n_nodes {
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {} splits on invalid feature {}", node, feature));
            }
        }
        Ok(())
    }
}

impl LogisticModel {
    /// `coef · x + intercept`; positive scores select the second class.
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.coef.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + self.intercept
    }

    fn predict_label(&self, x: &[f64]) -> Result<i64, ModelError> {
        let class = if self.decision_function(x) > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        };
        Ok(class)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
