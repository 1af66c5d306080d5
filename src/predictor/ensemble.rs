//! Two-level stacked ensembles loaded from exported JSON.
//!
//! Every target owns its own ensemble: heterogeneous base regressors each map
//! the feature vector to a scalar, and a linear meta-model combines the base
//! outputs into the final prediction. Training happens elsewhere; this module
//! only evaluates fitted weights.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::artifacts::read_json;
use crate::error::{ConfigurationError, Result};
use crate::predictor::tree::RegressionTree;
use crate::predictor::{PredictTarget, Target};

/// Linear model `coefficients · x + intercept`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        ArrayView1::from(&self.coefficients[..]).dot(&x) + self.intercept
    }
}

/// Fully connected layer, `weights` is `outputs × inputs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

impl DenseLayer {
    fn forward(&self, x: &Array1<f64>) -> Array1<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| ArrayView1::from(&row[..]).dot(x) + bias)
            .collect()
    }
}

/// A fitted base regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Linear(LinearModel),
    /// Random forest or extra trees: mean of the tree predictions
    Forest { trees: Vec<RegressionTree> },
    /// Gradient boosting: `init + learning_rate · Σ tree(x)`
    GradientBoosting {
        init: f64,
        learning_rate: f64,
        trees: Vec<RegressionTree>,
    },
    /// Multi-layer perceptron with ReLU hidden layers and identity output
    Mlp { layers: Vec<DenseLayer> },
}

impl Regressor {
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        match self {
            Regressor::Linear(model) => {
                if model.coefficients.len() != n_features {
                    return Err(format!(
                        "{} coefficients for {} features",
                        model.coefficients.len(),
                        n_features
                    ));
                }
            }
            Regressor::Forest { trees } | Regressor::GradientBoosting { trees, .. } => {
                if trees.is_empty() && matches!(self, Regressor::Forest { .. }) {
                    return Err("forest has no trees".to_string());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(n_features)
                        .map_err(|reason| format!("tree {}: {}", i, reason))?;
                }
            }
            Regressor::Mlp { layers } => {
                let mut width = n_features;
                for (i, layer) in layers.iter().enumerate() {
                    if layer.weights.is_empty()
                        || layer.weights.len() != layer.biases.len()
                        || layer.weights.iter().any(|row| row.len() != width)
                    {
                        return Err(format!("layer {} does not accept {} inputs", i, width));
                    }
                    width = layer.weights.len();
                }
                if layers.is_empty() || width != 1 {
                    return Err("network must end in a single output".to_string());
                }
            }
        }
        Ok(())
    }

    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        match self {
            Regressor::Linear(model) => model.predict(x),
            Regressor::Forest { trees } => {
                let x = x.to_vec();
                trees.iter().map(|t| t.predict(&x)).sum::<f64>() / trees.len() as f64
            }
            Regressor::GradientBoosting {
                init,
                learning_rate,
                trees,
            } => {
                let x = x.to_vec();
                init + learning_rate * trees.iter().map(|t| t.predict(&x)).sum::<f64>()
            }
            Regressor::Mlp { layers } => {
                let mut activation = x.to_owned();
                let last = layers.len() - 1;
                for (i, layer) in layers.iter().enumerate() {
                    activation = layer.forward(&activation);
                    if i < last {
                        activation.mapv_inplace(|v| v.max(0.0));
                    }
                }
                activation[0]
            }
        }
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Regressor::Linear(_) => "linear",
            Regressor::Forest { .. } => "forest",
            Regressor::GradientBoosting { .. } => "gradient_boosting",
            Regressor::Mlp { .. } => "mlp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRegressor {
    pub name: String,
    #[serde(flatten)]
    pub model: Regressor,
}

/// Bases plus linear meta-model for a single target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedModel {
    pub bases: Vec<BaseRegressor>,
    pub meta: LinearModel,
}

impl StackedModel {
    fn validate(&self, target: Target, n_features: usize) -> Result<()> {
        let malformed = |name: &str, reason: String| ConfigurationError::MalformedRegressor {
            target: target.name().to_string(),
            name: name.to_string(),
            reason,
        };
        if self.bases.is_empty() {
            return Err(malformed("meta", "no base regressors".to_string()));
        }
        for base in &self.bases {
            base.model
                .validate(n_features)
                .map_err(|reason| malformed(&base.name, reason))?;
        }
        if self.meta.coefficients.len() != self.bases.len() {
            return Err(malformed(
                "meta",
                format!(
                    "{} coefficients for {} base regressors",
                    self.meta.coefficients.len(),
                    self.bases.len()
                ),
            ));
        }
        Ok(())
    }

    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        let base_predictions: Array1<f64> =
            self.bases.iter().map(|base| base.model.predict(x)).collect();
        self.meta.predict(base_predictions.view())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEnsemble {
    n_features: usize,
    targets: HashMap<String, StackedModel>,
}

/// The four per-target stacked ensembles as exported by training.
#[derive(Debug, Clone)]
pub struct StackedEnsemble {
    n_features: usize,
    models: [StackedModel; 4],
}

impl StackedEnsemble {
    /// Validate and assemble an ensemble, one [StackedModel] per target
    pub fn new(n_features: usize, mut targets: HashMap<String, StackedModel>) -> Result<Self> {
        let mut take = |target: Target| -> Result<StackedModel> {
            let model = targets
                .remove(target.name())
                .ok_or_else(|| ConfigurationError::MissingTarget(target.name().to_string()))?;
            model.validate(target, n_features)?;
            Ok(model)
        };
        let models = [
            take(Target::R)?,
            take(Target::K)?,
            take(Target::Alpha)?,
            take(Target::Beta)?,
        ];
        Ok(StackedEnsemble { n_features, models })
    }

    /// Load `stacked_models.json`
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw: RawEnsemble = read_json(path)?;
        let ensemble = StackedEnsemble::new(raw.n_features, raw.targets)?;
        for (target, model) in Target::ALL.iter().zip(&ensemble.models) {
            let kinds: Vec<&str> = model.bases.iter().map(|b| b.model.kind()).collect();
            tracing::debug!("Loaded {} ensemble with bases {:?}", target, kinds);
        }
        Ok(ensemble)
    }

    pub fn model(&self, target: Target) -> &StackedModel {
        &self.models[target.index()]
    }
}

impl PredictTarget for StackedEnsemble {
    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn predict_target(&self, target: Target, features: ArrayView1<f64>) -> f64 {
        self.model(target).predict(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn linear_target(coefficients: Vec<f64>, intercept: f64) -> StackedModel {
        StackedModel {
            bases: vec![
                BaseRegressor {
                    name: "ridge".to_string(),
                    model: Regressor::Linear(LinearModel {
                        coefficients,
                        intercept,
                    }),
                },
                BaseRegressor {
                    name: "gbr".to_string(),
                    model: Regressor::GradientBoosting {
                        init: 1.0,
                        learning_rate: 0.5,
                        trees: vec![RegressionTree::leaf(2.0), RegressionTree::leaf(-1.0)],
                    },
                },
            ],
            meta: LinearModel {
                coefficients: vec![0.5, 0.5],
                intercept: 0.1,
            },
        }
    }

    fn targets() -> HashMap<String, StackedModel> {
        Target::ALL
            .iter()
            .map(|t| (t.name().to_string(), linear_target(vec![1.0, 2.0], 0.0)))
            .collect()
    }

    #[test]
    fn stacks_base_predictions() {
        let ensemble = StackedEnsemble::new(2, targets()).unwrap();
        // linear: 1 + 4 = 5, boosting: 1 + 0.5 * (2 - 1) = 1.5
        let prediction = ensemble.predict_target(Target::R, array![1.0, 2.0].view());
        assert_relative_eq!(prediction, 0.5 * 5.0 + 0.5 * 1.5 + 0.1);
    }

    #[test]
    fn missing_target_is_fatal() {
        let mut targets = targets();
        targets.remove("beta_target");
        let err = StackedEnsemble::new(2, targets).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingTarget(name) if name == "beta_target"));
    }

    #[test]
    fn coefficient_mismatch_is_fatal() {
        let mut targets = targets();
        targets.insert("K_target".to_string(), linear_target(vec![1.0], 0.0));
        assert!(matches!(
            StackedEnsemble::new(2, targets),
            Err(ConfigurationError::MalformedRegressor { .. })
        ));
    }

    #[test]
    fn mlp_applies_relu_between_layers() {
        let mlp = Regressor::Mlp {
            layers: vec![
                DenseLayer {
                    weights: vec![vec![1.0, 0.0], vec![0.0, -1.0]],
                    biases: vec![0.0, 0.0],
                },
                DenseLayer {
                    weights: vec![vec![1.0, 1.0]],
                    biases: vec![0.5],
                },
            ],
        };
        assert!(mlp.validate(2).is_ok());
        // hidden = relu([2, -3]) = [2, 0]
        assert_eq!(mlp.predict(array![2.0, 3.0].view()), 2.5);
    }

    #[test]
    fn forest_averages_trees() {
        let forest = Regressor::Forest {
            trees: vec![RegressionTree::leaf(1.0), RegressionTree::leaf(3.0)],
        };
        assert_eq!(forest.predict(array![0.0].view()), 2.0);
    }

    #[test]
    fn regressors_deserialize_by_kind() {
        let json = r#"{"name": "ridge", "kind": "linear", "coefficients": [1.0], "intercept": 2.0}"#;
        let base: BaseRegressor = serde_json::from_str(json).unwrap();
        assert_eq!(base.model.kind(), "linear");
        assert_eq!(base.model.predict(array![3.0].view()), 5.0);
    }
}
