//! Prediction of the Gompertz parameters from a feature vector.
//!
//! The trained model is consumed through the [PredictTarget] capability so a
//! fitted [ensemble::StackedEnsemble] and a deterministic test double are
//! interchangeable.

pub mod ensemble;
pub mod tree;

use ndarray::ArrayView1;
use std::fmt;

use crate::error::{ConfigurationError, Result};
use crate::features::FeatureVector;
use crate::structs::parameters::GompertzParameters;

/// The four quantities the model predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    R,
    K,
    Alpha,
    Beta,
}

impl Target {
    pub const ALL: [Target; 4] = [Target::R, Target::K, Target::Alpha, Target::Beta];

    /// Name under which the target's ensemble is stored
    pub fn name(&self) -> &'static str {
        match self {
            Target::R => "r_target",
            Target::K => "K_target",
            Target::Alpha => "alpha_target",
            Target::Beta => "beta_target",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Target::R => 0,
            Target::K => 1,
            Target::Alpha => 2,
            Target::Beta => 3,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A trained model able to predict each [Target] from a scaled feature vector.
///
/// Implementations are shared read-only across worker threads.
pub trait PredictTarget: Send + Sync {
    /// Number of features the model was fitted on, when it knows it
    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict_target(&self, target: Target, features: ArrayView1<f64>) -> f64;
}

impl<P: PredictTarget + ?Sized> PredictTarget for Box<P> {
    fn n_features(&self) -> Option<usize> {
        (**self).n_features()
    }

    fn predict_target(&self, target: Target, features: ArrayView1<f64>) -> f64 {
        (**self).predict_target(target, features)
    }
}

/// Predicts the same parameters for every input.
///
/// Useful as a baseline and for isolating the simulator and search from
/// model behaviour.
#[derive(Debug, Clone, Copy)]
pub struct ConstantPredictor(pub GompertzParameters);

impl PredictTarget for ConstantPredictor {
    fn predict_target(&self, target: Target, _features: ArrayView1<f64>) -> f64 {
        let params = self.0;
        match target {
            Target::R => params.r,
            Target::K => params.k,
            Target::Alpha => params.alpha,
            Target::Beta => params.beta,
        }
    }
}

/// Predict all four parameters for one feature vector.
///
/// `expected_len` is the schema length; any other vector length means the
/// deployment is inconsistent and aborts the request.
pub fn predict<P: PredictTarget + ?Sized>(
    model: &P,
    features: &FeatureVector,
    expected_len: usize,
) -> Result<GompertzParameters> {
    if features.len() != expected_len {
        return Err(ConfigurationError::SchemaMismatch {
            expected: expected_len,
            found: features.len(),
        });
    }
    let x = features.view();
    Ok(GompertzParameters {
        r: model.predict_target(Target::R, x),
        k: model.predict_target(Target::K, x),
        alpha: model.predict_target(Target::Alpha, x),
        beta: model.predict_target(Target::Beta, x),
    })
}
