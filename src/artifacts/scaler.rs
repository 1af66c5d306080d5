use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

/// Pre-fitted component-wise standardization, `(x - mean) / scale`.
///
/// A zero scale (constant training column) is treated as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        StandardScaler { mean, scale }
    }

    /// A scaler that leaves values unchanged
    pub fn identity(len: usize) -> Self {
        StandardScaler {
            mean: vec![0.0; len],
            scale: vec![1.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Mean and scale disagree in length
    pub fn is_ragged(&self) -> bool {
        self.mean.len() != self.scale.len()
    }

    pub fn transform(&self, raw: &Array1<f64>) -> Array1<f64> {
        let mut scaled = raw.clone();
        Zip::from(&mut scaled)
            .and(ArrayView1::from(&self.mean[..]))
            .and(ArrayView1::from(&self.scale[..]))
            .for_each(|x, &mean, &scale| {
                let scale = if scale == 0.0 { 1.0 } else { scale };
                *x = (*x - mean) / scale;
            });
        scaled
    }
}
