//! Regression tree inference.
//!
//! Trees are stored in the parallel-array layout scikit-learn exports:
//! node `i` splits on `feature[i]` at `threshold[i]`, samples with
//! `x <= threshold` continue at `left[i]`, others at `right[i]`. Leaves carry
//! a negative feature index and their prediction in `value[i]`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub left: Vec<i64>,
    pub right: Vec<i64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    /// A single-leaf tree that always predicts `value`
    pub fn leaf(value: f64) -> Self {
        RegressionTree {
            feature: vec![-2],
            threshold: vec![-2.0],
            left: vec![-1],
            right: vec![-1],
            value: vec![value],
        }
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.feature[node] < 0
    }

    /// Check structural consistency against the expected feature count.
    ///
    /// Children must point strictly forward, which rules out cycles and makes
    /// [`RegressionTree::predict`] terminate for every input.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.feature.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.threshold.len() != n
            || self.left.len() != n
            || self.right.len() != n
            || self.value.len() != n
        {
            return Err("tree node arrays have inconsistent lengths".to_string());
        }
        for node in 0..n {
            if self.is_leaf(node) {
                continue;
            }
            if self.feature[node] as usize >= n_features {
                return Err(format!(
                    "node {} splits on feature {} of {}",
                    node, self.feature[node], n_features
                ));
            }
            for child in [self.left[node], self.right[node]] {
                if child <= node as i64 || child as usize >= n {
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }
        }
        Ok(())
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut node = 0usize;
        while !self.is_leaf(node) {
            let value = x[self.feature[node] as usize];
            node = if value <= self.threshold[node] {
                self.left[node] as usize
            } else {
                self.right[node] as usize
            };
        }
        self.value[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x0 <= 0.5 → 1.0, else (x1 <= 2.0 → 2.0, else 3.0)
    fn stump() -> RegressionTree {
        RegressionTree {
            feature: vec![0, -2, 1, -2, -2],
            threshold: vec![0.5, -2.0, 2.0, -2.0, -2.0],
            left: vec![1, -1, 3, -1, -1],
            right: vec![2, -1, 4, -1, -1],
            value: vec![0.0, 1.0, 0.0, 2.0, 3.0],
        }
    }

    #[test]
    fn follows_splits() {
        let tree = stump();
        assert!(tree.validate(2).is_ok());
        assert_eq!(tree.predict(&[0.5, 10.0]), 1.0);
        assert_eq!(tree.predict(&[0.6, 2.0]), 2.0);
        assert_eq!(tree.predict(&[0.6, 2.1]), 3.0);
    }

    #[test]
    fn rejects_out_of_range_feature() {
        assert!(stump().validate(1).is_err());
    }

    #[test]
    fn rejects_backward_child() {
        let mut tree = stump();
        tree.right[2] = 0;
        assert!(tree.validate(2).is_err());
    }

    #[test]
    fn leaf_tree_is_constant() {
        let tree = RegressionTree::leaf(4.2);
        assert!(tree.validate(0).is_ok());
        assert_eq!(tree.predict(&[]), 4.2);
    }
}
