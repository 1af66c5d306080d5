use serde::{Deserialize, Serialize};

/// Growth and kill coefficients of the treated Gompertz model.
///
/// Predicted fresh for every (patient, regimen) pair and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GompertzParameters {
    /// Intrinsic growth rate (1/month)
    pub r: f64,
    /// Carrying capacity (cm³)
    #[serde(rename = "K")]
    pub k: f64,
    /// Chemotherapy kill coefficient
    pub alpha: f64,
    /// Radiotherapy kill coefficient
    pub beta: f64,
}

impl GompertzParameters {
    pub fn new(r: f64, k: f64, alpha: f64, beta: f64) -> Self {
        GompertzParameters { r, k, alpha, beta }
    }
}
