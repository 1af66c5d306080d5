#![allow(dead_code)]

use ndarray::ArrayView1;
use oncodose::artifacts::encoder::{EncodedField, OneHotEncoder};
use oncodose::artifacts::scaler::StandardScaler;
use oncodose::artifacts::schema::FeatureSchema;
use oncodose::prelude::*;

pub const SCHEMA: [&str; 6] = [
    "age",
    "chemo",
    "radio",
    "chemo_dose_mg_per_m2",
    "radio_BED",
    "gender_M",
];

pub fn reference_params() -> GompertzParameters {
    GompertzParameters::new(0.1, 7.0, 0.05, 0.03)
}

pub fn encoder() -> OneHotEncoder {
    OneHotEncoder::new(vec![EncodedField {
        name: "gender".to_string(),
        categories: vec!["F".to_string(), "M".to_string()],
    }])
}

pub fn context<P: PredictTarget + 'static>(model: P) -> ModelContext {
    let schema: FeatureSchema = SCHEMA.into_iter().collect();
    ModelContext::new(schema, encoder(), StandardScaler::identity(SCHEMA.len()), model)
        .expect("consistent stub context")
}

/// Kill coefficients grow linearly with the chemo dose and the BED
pub struct DoseResponse;

impl PredictTarget for DoseResponse {
    fn n_features(&self) -> Option<usize> {
        Some(SCHEMA.len())
    }

    fn predict_target(&self, target: Target, features: ArrayView1<f64>) -> f64 {
        match target {
            Target::R => 0.1,
            Target::K => 7.0,
            Target::Alpha => 0.001 * features[3],
            Target::Beta => 0.001 * features[4],
        }
    }
}

pub fn scenario_patient() -> PatientRecord {
    PatientRecord::new("GBM-001", 58.0, 3.5, 80.0).with_treatment("chemoradiotherapy")
}

pub fn scenario_options() -> SearchOptions {
    SearchOptions::default().with_grids(
        vec![50.0, 75.0, 100.0, 125.0, 150.0],
        vec![
            RadioSchedule::new(40.0, 15),
            RadioSchedule::new(50.0, 25),
            RadioSchedule::new(60.0, 30),
            RadioSchedule::new(66.0, 33),
        ],
    )
}
