//! Feature vector construction.
//!
//! Turns a patient record, a treatment description and the resolved dosages
//! into the scaled numeric vector the trained model expects. Base features,
//! one-hot columns, fit placeholders and engineered terms are produced by
//! name and then laid out in schema order; schema columns nothing produced
//! are 0.0 and produced columns the schema does not list are dropped.

pub mod engineered;
pub mod symptoms;
pub mod treatment;

use ndarray::{Array1, ArrayView1};
use std::collections::HashMap;

use crate::artifacts::encoder::OneHotEncoder;
use crate::artifacts::schema::FeatureSchema;
use crate::artifacts::ModelContext;
use crate::error::{ConfigurationError, Result};
use crate::structs::patient::PatientRecord;
use crate::structs::regimen::Dosages;
use engineered::{engineered, FitPlaceholders, NumericFeatures};
use symptoms::parse_symptoms;
use treatment::parse_treatment_flags;

/// A scaled feature vector in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array1<f64>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    pub fn as_slice(&self) -> Option<&[f64]> {
        self.0.as_slice()
    }
}

impl From<Array1<f64>> for FeatureVector {
    fn from(values: Array1<f64>) -> Self {
        FeatureVector(values)
    }
}

/// Every named feature the builder produces, before ordering and scaling
pub fn named_features(
    encoder: &OneHotEncoder,
    patient: &PatientRecord,
    treatment_text: &str,
    dosages: &Dosages,
) -> HashMap<String, f64> {
    let flags = parse_treatment_flags(treatment_text);
    let symptoms = parse_symptoms(&patient.neurology);
    let numeric = NumericFeatures::new(patient, flags, *dosages, symptoms);
    let fit = FitPlaceholders::for_tumor_size(patient.tumor_size_before);

    let mut features: HashMap<String, f64> = numeric
        .named()
        .into_iter()
        .chain(fit.named())
        .chain(engineered(&numeric, &fit))
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    features.extend(encoder.encode(&patient.categories.entries()));
    features
}

/// Unscaled features laid out in schema order, 0.0 where nothing was produced
pub fn raw_vector(schema: &FeatureSchema, features: &HashMap<String, f64>) -> Array1<f64> {
    schema
        .names()
        .iter()
        .map(|name| features.get(name).copied().unwrap_or(0.0))
        .collect()
}

/// Build the scaled feature vector for one (patient, treatment, dosages) triple
pub fn build(
    ctx: &ModelContext,
    patient: &PatientRecord,
    treatment_text: &str,
    dosages: &Dosages,
) -> Result<FeatureVector> {
    let features = named_features(ctx.encoder(), patient, treatment_text, dosages);
    let raw = raw_vector(ctx.schema(), &features);
    if raw.len() != ctx.scaler().len() {
        return Err(ConfigurationError::ScalerMismatch {
            expected: raw.len(),
            found: ctx.scaler().len(),
        });
    }
    Ok(FeatureVector(ctx.scaler().transform(&raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::encoder::EncodedField;
    use crate::artifacts::scaler::StandardScaler;
    use crate::predictor::ConstantPredictor;
    use crate::structs::parameters::GompertzParameters;

    fn context(names: &[&str], scaler: StandardScaler) -> ModelContext {
        let encoder = OneHotEncoder::new(vec![EncodedField {
            name: "gender".to_string(),
            categories: vec!["F".to_string(), "M".to_string()],
        }]);
        ModelContext::new(
            names.iter().copied().collect(),
            encoder,
            scaler,
            ConstantPredictor(GompertzParameters::new(0.1, 7.0, 0.05, 0.03)),
        )
        .unwrap()
    }

    #[test]
    fn follows_schema_order_and_defaults_unknown_columns() {
        let names = ["kps", "gender_M", "not_a_feature", "chemo", "age"];
        let ctx = context(&names, StandardScaler::identity(names.len()));
        let patient = PatientRecord::new("P1", 58.0, 3.5, 80.0);
        let fv = build(&ctx, &patient, "temozolomide", &Dosages::chemotherapy(75.0)).unwrap();
        assert_eq!(fv.as_slice().unwrap(), &[80.0, 1.0, 0.0, 1.0, 58.0]);
    }

    #[test]
    fn unseen_category_encodes_as_zeros() {
        let names = ["gender_F", "gender_M"];
        let ctx = context(&names, StandardScaler::identity(2));
        let mut patient = PatientRecord::new("P1", 58.0, 3.5, 80.0);
        patient.categories.gender = Some("unknown".to_string());
        let fv = build(&ctx, &patient, "", &Dosages::default()).unwrap();
        assert_eq!(fv.as_slice().unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn numeric_category_encodes_as_zeros() {
        let names = ["gender_F", "gender_M", "age"];
        let ctx = context(&names, StandardScaler::identity(3));
        let json = r#"{"id": "P1", "age": 58, "tumor_size_before": 3.5, "kps": 80,
            "treatment": "radiotherapy", "gender": 1}"#;
        let patient: PatientRecord = serde_json::from_str(json).unwrap();
        let fv = build(&ctx, &patient, &patient.treatment, &Dosages::default()).unwrap();
        assert_eq!(fv.as_slice().unwrap(), &[0.0, 0.0, 58.0]);
    }

    #[test]
    fn applies_scaler() {
        let names = ["age", "K_fit"];
        let scaler = StandardScaler::new(vec![50.0, 1.0], vec![10.0, 2.0]);
        let ctx = context(&names, scaler);
        let patient = PatientRecord::new("P1", 60.0, 3.5, 80.0);
        let fv = build(&ctx, &patient, "", &Dosages::default()).unwrap();
        assert_eq!(fv.as_slice().unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn produces_every_training_column() {
        let encoder = OneHotEncoder::default();
        let patient = PatientRecord::new("P1", 58.0, 3.5, 80.0);
        let features = named_features(&encoder, &patient, "tmz", &Dosages::chemotherapy(75.0));
        // 34 base, 5 placeholders, 41 engineered
        assert_eq!(features.len(), 80);
        assert_eq!(features["K_fit"], 7.0);
        assert_eq!(features["n_obs"], 5.0);
    }
}
