use approx::assert_relative_eq;
use oncodose::artifacts::{
    ENCODER_FILE, METADATA_FILE, MODELS_FILE, SCALER_FILE, SCHEMA_FILE,
};
use oncodose::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn single_base(base: Value) -> Value {
    json!({ "bases": [base], "meta": { "coefficients": [1.0], "intercept": 0.0 } })
}

fn models() -> Value {
    json!({
        "n_features": 4,
        "targets": {
            "r_target": single_base(json!({
                "name": "ridge", "kind": "linear",
                "coefficients": [0.01, 0.0, 0.0, 0.0], "intercept": 0.1
            })),
            "K_target": single_base(json!({
                "name": "rf", "kind": "forest",
                "trees": [{
                    "feature": [3, -2, -2],
                    "threshold": [0.5, -2.0, -2.0],
                    "left": [1, -1, -1],
                    "right": [2, -1, -1],
                    "value": [6.5, 5.0, 8.0]
                }]
            })),
            "alpha_target": single_base(json!({
                "name": "gbr", "kind": "gradient_boosting",
                "init": 0.02, "learning_rate": 0.1,
                "trees": [{
                    "feature": [2, -2, -2],
                    "threshold": [0.9, -2.0, -2.0],
                    "left": [1, -1, -1],
                    "right": [2, -1, -1],
                    "value": [0.2, 0.1, 0.3]
                }]
            })),
            "beta_target": single_base(json!({
                "name": "mlp", "kind": "mlp",
                "layers": [
                    { "weights": [[0.0, 1.0, 0.0, 0.0]], "biases": [0.0] },
                    { "weights": [[0.02]], "biases": [0.03] }
                ]
            }))
        }
    })
}

fn artifact_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path();
    write(
        path,
        SCHEMA_FILE,
        &json!(["age", "chemo", "chemo_dose_mg_per_m2", "gender_M"]),
    );
    write(
        path,
        ENCODER_FILE,
        &json!({ "fields": [{ "name": "gender", "categories": ["F", "M"] }] }),
    );
    write(
        path,
        SCALER_FILE,
        &json!({ "mean": [50.0, 0.0, 0.0, 0.0], "scale": [10.0, 1.0, 100.0, 1.0] }),
    );
    write(path, MODELS_FILE, &models());
    write(
        path,
        METADATA_FILE,
        &json!({ "version": "3.0", "n_features": 4, "full_features": true }),
    );
    dir
}

#[test]
fn loads_and_predicts_through_every_regressor_kind() {
    let dir = artifact_dir();
    let ctx = ModelContext::load(dir.path()).unwrap();
    assert_eq!(ctx.schema().len(), 4);
    assert_eq!(ctx.metadata().unwrap().version.as_deref(), Some("3.0"));

    let patient = PatientRecord::new("P1", 60.0, 3.0, 80.0);
    let features = build(&ctx, &patient, "temozolomide", &Dosages::chemotherapy(100.0)).unwrap();
    assert_eq!(features.as_slice().unwrap(), &[1.0, 1.0, 1.0, 1.0]);

    let params = ctx.predict(&features).unwrap();
    assert_relative_eq!(params.r, 0.11, epsilon = 1e-12);
    assert_eq!(params.k, 8.0);
    assert_relative_eq!(params.alpha, 0.05, epsilon = 1e-12);
    assert_relative_eq!(params.beta, 0.05, epsilon = 1e-12);
}

#[test]
fn female_patient_takes_left_branch() {
    let dir = artifact_dir();
    let ctx = ModelContext::load(dir.path()).unwrap();
    let mut patient = PatientRecord::new("P2", 50.0, 3.0, 80.0);
    patient.categories.gender = Some("F".to_string());
    let features = build(&ctx, &patient, "radiation", &Dosages::default()).unwrap();
    assert_eq!(ctx.predict(&features).unwrap().k, 5.0);
}

#[test]
fn metadata_is_optional() {
    let dir = artifact_dir();
    fs::remove_file(dir.path().join(METADATA_FILE)).unwrap();
    let ctx = ModelContext::load(dir.path()).unwrap();
    assert!(ctx.metadata().is_none());
}

#[test]
fn missing_model_file_is_fatal() {
    let dir = artifact_dir();
    fs::remove_file(dir.path().join(MODELS_FILE)).unwrap();
    let err = ModelContext::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingArtifact { .. }));
}

#[test]
fn invalid_json_is_fatal() {
    let dir = artifact_dir();
    fs::write(dir.path().join(SCALER_FILE), "{ not json").unwrap();
    let err = ModelContext::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidArtifact { .. }));
}

#[test]
fn scaler_shorter_than_schema_is_fatal() {
    let dir = artifact_dir();
    write(
        dir.path(),
        SCALER_FILE,
        &json!({ "mean": [0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0] }),
    );
    let err = ModelContext::load(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::ScalerMismatch {
            expected: 4,
            found: 3
        }
    ));
}

#[test]
fn ensemble_feature_count_must_match_schema() {
    let dir = artifact_dir();
    write(
        dir.path(),
        SCHEMA_FILE,
        &json!(["age", "chemo", "chemo_dose_mg_per_m2", "gender_M", "kps"]),
    );
    write(
        dir.path(),
        SCALER_FILE,
        &json!({ "mean": vec![0.0; 5], "scale": vec![1.0; 5] }),
    );
    let err = ModelContext::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigurationError::ModelMismatch { .. }));
}

#[test]
fn missing_target_is_fatal() {
    let dir = artifact_dir();
    let mut models = models();
    models["targets"]
        .as_object_mut()
        .unwrap()
        .remove("alpha_target");
    write(dir.path(), MODELS_FILE, &models);
    let err = ModelContext::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingTarget(name) if name == "alpha_target"));
}
