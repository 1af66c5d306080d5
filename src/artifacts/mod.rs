//! Immutable training artifacts.
//!
//! A [ModelContext] bundles the feature schema, the fitted categorical
//! encoder, the fitted numeric scaler and the trained model. It is built once
//! at start-up, validated for mutual consistency, and then only ever read.

pub mod encoder;
pub mod scaler;
pub mod schema;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{ConfigurationError, Result};
use crate::features::FeatureVector;
use crate::predictor::ensemble::StackedEnsemble;
use crate::predictor::{self, PredictTarget};
use crate::structs::parameters::GompertzParameters;
use encoder::OneHotEncoder;
use scaler::StandardScaler;
use schema::FeatureSchema;

pub const SCHEMA_FILE: &str = "feature_columns.json";
pub const ENCODER_FILE: &str = "encoder.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const MODELS_FILE: &str = "stacked_models.json";
pub const METADATA_FILE: &str = "metadata.json";

/// Descriptive information written next to the artifacts by training
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub n_features: Option<usize>,
    #[serde(default)]
    pub full_features: Option<bool>,
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigurationError::MissingArtifact {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&contents).map_err(|source| ConfigurationError::InvalidArtifact {
        path: path.to_path_buf(),
        source,
    })
}

pub struct ModelContext {
    schema: FeatureSchema,
    encoder: OneHotEncoder,
    scaler: StandardScaler,
    model: Box<dyn PredictTarget>,
    metadata: Option<ModelMetadata>,
}

impl fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelContext")
            .field("features", &self.schema.len())
            .field("encoded_fields", &self.encoder.fields().len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl ModelContext {
    /// Assemble a context, checking that every artifact agrees with the schema
    pub fn new<P: PredictTarget + 'static>(
        schema: FeatureSchema,
        encoder: OneHotEncoder,
        scaler: StandardScaler,
        model: P,
    ) -> Result<Self> {
        if scaler.is_ragged() || scaler.len() != schema.len() {
            return Err(ConfigurationError::ScalerMismatch {
                expected: schema.len(),
                found: scaler.len(),
            });
        }
        if let Some(n) = model.n_features() {
            if n != schema.len() {
                return Err(ConfigurationError::ModelMismatch {
                    expected: schema.len(),
                    found: n,
                });
            }
        }
        Ok(ModelContext {
            schema,
            encoder,
            scaler,
            model: Box::new(model),
            metadata: None,
        })
    }

    /// Load every artifact from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Loading model artifacts from {:?}", dir);

        let schema: FeatureSchema = read_json(&dir.join(SCHEMA_FILE))?;
        let encoder: OneHotEncoder = read_json(&dir.join(ENCODER_FILE))?;
        let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
        let model = StackedEnsemble::from_file(&dir.join(MODELS_FILE))?;

        let metadata_path = dir.join(METADATA_FILE);
        let metadata = if metadata_path.exists() {
            Some(read_json::<ModelMetadata>(&metadata_path)?)
        } else {
            None
        };

        let mut context = ModelContext::new(schema, encoder, scaler, model)?;
        tracing::info!("Loaded {} features", context.schema.len());
        if let Some(meta) = &metadata {
            tracing::info!(
                "Model version: {}",
                meta.version.as_deref().unwrap_or("unknown")
            );
        }
        context.metadata = metadata;
        Ok(context)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn model(&self) -> &dyn PredictTarget {
        self.model.as_ref()
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    /// Predict the Gompertz parameters for a vector built against this schema
    pub fn predict(&self, features: &FeatureVector) -> Result<GompertzParameters> {
        predictor::predict(self.model(), features, self.schema.len())
    }
}
