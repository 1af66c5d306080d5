use std::path::PathBuf;
use thiserror::Error;

/// Fatal deployment defects that abort an optimization call.
///
/// Everything else the engine encounters (unmatched treatment text, unseen
/// categories, missing optional fields, singular simulator inputs) is resolved
/// with documented defaults and never reaches the caller.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing model artifact {path:?}: {source}")]
    MissingArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid model artifact {path:?}: {source}")]
    InvalidArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Feature vector has {found} entries but the schema defines {expected}")]
    SchemaMismatch { expected: usize, found: usize },
    #[error("Scaler was fitted on {found} features but the schema defines {expected}")]
    ScalerMismatch { expected: usize, found: usize },
    #[error("Ensemble expects {found} features but the schema defines {expected}")]
    ModelMismatch { expected: usize, found: usize },
    #[error("Ensemble has no model for target {0}")]
    MissingTarget(String),
    #[error("Malformed regressor {name} for target {target}: {reason}")]
    MalformedRegressor {
        target: String,
        name: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
