//! Treatment dosing optimization for glioblastoma.
//!
//! A stacked-ensemble model predicts the growth and kill coefficients of a
//! Gompertz tumor model for a patient under a candidate regimen; the
//! simulated volume at the horizon ranks the regimens of a discrete grid,
//! and the best ones are compared against the clinician's current plan.
//!
//! The entry point is [optimizer::optimize], which needs a [artifacts::ModelContext]
//! loaded once from the trained artifacts.

pub mod artifacts;
pub mod cli;
pub mod error;
pub mod features;
pub mod optimizer;
pub mod predictor;
pub mod routines;
pub mod simulator;
pub mod structs;

pub mod prelude {
    pub use crate::artifacts::ModelContext;
    pub use crate::error::ConfigurationError;
    pub use crate::features::{build, FeatureVector};
    pub use crate::optimizer::{optimize, search, synthesize, OptimizationResult, SearchOptions};
    pub use crate::predictor::{ConstantPredictor, PredictTarget, Target};
    pub use crate::simulator::{simulate, SimulationResult};
    pub use crate::structs::parameters::GompertzParameters;
    pub use crate::structs::patient::{ClinicianPlan, PatientRecord};
    pub use crate::structs::regimen::{bed, Dosages, RadioSchedule, Regimen, TreatmentType};
}
