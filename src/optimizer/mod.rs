//! # Dosing optimization
//!
//! Searches a discrete grid of chemotherapy and radiotherapy regimens for the
//! one minimizing the predicted tumor volume at the horizon, and compares it
//! against the clinician's current plan.
//!
//! ```text
//! PatientRecord ──► candidates (radiation ▸ chemotherapy ▸ combination)
//!                        │
//!                        ▼  per regimen, in parallel
//!        features::build ─► ModelContext::predict ─► simulate
//!                        │
//!                        ▼
//!        global best / local best ─► synthesize ─► OptimizationResult
//! ```
//!
//! Every regimen is evaluated independently against the shared, read-only
//! [ModelContext], so results are reproducible bit for bit and do not depend
//! on whether the search ran in parallel.
//!
//! ```rust,no_run
//! use oncodose::prelude::*;
//!
//! # fn example() -> Result<(), oncodose::error::ConfigurationError> {
//! let ctx = ModelContext::load("models")?;
//! let patient = PatientRecord::new("P001", 58.0, 3.5, 80.0)
//!     .with_treatment("TMZ 75 mg/m2 + RT 60 Gy/30 fr");
//! let plan = ClinicianPlan::from_patient(&patient);
//!
//! let result = optimize(&ctx, &patient, Some(&plan), &SearchOptions::default())?;
//! println!("{:?}", result.recommendation);
//! # Ok(())
//! # }
//! ```

pub mod grid;
pub mod recommendation;
pub mod search;
pub mod types;

pub use recommendation::{synthesize, ClinicianBaseline, Recommendation};
pub use search::{global_best, local_best, search};
pub use types::{Evaluation, OptimizationResult, SearchOptions};

use crate::artifacts::ModelContext;
use crate::error::Result;
use crate::features::{self, treatment};
use crate::simulator::simulate;
use crate::structs::patient::{ClinicianPlan, PatientRecord};
use recommendation::improvement_pct;
use types::{ClinicianAssessment, OptimizationSummary, PatientCharacteristics};

/// Predict the outcome of the clinician's own plan
pub fn assess_plan(
    ctx: &ModelContext,
    patient: &PatientRecord,
    plan: &ClinicianPlan,
    options: &SearchOptions,
) -> Result<ClinicianAssessment> {
    let dosages = treatment::resolve_dosages(
        plan.chemotherapy.as_ref(),
        plan.radiotherapy.as_ref(),
        &plan.treatment,
    );
    let flags = treatment::parse_treatment_flags(&plan.treatment);
    let features = features::build(ctx, patient, &plan.treatment, &dosages)?;
    let params = ctx.predict(&features)?;
    let simulation = simulate(
        patient.tumor_size_before,
        &params,
        flags.chemo,
        flags.radio,
        options.horizon_months,
        options.dt,
    );
    Ok(ClinicianAssessment {
        treatment: plan.treatment.clone(),
        treatment_type: flags.treatment_type(),
        dosages,
        params,
        predicted_volume: simulation.final_volume,
    })
}

/// Run the full search for one patient.
///
/// Without a plan only the global best is reported. The search branches
/// follow the plan's treatment text, or the patient's when no plan is given.
pub fn optimize(
    ctx: &ModelContext,
    patient: &PatientRecord,
    plan: Option<&ClinicianPlan>,
    options: &SearchOptions,
) -> Result<OptimizationResult> {
    tracing::info!("Optimizing treatment for patient {}", patient.id);
    let clinician_text = plan.map_or(patient.treatment.as_str(), |p| p.treatment.as_str());
    let evaluations = search(ctx, patient, clinician_text, options)?;

    let clinician = plan
        .map(|plan| assess_plan(ctx, patient, plan, options))
        .transpose()?;
    if let Some(assessment) = &clinician {
        tracing::info!(
            "Current plan '{}' -> {:.2} cm3 at horizon",
            assessment.treatment,
            assessment.predicted_volume
        );
    }

    let global = global_best(&evaluations).cloned();
    let local = clinician
        .as_ref()
        .and_then(|c| c.treatment_type)
        .and_then(|tt| local_best(&evaluations, tt))
        .cloned();

    let baseline = clinician.as_ref().map(|c| ClinicianBaseline {
        predicted_volume: c.predicted_volume,
        dosages: c.dosages,
        treatment_type: c.treatment_type,
    });
    let recommendation = global
        .as_ref()
        .map(|best| synthesize(baseline.as_ref(), best, local.as_ref()));

    let global_improvement_pct = baseline
        .zip(global.as_ref())
        .map(|(b, best)| improvement_pct(b.predicted_volume, best.predicted_volume));
    let local_improvement_pct = baseline
        .zip(local.as_ref())
        .filter(|(b, best)| best.predicted_volume != b.predicted_volume)
        .map(|(b, best)| improvement_pct(b.predicted_volume, best.predicted_volume));

    let summary = OptimizationSummary {
        tested_regimens: evaluations.len(),
        best_predicted_volume: global.as_ref().map(|e| e.predicted_volume),
        best_treatment_type: global.as_ref().map(|e| e.treatment_type()),
    };
    match &global {
        Some(best) => tracing::info!(
            "Tested {} regimens, best {} -> {:.2} cm3",
            summary.tested_regimens,
            best.regimen,
            best.predicted_volume
        ),
        None => tracing::warn!("No regimen was evaluated"),
    }

    Ok(OptimizationResult {
        patient_id: patient.id.clone(),
        evaluations,
        clinician,
        global_best: global,
        local_best: local,
        global_improvement_pct,
        local_improvement_pct,
        recommendation,
        summary,
        characteristics: PatientCharacteristics::from_patient(patient),
    })
}
