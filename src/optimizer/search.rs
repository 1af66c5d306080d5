use rayon::prelude::*;

use super::grid::{candidates, select_branches};
use super::types::{Evaluation, SearchOptions};
use crate::artifacts::ModelContext;
use crate::error::Result;
use crate::features;
use crate::simulator::simulate;
use crate::structs::patient::PatientRecord;
use crate::structs::regimen::{Regimen, TreatmentType};

/// Build, predict and simulate a single candidate regimen.
///
/// The branch's canonical name stands in for the treatment text, so the
/// model sees chemo/radio flags matching the regimen.
pub fn evaluate(
    ctx: &ModelContext,
    patient: &PatientRecord,
    regimen: &Regimen,
    options: &SearchOptions,
) -> Result<Evaluation> {
    let treatment_type = regimen.treatment_type;
    let features = features::build(ctx, patient, treatment_type.as_str(), &regimen.dosages())?;
    let params = ctx.predict(&features)?;
    let simulation = simulate(
        patient.tumor_size_before,
        &params,
        treatment_type.chemo_on(),
        treatment_type.radio_on(),
        options.horizon_months,
        options.dt,
    );
    tracing::debug!(
        "{} -> r={:.4}, K={:.3}, alpha={:.4}, beta={:.4}, V(12m)={:.3}",
        regimen,
        params.r,
        params.k,
        params.alpha,
        params.beta,
        simulation.final_volume
    );
    Ok(Evaluation::new(*regimen, params, simulation))
}

/// Evaluate every candidate regimen for `patient`.
///
/// Results keep candidate order even when evaluated in parallel.
pub fn search(
    ctx: &ModelContext,
    patient: &PatientRecord,
    clinician_text: &str,
    options: &SearchOptions,
) -> Result<Vec<Evaluation>> {
    let branches = select_branches(clinician_text, options.test_all_modalities);
    if branches.is_empty() {
        tracing::warn!(
            "Treatment '{}' implies no treatment type, nothing to search",
            clinician_text
        );
    }
    let regimens = candidates(&branches, &options.chemo_grid, &options.radio_grid);
    tracing::info!(
        "Evaluating {} regimens over {:?}",
        regimens.len(),
        branches
    );

    if options.parallel {
        regimens
            .par_iter()
            .map(|regimen| evaluate(ctx, patient, regimen, options))
            .collect()
    } else {
        regimens
            .iter()
            .map(|regimen| evaluate(ctx, patient, regimen, options))
            .collect()
    }
}

/// First evaluation with the strictly smallest predicted volume, NaN never wins over a number
fn first_minimum<'a>(
    evaluations: impl Iterator<Item = &'a Evaluation>,
) -> Option<&'a Evaluation> {
    evaluations.fold(None::<&'a Evaluation>, |best, candidate| match best {
        Some(current)
            if current.predicted_volume.is_nan()
                || candidate.predicted_volume < current.predicted_volume =>
        {
            Some(candidate)
        }
        Some(current) => Some(current),
        None => Some(candidate),
    })
}

/// Lowest predicted volume over every evaluation, earliest wins ties
pub fn global_best(evaluations: &[Evaluation]) -> Option<&Evaluation> {
    first_minimum(evaluations.iter())
}

/// Lowest predicted volume within `treatment_type`, earliest wins ties
pub fn local_best(
    evaluations: &[Evaluation],
    treatment_type: TreatmentType,
) -> Option<&Evaluation> {
    first_minimum(
        evaluations
            .iter()
            .filter(|e| e.treatment_type() == treatment_type),
    )
}
