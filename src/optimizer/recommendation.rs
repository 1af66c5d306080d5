//! Comparison of the clinician's plan against the search optima.
//!
//! The global best may switch treatment type, the local best keeps the
//! clinician's type and only moves doses. Each comparison is graded by the
//! relative reduction in predicted volume:
//!
//! | improvement | level |
//! |---|---|
//! | ≥ 10 % | [ChangeLevel::Major] |
//! | 3 – 10 % | [ChangeLevel::Minor] |
//! | < 3 % | [ChangeLevel::Optimal] |

use serde::Serialize;
use std::fmt;

use super::types::Evaluation;
use crate::structs::regimen::{Dosages, RadioSchedule, Regimen, TreatmentType};

pub const MAJOR_CHANGE_PCT: f64 = 10.0;
pub const MINOR_CHANGE_PCT: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeLevel {
    Major,
    Minor,
    Optimal,
}

impl ChangeLevel {
    pub fn from_improvement(pct: f64) -> Self {
        if pct >= MAJOR_CHANGE_PCT {
            ChangeLevel::Major
        } else if pct >= MINOR_CHANGE_PCT {
            ChangeLevel::Minor
        } else {
            ChangeLevel::Optimal
        }
    }
}

/// One concrete edit that turns the current plan into the recommended one
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DoseChange {
    AddChemotherapy { dose_mg_per_m2: f64 },
    RemoveChemotherapy { dose_mg_per_m2: f64 },
    ChangeChemotherapy { from_mg_per_m2: f64, to_mg_per_m2: f64 },
    AddRadiotherapy { schedule: RadioSchedule },
    RemoveRadiotherapy { schedule: RadioSchedule },
    ChangeRadiotherapy { from: RadioSchedule, to: RadioSchedule },
}

impl fmt::Display for DoseChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rt = |s: &RadioSchedule| format!("{:.0} Gy / {} fr", s.total_gy, s.fractions);
        match self {
            DoseChange::AddChemotherapy { dose_mg_per_m2 } => {
                write!(f, "Add chemotherapy: Temozolomide {:.0} mg/m2", dose_mg_per_m2)
            }
            DoseChange::RemoveChemotherapy { .. } => write!(f, "Remove chemotherapy"),
            DoseChange::ChangeChemotherapy {
                from_mg_per_m2,
                to_mg_per_m2,
            } => write!(
                f,
                "Change Temozolomide dose: {:.0} -> {:.0} mg/m2",
                from_mg_per_m2, to_mg_per_m2
            ),
            DoseChange::AddRadiotherapy { schedule } => {
                write!(f, "Add radiotherapy: {}", rt(schedule))
            }
            DoseChange::RemoveRadiotherapy { .. } => write!(f, "Remove radiotherapy"),
            DoseChange::ChangeRadiotherapy { from, to } => {
                write!(f, "Change radiotherapy: {} -> {}", rt(from), rt(to))
            }
        }
    }
}

/// Dose edits from `current` to `target`.
///
/// A modality present on one side only is an add or remove; present on both
/// with different values it is a change.
pub fn dose_changes(current: &Dosages, target: &Regimen) -> Vec<DoseChange> {
    let mut changes = Vec::new();

    let old_dose = current.chemo_dose_mg_per_m2;
    let new_dose = target.chemo_dose_mg_per_m2;
    match (old_dose > 0.0, new_dose > 0.0) {
        (false, true) => changes.push(DoseChange::AddChemotherapy {
            dose_mg_per_m2: new_dose,
        }),
        (true, false) => changes.push(DoseChange::RemoveChemotherapy {
            dose_mg_per_m2: old_dose,
        }),
        (true, true) if old_dose != new_dose => changes.push(DoseChange::ChangeChemotherapy {
            from_mg_per_m2: old_dose,
            to_mg_per_m2: new_dose,
        }),
        _ => {}
    }

    let old_rt = RadioSchedule::new(current.radio_total_gy, current.radio_fractions);
    let new_rt = RadioSchedule::new(target.radio_total_gy, target.radio_fractions);
    match (old_rt.total_gy > 0.0, new_rt.total_gy > 0.0) {
        (false, true) => changes.push(DoseChange::AddRadiotherapy { schedule: new_rt }),
        (true, false) => changes.push(DoseChange::RemoveRadiotherapy { schedule: old_rt }),
        (true, true) if old_rt != new_rt => changes.push(DoseChange::ChangeRadiotherapy {
            from: old_rt,
            to: new_rt,
        }),
        _ => {}
    }

    changes
}

/// Relative reduction of `candidate` against `baseline`, in percent
pub fn improvement_pct(baseline: f64, candidate: f64) -> f64 {
    (baseline - candidate) / baseline * 100.0
}

/// One graded comparison against the clinician's plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub regimen: Regimen,
    pub predicted_volume: f64,
    pub improvement_pct: f64,
    pub level: ChangeLevel,
    pub changes: Vec<DoseChange>,
}

impl Advice {
    fn new(baseline: &ClinicianBaseline, best: &Evaluation) -> Self {
        let improvement_pct = improvement_pct(baseline.predicted_volume, best.predicted_volume);
        Advice {
            regimen: best.regimen,
            predicted_volume: best.predicted_volume,
            improvement_pct,
            level: ChangeLevel::from_improvement(improvement_pct),
            changes: dose_changes(&baseline.dosages, &best.regimen),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalRecommendation {
    /// Both a type switch and a same-type dose adjustment are worthwhile
    TwoOptions,
    ChangeTreatmentType,
    AdjustDosages,
    KeepCurrent,
}

impl FinalRecommendation {
    pub fn decide(global_pct: f64, local_pct: Option<f64>) -> Self {
        let global = global_pct >= MAJOR_CHANGE_PCT;
        let local = local_pct.map_or(false, |pct| pct >= MINOR_CHANGE_PCT);
        match (global, local) {
            (true, true) => FinalRecommendation::TwoOptions,
            (true, false) => FinalRecommendation::ChangeTreatmentType,
            (false, true) => FinalRecommendation::AdjustDosages,
            (false, false) => FinalRecommendation::KeepCurrent,
        }
    }
}

/// The clinician's predicted outcome and the doses it was predicted with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClinicianBaseline {
    pub predicted_volume: f64,
    pub dosages: Dosages,
    pub treatment_type: Option<TreatmentType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub best_regimen: Regimen,
    pub best_predicted_volume: f64,
    /// Absent without a clinician plan
    pub global: Option<Advice>,
    /// Absent without a local best or when it predicts the same as the plan
    pub local: Option<Advice>,
    pub decision: Option<FinalRecommendation>,
}

/// Grade the global and local optima against the clinician's plan
pub fn synthesize(
    clinician: Option<&ClinicianBaseline>,
    global_best: &Evaluation,
    local_best: Option<&Evaluation>,
) -> Recommendation {
    let mut recommendation = Recommendation {
        best_regimen: global_best.regimen,
        best_predicted_volume: global_best.predicted_volume,
        global: None,
        local: None,
        decision: None,
    };
    let Some(baseline) = clinician else {
        tracing::info!(
            "Recommended regimen: {} -> {:.2} cm3 at horizon",
            global_best.regimen,
            global_best.predicted_volume
        );
        return recommendation;
    };

    let global = Advice::new(baseline, global_best);
    let local = local_best
        .filter(|best| best.predicted_volume != baseline.predicted_volume)
        .map(|best| Advice::new(baseline, best));
    let decision = FinalRecommendation::decide(
        global.improvement_pct,
        local.as_ref().map(|advice| advice.improvement_pct),
    );

    tracing::info!(
        "Global: {} ({:.1}%, {:?})",
        global.regimen,
        global.improvement_pct,
        global.level
    );
    if let Some(local) = &local {
        tracing::info!(
            "Local: {} ({:.1}%, {:?})",
            local.regimen,
            local.improvement_pct,
            local.level
        );
    }
    tracing::info!("Final recommendation: {:?}", decision);

    recommendation.global = Some(global);
    recommendation.local = local;
    recommendation.decision = Some(decision);
    recommendation
}
