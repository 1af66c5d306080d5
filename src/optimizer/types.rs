//! Core data types for the dosing search

use serde::{Deserialize, Serialize};

use super::recommendation::Recommendation;
use crate::features::symptoms::parse_symptoms;
use crate::simulator::{SimulationResult, DEFAULT_DT, DEFAULT_HORIZON_MONTHS};
use crate::structs::parameters::GompertzParameters;
use crate::structs::patient::PatientRecord;
use crate::structs::regimen::{Dosages, RadioSchedule, Regimen, TreatmentType};

/// Default chemotherapy grid (mg/m²)
pub const DEFAULT_CHEMO_GRID: [f64; 5] = [50.0, 75.0, 100.0, 125.0, 150.0];

/// Default radiotherapy grid as (total Gy, fractions)
pub const DEFAULT_RADIO_GRID: [(f64, u32); 4] = [(40.0, 15), (50.0, 25), (60.0, 30), (66.0, 33)];

/// What to search and how to simulate each candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub chemo_grid: Vec<f64>,
    pub radio_grid: Vec<RadioSchedule>,
    /// Evaluate every treatment type instead of only the clinician's
    pub test_all_modalities: bool,
    /// Evaluate candidates on the rayon thread pool
    pub parallel: bool,
    pub horizon_months: f64,
    pub dt: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            chemo_grid: DEFAULT_CHEMO_GRID.to_vec(),
            radio_grid: DEFAULT_RADIO_GRID.iter().copied().map(RadioSchedule::from).collect(),
            test_all_modalities: true,
            parallel: true,
            horizon_months: DEFAULT_HORIZON_MONTHS,
            dt: DEFAULT_DT,
        }
    }
}

impl SearchOptions {
    pub fn with_grids(mut self, chemo_grid: Vec<f64>, radio_grid: Vec<RadioSchedule>) -> Self {
        self.chemo_grid = chemo_grid;
        self.radio_grid = radio_grid;
        self
    }

    pub fn with_all_modalities(mut self, test_all_modalities: bool) -> Self {
        self.test_all_modalities = test_all_modalities;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// One evaluated candidate regimen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    #[serde(flatten)]
    pub regimen: Regimen,
    #[serde(rename = "radio_fraction_dose_Gy")]
    pub radio_fraction_dose_gy: f64,
    #[serde(rename = "BED")]
    pub bed: f64,
    /// Volume at the end of the horizon (cm³)
    pub predicted_volume: f64,
    pub params: GompertzParameters,
    /// Full simulation, kept in memory for diagnostics
    #[serde(skip)]
    pub simulation: SimulationResult,
}

impl Evaluation {
    pub fn new(regimen: Regimen, params: GompertzParameters, simulation: SimulationResult) -> Self {
        Evaluation {
            regimen,
            radio_fraction_dose_gy: regimen.fraction_dose_gy(),
            bed: regimen.bed(),
            predicted_volume: simulation.final_volume,
            params,
            simulation,
        }
    }

    pub fn treatment_type(&self) -> TreatmentType {
        self.regimen.treatment_type
    }
}

/// The clinician's plan as predicted by the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicianAssessment {
    pub treatment: String,
    /// `None` when the text names neither chemotherapy nor radiation
    pub treatment_type: Option<TreatmentType>,
    pub dosages: Dosages,
    pub params: GompertzParameters,
    pub predicted_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationSummary {
    pub tested_regimens: usize,
    pub best_predicted_volume: Option<f64>,
    pub best_treatment_type: Option<TreatmentType>,
}

/// Patient traits relevant when reading a recommendation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientCharacteristics {
    pub mgmt_methylated: bool,
    pub idh_mutant: bool,
    /// Present only when positive
    pub edema_volume: Option<f64>,
    /// Present only when positive
    pub symptom_count: Option<u32>,
}

impl PatientCharacteristics {
    pub fn from_patient(patient: &PatientRecord) -> Self {
        let symptoms = parse_symptoms(&patient.neurology);
        PatientCharacteristics {
            mgmt_methylated: patient.genetics.mgmt_methylation.unwrap_or(false),
            idh_mutant: patient.genetics.idh_mutation.unwrap_or(false),
            edema_volume: patient.clinical.edema_volume.filter(|v| *v > 0.0),
            symptom_count: Some(symptoms.symptom_count).filter(|c| *c > 0),
        }
    }
}

/// Everything a single optimization call produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub patient_id: String,
    /// Every evaluated regimen in emission order
    pub evaluations: Vec<Evaluation>,
    pub clinician: Option<ClinicianAssessment>,
    /// Lowest predicted volume over every evaluation
    pub global_best: Option<Evaluation>,
    /// Lowest predicted volume within the clinician's treatment type
    pub local_best: Option<Evaluation>,
    pub global_improvement_pct: Option<f64>,
    pub local_improvement_pct: Option<f64>,
    pub recommendation: Option<Recommendation>,
    pub summary: OptimizationSummary,
    pub characteristics: PatientCharacteristics,
}

impl OptimizationResult {
    pub fn tested_regimens(&self) -> usize {
        self.evaluations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_reference_grids() {
        let options = SearchOptions::default();
        assert_eq!(options.chemo_grid.len(), 5);
        assert_eq!(options.radio_grid[2], RadioSchedule::new(60.0, 30));
        assert!(options.test_all_modalities);
        assert_eq!(options.horizon_months, 12.0);
    }

    #[test]
    fn characteristics_hide_zero_values() {
        let mut patient = PatientRecord::new("P1", 58.0, 3.5, 80.0).with_symptoms("asymptomatic");
        patient.genetics.mgmt_methylation = Some(true);
        patient.clinical.edema_volume = Some(0.0);
        let characteristics = PatientCharacteristics::from_patient(&patient);
        assert!(characteristics.mgmt_methylated);
        assert!(!characteristics.idh_mutant);
        assert_eq!(characteristics.edema_volume, None);
        assert_eq!(characteristics.symptom_count, None);
    }
}
