use crate::features::treatment::parse_treatment_flags;
use crate::structs::regimen::{RadioSchedule, Regimen, TreatmentType};

/// Branches in emission order
pub const BRANCH_ORDER: [TreatmentType; 3] = [
    TreatmentType::Radiation,
    TreatmentType::Chemotherapy,
    TreatmentType::Chemoradiotherapy,
];

/// Treatment types to search.
///
/// All three when `test_all_modalities`, otherwise the single type implied by
/// the clinician's treatment text, or none when the text implies no type.
pub fn select_branches(clinician_text: &str, test_all_modalities: bool) -> Vec<TreatmentType> {
    if test_all_modalities {
        return BRANCH_ORDER.to_vec();
    }
    parse_treatment_flags(clinician_text)
        .treatment_type()
        .into_iter()
        .collect()
}

/// Candidate regimens of one branch, in grid order
pub fn branch_candidates(
    branch: TreatmentType,
    chemo_grid: &[f64],
    radio_grid: &[RadioSchedule],
) -> Vec<Regimen> {
    match branch {
        TreatmentType::Radiation => radio_grid.iter().map(|s| Regimen::radiation(*s)).collect(),
        TreatmentType::Chemotherapy => chemo_grid
            .iter()
            .map(|dose| Regimen::chemotherapy(*dose))
            .collect(),
        TreatmentType::Chemoradiotherapy => chemo_grid
            .iter()
            .flat_map(|dose| {
                radio_grid
                    .iter()
                    .map(move |s| Regimen::chemoradiotherapy(*dose, *s))
            })
            .collect(),
    }
}

/// Every candidate of the selected branches.
///
/// Radiation comes before chemotherapy before the combination whatever order
/// `branches` lists them in; best-regimen tie-breaking relies on this order.
pub fn candidates(
    branches: &[TreatmentType],
    chemo_grid: &[f64],
    radio_grid: &[RadioSchedule],
) -> Vec<Regimen> {
    BRANCH_ORDER
        .iter()
        .filter(|branch| branches.contains(branch))
        .flat_map(|branch| branch_candidates(*branch, chemo_grid, radio_grid))
        .collect()
}
