//! Numeric base features and the arithmetic features derived from them.

use super::symptoms::SymptomProfile;
use super::treatment::TreatmentFlags;
use crate::structs::patient::PatientRecord;
use crate::structs::regimen::Dosages;

/// Observation count assumed for the fit-derived placeholders
pub const PLACEHOLDER_N_OBS: f64 = 5.0;
pub const PLACEHOLDER_ALPHA: f64 = 0.05;
pub const PLACEHOLDER_BETA: f64 = 0.03;

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

fn optional_indicator(flag: Option<bool>) -> f64 {
    indicator(flag.unwrap_or(false))
}

/// Every numeric input of the model before one-hot columns are appended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericFeatures {
    pub age: f64,
    pub tumor_size_before: f64,
    pub kps: f64,
    pub flags: TreatmentFlags,
    pub dosages: Dosages,
    pub mgmt_methylation: f64,
    pub idh_mutation: f64,
    pub egfr_amplification: f64,
    pub tert_mutation: f64,
    pub atrx_mutation: f64,
    pub edema_volume: f64,
    pub steroid_dose: f64,
    pub antiseizure_meds: f64,
    pub symptoms: SymptomProfile,
    pub family_history: f64,
    pub previous_radiation: f64,
}

impl NumericFeatures {
    pub fn new(
        patient: &PatientRecord,
        flags: TreatmentFlags,
        dosages: Dosages,
        symptoms: SymptomProfile,
    ) -> Self {
        let genetics = &patient.genetics;
        let clinical = &patient.clinical;
        NumericFeatures {
            age: patient.age,
            tumor_size_before: patient.tumor_size_before,
            kps: patient.kps,
            flags,
            dosages,
            mgmt_methylation: optional_indicator(genetics.mgmt_methylation),
            idh_mutation: optional_indicator(genetics.idh_mutation),
            egfr_amplification: optional_indicator(genetics.egfr_amplification),
            tert_mutation: optional_indicator(genetics.tert_mutation),
            atrx_mutation: optional_indicator(genetics.atrx_mutation),
            edema_volume: clinical.edema_volume.unwrap_or(0.0),
            steroid_dose: clinical.steroid_dose.unwrap_or(0.0),
            antiseizure_meds: optional_indicator(clinical.antiseizure_meds),
            symptoms,
            family_history: optional_indicator(patient.family_history),
            previous_radiation: optional_indicator(patient.previous_radiation),
        }
    }

    fn chemo(&self) -> f64 {
        indicator(self.flags.chemo)
    }

    fn radio(&self) -> f64 {
        indicator(self.flags.radio)
    }

    fn beva(&self) -> f64 {
        indicator(self.flags.beva)
    }

    fn symptom_count(&self) -> f64 {
        self.symptoms.symptom_count as f64
    }

    /// The base features under their training column names
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        let f = &self.flags;
        let s = &self.symptoms;
        vec![
            ("age", self.age),
            ("tumor_size_before", self.tumor_size_before),
            ("kps", self.kps),
            ("chemo", self.chemo()),
            ("radio", self.radio()),
            ("beva", self.beva()),
            ("other_drug", indicator(f.other_drug)),
            ("chemo_dose_mg_per_m2", self.dosages.chemo_dose_mg_per_m2),
            ("radio_total_Gy", self.dosages.radio_total_gy),
            ("radio_BED", self.dosages.radio_bed),
            ("drug_temozolomide", indicator(f.drug_temozolomide)),
            ("drug_lomustine", indicator(f.drug_lomustine)),
            ("drug_carboplatin", indicator(f.drug_carboplatin)),
            ("drug_etoposide", indicator(f.drug_etoposide)),
            ("drug_irinotecan", indicator(f.drug_irinotecan)),
            ("drug_bevacizumab", indicator(f.drug_bevacizumab)),
            ("mgmt_methylation", self.mgmt_methylation),
            ("idh_mutation", self.idh_mutation),
            ("egfr_amplification", self.egfr_amplification),
            ("tert_mutation", self.tert_mutation),
            ("atrx_mutation", self.atrx_mutation),
            ("edema_volume", self.edema_volume),
            ("steroid_dose", self.steroid_dose),
            ("antiseizure_meds", self.antiseizure_meds),
            ("has_headache", indicator(s.has_headache)),
            ("has_motor_deficit", indicator(s.has_motor_deficit)),
            ("has_seizures", indicator(s.has_seizures)),
            ("has_sensory_deficit", indicator(s.has_sensory_deficit)),
            ("has_cognitive_decline", indicator(s.has_cognitive_decline)),
            ("has_speech_disturbance", indicator(s.has_speech_disturbance)),
            ("has_visual_disturbance", indicator(s.has_visual_disturbance)),
            ("symptom_count", self.symptom_count()),
            ("family_history", self.family_history),
            ("previous_radiation", self.previous_radiation),
        ]
    }
}

/// Stand-ins for the per-patient curve-fit columns present at training time.
///
/// At inference no fitted curve exists, so fixed values are used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPlaceholders {
    pub r_fit: f64,
    pub k_fit: f64,
    pub n_obs: f64,
    pub alpha_computed: f64,
    pub beta_computed: f64,
}

impl FitPlaceholders {
    pub fn for_tumor_size(tumor_size_before: f64) -> Self {
        FitPlaceholders {
            r_fit: 0.0,
            k_fit: 2.0 * tumor_size_before,
            n_obs: PLACEHOLDER_N_OBS,
            alpha_computed: PLACEHOLDER_ALPHA,
            beta_computed: PLACEHOLDER_BETA,
        }
    }

    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("r_fit", self.r_fit),
            ("K_fit", self.k_fit),
            ("n_obs", self.n_obs),
            ("alpha_computed", self.alpha_computed),
            ("beta_computed", self.beta_computed),
        ]
    }
}

/// Interaction and non-linear terms
pub fn engineered(n: &NumericFeatures, fit: &FitPlaceholders) -> Vec<(&'static str, f64)> {
    let t0 = n.tumor_size_before;
    let chemo = n.chemo();
    let radio = n.radio();
    let dose = n.dosages.chemo_dose_mg_per_m2;
    let bed = n.dosages.radio_bed;
    let symptoms = n.symptom_count();

    vec![
        ("r_fit_x_chemo", fit.r_fit * chemo),
        ("r_fit_x_radio", fit.r_fit * radio),
        ("K_fit_x_chemo", fit.k_fit * chemo),
        ("K_fit_x_radio", fit.k_fit * radio),
        ("alpha_computed_x_chemo", fit.alpha_computed * chemo),
        ("beta_computed_x_radio", fit.beta_computed * radio),
        ("chemo_x_radio", chemo * radio),
        ("chemo_x_tumor_size", chemo * t0),
        ("radio_x_tumor_size", radio * t0),
        ("beva_x_chemo", n.beva() * chemo),
        ("kps_x_chemo", n.kps * chemo),
        ("treatment_count", chemo + radio + n.beva()),
        ("chemo_dose_x_tumor_size", dose * t0),
        ("chemo_dose_x_kps", dose * n.kps),
        ("chemo_dose_x_age", dose * n.age),
        ("radio_BED_x_tumor_size", bed * t0),
        ("radio_BED_x_kps", bed * n.kps),
        ("radio_BED_x_age", bed * n.age),
        ("chemo_dose_x_radio_BED", dose * bed),
        ("mgmt_x_chemo", n.mgmt_methylation * chemo),
        ("mgmt_x_chemo_dose", n.mgmt_methylation * dose),
        ("idh_x_chemo", n.idh_mutation * chemo),
        ("idh_x_radio", n.idh_mutation * radio),
        ("egfr_x_chemo", n.egfr_amplification * chemo),
        ("edema_x_chemo", n.edema_volume * chemo),
        ("edema_x_radio", n.edema_volume * radio),
        ("steroid_x_chemo", n.steroid_dose * chemo),
        ("symptom_count_x_chemo", symptoms * chemo),
        ("symptom_count_x_radio", symptoms * radio),
        ("age_squared", n.age.powi(2)),
        ("tumor_size_squared", t0.powi(2)),
        ("tumor_size_log", t0.ln_1p()),
        ("r_fit_squared", fit.r_fit.powi(2)),
        ("K_fit_log", fit.k_fit.ln_1p()),
        ("chemo_dose_squared", dose.powi(2)),
        ("radio_BED_squared", bed.powi(2)),
        ("chemo_dose_log", dose.ln_1p()),
        ("radio_BED_log", bed.ln_1p()),
        ("edema_squared", n.edema_volume.powi(2)),
        ("steroid_squared", n.steroid_dose.powi(2)),
        ("symptom_count_squared", symptoms.powi(2)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::treatment::parse_treatment_flags;
    use approx::assert_relative_eq;

    fn lookup(features: &[(&'static str, f64)], name: &str) -> f64 {
        features
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .unwrap()
    }

    #[test]
    fn interactions_follow_flags_and_doses() {
        let mut patient = PatientRecord::new("P1", 60.0, 4.0, 80.0);
        patient.genetics.mgmt_methylation = Some(true);
        let flags = parse_treatment_flags("tmz");
        let numeric = NumericFeatures::new(
            &patient,
            flags,
            Dosages::chemotherapy(100.0),
            SymptomProfile::default(),
        );
        let fit = FitPlaceholders::for_tumor_size(4.0);
        let features = engineered(&numeric, &fit);

        assert_eq!(lookup(&features, "K_fit_x_chemo"), 8.0);
        assert_eq!(lookup(&features, "K_fit_x_radio"), 0.0);
        assert_eq!(lookup(&features, "mgmt_x_chemo_dose"), 100.0);
        assert_eq!(lookup(&features, "chemo_dose_x_age"), 6000.0);
        assert_eq!(lookup(&features, "treatment_count"), 1.0);
        assert_relative_eq!(lookup(&features, "tumor_size_log"), 5.0f64.ln());
        assert_relative_eq!(lookup(&features, "chemo_dose_log"), 101.0f64.ln());
    }

    #[test]
    fn absent_optional_fields_are_zero() {
        let patient = PatientRecord::new("P1", 50.0, 3.0, 70.0);
        let numeric = NumericFeatures::new(
            &patient,
            TreatmentFlags::default(),
            Dosages::default(),
            SymptomProfile::default(),
        );
        let named = numeric.named();
        assert_eq!(named.len(), 34);
        for name in ["mgmt_methylation", "edema_volume", "family_history", "chemo"] {
            assert_eq!(lookup(&named, name), 0.0);
        }
    }
}
