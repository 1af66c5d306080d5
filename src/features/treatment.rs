//! Treatment text parsing and dosage resolution.
//!
//! Flags come from ordered keyword rules over the lower-cased treatment text;
//! doses come from ordered regular-expression patterns where the first
//! matching pattern wins. Nothing here fails: text that matches no rule
//! simply yields zero flags and zero doses.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::structs::patient::{ChemotherapyPrescription, RadiotherapyPrescription};
use crate::structs::regimen::{bed, Dosages, RadioSchedule, TreatmentType};

/// Chemotherapy dose used when chemo is indicated but no dose is given
pub const DEFAULT_CHEMO_DOSE_MG_PER_M2: f64 = 75.0;
/// Radiotherapy schedule used when radiation is indicated but no dose is given
pub const DEFAULT_RADIO_SCHEDULE: RadioSchedule = RadioSchedule {
    total_gy: 60.0,
    fractions: 30,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreatmentFlag {
    Chemo,
    Radio,
    Bevacizumab,
    OtherDrug,
    DrugTemozolomide,
    DrugLomustine,
    DrugCarboplatin,
    DrugEtoposide,
    DrugIrinotecan,
    DrugBevacizumab,
}

/// Sets `flag` when any keyword is a substring of the lower-cased text
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub flag: TreatmentFlag,
    pub keywords: &'static [&'static str],
}

impl KeywordRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

pub const TREATMENT_RULES: &[KeywordRule] = &[
    KeywordRule {
        flag: TreatmentFlag::Chemo,
        keywords: &["temozolomide", "tmz", "chem"],
    },
    KeywordRule {
        flag: TreatmentFlag::Radio,
        keywords: &["radiation", "radiotherapy", "rt", "radiother"],
    },
    KeywordRule {
        flag: TreatmentFlag::Bevacizumab,
        keywords: &["bevacizumab", "beva"],
    },
    KeywordRule {
        flag: TreatmentFlag::OtherDrug,
        keywords: &["lomustine", "ccnu", "carboplatin", "etoposide", "irinotecan"],
    },
    KeywordRule {
        flag: TreatmentFlag::DrugTemozolomide,
        keywords: &["temozolomide", "tmz"],
    },
    KeywordRule {
        flag: TreatmentFlag::DrugLomustine,
        keywords: &["lomustine", "ccnu"],
    },
    KeywordRule {
        flag: TreatmentFlag::DrugCarboplatin,
        keywords: &["carboplatin"],
    },
    KeywordRule {
        flag: TreatmentFlag::DrugEtoposide,
        keywords: &["etoposide"],
    },
    KeywordRule {
        flag: TreatmentFlag::DrugIrinotecan,
        keywords: &["irinotecan"],
    },
    KeywordRule {
        flag: TreatmentFlag::DrugBevacizumab,
        keywords: &["bevacizumab", "beva"],
    },
];

/// Binary treatment indicators extracted from free text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentFlags {
    pub chemo: bool,
    pub radio: bool,
    pub beva: bool,
    pub other_drug: bool,
    pub drug_temozolomide: bool,
    pub drug_lomustine: bool,
    pub drug_carboplatin: bool,
    pub drug_etoposide: bool,
    pub drug_irinotecan: bool,
    pub drug_bevacizumab: bool,
}

impl TreatmentFlags {
    fn set(&mut self, flag: TreatmentFlag) {
        let slot = match flag {
            TreatmentFlag::Chemo => &mut self.chemo,
            TreatmentFlag::Radio => &mut self.radio,
            TreatmentFlag::Bevacizumab => &mut self.beva,
            TreatmentFlag::OtherDrug => &mut self.other_drug,
            TreatmentFlag::DrugTemozolomide => &mut self.drug_temozolomide,
            TreatmentFlag::DrugLomustine => &mut self.drug_lomustine,
            TreatmentFlag::DrugCarboplatin => &mut self.drug_carboplatin,
            TreatmentFlag::DrugEtoposide => &mut self.drug_etoposide,
            TreatmentFlag::DrugIrinotecan => &mut self.drug_irinotecan,
            TreatmentFlag::DrugBevacizumab => &mut self.drug_bevacizumab,
        };
        *slot = true;
    }

    /// Treatment type when the chemo/radio flags are unambiguous
    pub fn treatment_type(&self) -> Option<TreatmentType> {
        TreatmentType::from_flags(self.chemo, self.radio)
    }
}

pub fn parse_treatment_flags(text: &str) -> TreatmentFlags {
    let lowered = text.to_lowercase();
    let mut flags = TreatmentFlags::default();
    for rule in TREATMENT_RULES {
        if rule.matches(&lowered) {
            flags.set(rule.flag);
        }
    }
    flags
}

lazy_static! {
    /// Single capture: chemotherapy dose in mg/m²
    pub static ref CHEMO_DOSE_PATTERNS: Vec<Regex> = [
        r"(\d+)\s*mg\s*/\s*m2",
        r"(\d+)\s*mg/m²",
        r"temozolomide\s+(\d+)",
        r"tmz\s+(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("chemo dose pattern"))
    .collect();

    /// Two captures: total radiotherapy dose (Gy) and number of fractions
    pub static ref RADIO_DOSE_PATTERNS: Vec<Regex> = [
        r"(\d+)\s*gy\s*/\s*(\d+)\s*fr",
        r"(\d+)\s*gy\s*/\s*(\d+)",
        r"radiation\s+(\d+)\s*gy.*?(\d+)\s*fr",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("radio dose pattern"))
    .collect();
}

/// The first pattern that matches decides, even if its number does not parse
fn first_chemo_dose(lowered: &str) -> Option<f64> {
    let caps = CHEMO_DOSE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(lowered))?;
    caps[1].parse::<f64>().ok()
}

fn first_radio_schedule(lowered: &str) -> Option<RadioSchedule> {
    let caps = RADIO_DOSE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(lowered))?;
    let total_gy = caps[1].parse::<f64>().ok()?;
    let fractions = caps[2].parse::<u32>().ok()?;
    Some(RadioSchedule::new(total_gy, fractions))
}

/// Doses literally written in the treatment text, zero where none is found
pub fn parse_dosage_text(text: &str) -> Dosages {
    let lowered = text.to_lowercase();
    let mut dosages = Dosages::default();
    if let Some(dose) = first_chemo_dose(&lowered) {
        dosages.chemo_dose_mg_per_m2 = dose;
    }
    if let Some(schedule) = first_radio_schedule(&lowered) {
        dosages.radio_total_gy = schedule.total_gy;
        dosages.radio_fractions = schedule.fractions;
        dosages.radio_bed = schedule.bed();
    }
    dosages
}

/// Resolve the doses of a plan.
///
/// Each modality independently takes the structured prescription when it is
/// positive, else the dose found in the text, else the default when the text
/// indicates that modality.
pub fn resolve_dosages(
    chemotherapy: Option<&ChemotherapyPrescription>,
    radiotherapy: Option<&RadiotherapyPrescription>,
    text: &str,
) -> Dosages {
    let mut dosages = Dosages::default();

    if let Some(chemo) = chemotherapy {
        dosages.chemo_dose_mg_per_m2 = chemo.dose_mg_per_m2;
    }
    if let Some(radio) = radiotherapy {
        if radio.total_dose_gy > 0.0 {
            dosages.radio_total_gy = radio.total_dose_gy;
            dosages.radio_fractions = radio.fractions;
            dosages.radio_bed = bed(radio.total_dose_gy, radio.fractions);
        }
    }

    if dosages.chemo_dose_mg_per_m2 == 0.0 || dosages.radio_total_gy == 0.0 {
        let parsed = parse_dosage_text(text);
        if dosages.chemo_dose_mg_per_m2 == 0.0 {
            dosages.chemo_dose_mg_per_m2 = parsed.chemo_dose_mg_per_m2;
        }
        if dosages.radio_total_gy == 0.0 {
            dosages.radio_total_gy = parsed.radio_total_gy;
            dosages.radio_fractions = parsed.radio_fractions;
            dosages.radio_bed = parsed.radio_bed;
        }
    }

    let flags = parse_treatment_flags(text);
    if flags.chemo && dosages.chemo_dose_mg_per_m2 == 0.0 {
        dosages.chemo_dose_mg_per_m2 = DEFAULT_CHEMO_DOSE_MG_PER_M2;
    }
    if flags.radio && dosages.radio_total_gy == 0.0 {
        dosages.radio_total_gy = DEFAULT_RADIO_SCHEDULE.total_gy;
        dosages.radio_fractions = DEFAULT_RADIO_SCHEDULE.fractions;
        dosages.radio_bed = DEFAULT_RADIO_SCHEDULE.bed();
    }

    dosages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(flag: TreatmentFlag) -> KeywordRule {
        *TREATMENT_RULES.iter().find(|r| r.flag == flag).unwrap()
    }

    #[test]
    fn each_keyword_rule_matches_independently() {
        assert!(rule(TreatmentFlag::Chemo).matches("tmz daily"));
        assert!(!rule(TreatmentFlag::Chemo).matches("radiation only"));
        assert!(rule(TreatmentFlag::Radio).matches("adjuvant rt"));
        assert!(!rule(TreatmentFlag::Radio).matches("temozolomide"));
        assert!(rule(TreatmentFlag::OtherDrug).matches("ccnu"));
        assert!(rule(TreatmentFlag::DrugBevacizumab).matches("beva"));
    }

    #[test]
    fn branch_texts_set_expected_flags() {
        let radiation = parse_treatment_flags("radiation");
        assert!(radiation.radio && !radiation.chemo);
        let chemo = parse_treatment_flags("chemotherapy");
        assert!(chemo.chemo && !chemo.radio);
        let both = parse_treatment_flags("Chemoradiotherapy");
        assert!(both.chemo && both.radio);
        assert_eq!(both.treatment_type(), Some(TreatmentType::Chemoradiotherapy));
    }

    #[test]
    fn unknown_text_yields_no_flags() {
        assert_eq!(parse_treatment_flags("observation"), TreatmentFlags::default());
        assert_eq!(parse_treatment_flags(""), TreatmentFlags::default());
    }

    #[test]
    fn drug_flags_are_specific() {
        let flags = parse_treatment_flags("TMZ + Bevacizumab + Lomustine");
        assert!(flags.drug_temozolomide && flags.drug_bevacizumab && flags.drug_lomustine);
        assert!(flags.beva && flags.other_drug);
        assert!(!flags.drug_carboplatin && !flags.drug_etoposide && !flags.drug_irinotecan);
    }

    #[test]
    fn chemo_patterns_in_order() {
        assert_eq!(parse_dosage_text("TMZ 150 mg/m2").chemo_dose_mg_per_m2, 150.0);
        assert_eq!(parse_dosage_text("100 mg / m2 daily").chemo_dose_mg_per_m2, 100.0);
        assert_eq!(parse_dosage_text("temozolomide 200").chemo_dose_mg_per_m2, 200.0);
        assert_eq!(parse_dosage_text("tmz 75").chemo_dose_mg_per_m2, 75.0);
        // first pattern wins over the drug-name pattern
        assert_eq!(
            parse_dosage_text("tmz 90 then 150 mg/m2").chemo_dose_mg_per_m2,
            150.0
        );
    }

    #[test]
    fn radio_patterns_capture_fractions() {
        let dosages = parse_dosage_text("RT 60 Gy/30 fr");
        assert_eq!(dosages.radio_total_gy, 60.0);
        assert_eq!(dosages.radio_fractions, 30);
        assert_eq!(dosages.radio_bed, 72.0);

        let dosages = parse_dosage_text("40 gy / 15");
        assert_eq!((dosages.radio_total_gy, dosages.radio_fractions), (40.0, 15));

        let dosages = parse_dosage_text("radiation 54 gy in 30 fractions");
        assert_eq!((dosages.radio_total_gy, dosages.radio_fractions), (54.0, 30));
    }

    #[test]
    fn first_matching_pattern_decides_even_when_unparsable() {
        let dosages = parse_dosage_text("60 gy/5000000000 fr, radiation 54 gy 30 fr");
        assert_eq!(dosages.radio_total_gy, 0.0);
        assert_eq!(dosages.radio_fractions, 0);
    }

    #[test]
    fn explicit_prescription_wins() {
        let chemo = ChemotherapyPrescription {
            dose_mg_per_m2: 100.0,
        };
        let radio = RadiotherapyPrescription {
            total_dose_gy: 50.0,
            fractions: 25,
        };
        let dosages = resolve_dosages(Some(&chemo), Some(&radio), "TMZ 150 mg/m2 + 60 Gy/30 fr");
        assert_eq!(dosages.chemo_dose_mg_per_m2, 100.0);
        assert_eq!(dosages.radio_total_gy, 50.0);
        assert_eq!(dosages.radio_fractions, 25);
    }

    #[test]
    fn defaults_apply_only_for_flagged_modalities() {
        let dosages = resolve_dosages(None, None, "chemoradiotherapy");
        assert_eq!(dosages.chemo_dose_mg_per_m2, 75.0);
        assert_eq!(dosages.radio_total_gy, 60.0);
        assert_eq!(dosages.radio_fractions, 30);
        assert_eq!(dosages.radio_bed, 72.0);

        let dosages = resolve_dosages(None, None, "chemotherapy");
        assert_eq!(dosages.radio_total_gy, 0.0);
        assert_eq!(dosages.radio_bed, 0.0);

        assert_eq!(resolve_dosages(None, None, "watchful waiting"), Dosages::default());
    }
}
