use serde::{Deserialize, Serialize};
use std::fmt;

/// α/β ratio (Gy) used in the linear-quadratic BED formula
pub const ALPHA_BETA_RATIO: f64 = 10.0;

/// Biologically effective dose of a fractionated radiotherapy schedule.
///
/// `BED = n·d·(1 + d/(α/β))` with `d = total/n` and α/β = 10 Gy.
/// A schedule without fractions has no biological effect and yields 0.
pub fn bed(total_gy: f64, fractions: u32) -> f64 {
    if total_gy <= 0.0 || fractions == 0 {
        return 0.0;
    }
    let n = fractions as f64;
    let d = total_gy / n;
    n * d * (1.0 + d / ALPHA_BETA_RATIO)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentType {
    Radiation,
    Chemotherapy,
    Chemoradiotherapy,
}

impl TreatmentType {
    /// Treatment type implied by a pair of chemo/radio flags, if any
    pub fn from_flags(chemo: bool, radio: bool) -> Option<Self> {
        match (chemo, radio) {
            (true, true) => Some(TreatmentType::Chemoradiotherapy),
            (true, false) => Some(TreatmentType::Chemotherapy),
            (false, true) => Some(TreatmentType::Radiation),
            (false, false) => None,
        }
    }

    pub fn chemo_on(&self) -> bool {
        matches!(
            self,
            TreatmentType::Chemotherapy | TreatmentType::Chemoradiotherapy
        )
    }

    pub fn radio_on(&self) -> bool {
        matches!(
            self,
            TreatmentType::Radiation | TreatmentType::Chemoradiotherapy
        )
    }

    /// Canonical treatment text fed to the feature builder for this branch
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentType::Radiation => "radiation",
            TreatmentType::Chemotherapy => "chemotherapy",
            TreatmentType::Chemoradiotherapy => "chemoradiotherapy",
        }
    }
}

impl fmt::Display for TreatmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A radiotherapy prescription on the search grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadioSchedule {
    pub total_gy: f64,
    pub fractions: u32,
}

impl RadioSchedule {
    pub fn new(total_gy: f64, fractions: u32) -> Self {
        RadioSchedule {
            total_gy,
            fractions,
        }
    }

    pub fn bed(&self) -> f64 {
        bed(self.total_gy, self.fractions)
    }
}

impl From<(f64, u32)> for RadioSchedule {
    fn from((total_gy, fractions): (f64, u32)) -> Self {
        RadioSchedule::new(total_gy, fractions)
    }
}

/// Resolved dose quantities as consumed by the feature builder
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dosages {
    pub chemo_dose_mg_per_m2: f64,
    pub radio_total_gy: f64,
    pub radio_fractions: u32,
    pub radio_bed: f64,
}

impl Dosages {
    pub fn chemotherapy(dose_mg_per_m2: f64) -> Self {
        Dosages {
            chemo_dose_mg_per_m2: dose_mg_per_m2,
            ..Default::default()
        }
    }

    pub fn radiotherapy(schedule: RadioSchedule) -> Self {
        Dosages {
            radio_total_gy: schedule.total_gy,
            radio_fractions: schedule.fractions,
            radio_bed: schedule.bed(),
            ..Default::default()
        }
    }

    pub fn combined(dose_mg_per_m2: f64, schedule: RadioSchedule) -> Self {
        Dosages {
            chemo_dose_mg_per_m2: dose_mg_per_m2,
            ..Dosages::radiotherapy(schedule)
        }
    }
}

/// One candidate treatment regimen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regimen {
    pub treatment_type: TreatmentType,
    pub chemo_dose_mg_per_m2: f64,
    #[serde(rename = "radio_total_Gy")]
    pub radio_total_gy: f64,
    pub radio_fractions: u32,
}

impl Regimen {
    pub fn radiation(schedule: RadioSchedule) -> Self {
        Regimen {
            treatment_type: TreatmentType::Radiation,
            chemo_dose_mg_per_m2: 0.0,
            radio_total_gy: schedule.total_gy,
            radio_fractions: schedule.fractions,
        }
    }

    pub fn chemotherapy(dose_mg_per_m2: f64) -> Self {
        Regimen {
            treatment_type: TreatmentType::Chemotherapy,
            chemo_dose_mg_per_m2: dose_mg_per_m2,
            radio_total_gy: 0.0,
            radio_fractions: 0,
        }
    }

    pub fn chemoradiotherapy(dose_mg_per_m2: f64, schedule: RadioSchedule) -> Self {
        Regimen {
            treatment_type: TreatmentType::Chemoradiotherapy,
            chemo_dose_mg_per_m2: dose_mg_per_m2,
            radio_total_gy: schedule.total_gy,
            radio_fractions: schedule.fractions,
        }
    }

    pub fn bed(&self) -> f64 {
        bed(self.radio_total_gy, self.radio_fractions)
    }

    /// Dose per fraction (Gy), 0 when no radiotherapy is given
    pub fn fraction_dose_gy(&self) -> f64 {
        if self.radio_fractions == 0 {
            0.0
        } else {
            self.radio_total_gy / self.radio_fractions as f64
        }
    }

    pub fn dosages(&self) -> Dosages {
        Dosages {
            chemo_dose_mg_per_m2: self.chemo_dose_mg_per_m2,
            radio_total_gy: self.radio_total_gy,
            radio_fractions: self.radio_fractions,
            radio_bed: self.bed(),
        }
    }
}

impl fmt::Display for Regimen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.treatment_type {
            TreatmentType::Radiation => write!(
                f,
                "RT {:.0} Gy/{} fr",
                self.radio_total_gy, self.radio_fractions
            ),
            TreatmentType::Chemotherapy => write!(f, "TMZ {:.0} mg/m2", self.chemo_dose_mg_per_m2),
            TreatmentType::Chemoradiotherapy => write!(
                f,
                "TMZ {:.0} mg/m2 + RT {:.0} Gy/{} fr",
                self.chemo_dose_mg_per_m2, self.radio_total_gy, self.radio_fractions
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bed_standard_schedule() {
        assert_eq!(bed(60.0, 30), 72.0);
    }

    #[test]
    fn bed_hypofractionated_schedule() {
        assert_relative_eq!(bed(40.0, 15), 50.666_666_666_666_664, epsilon = 1e-9);
    }

    #[test]
    fn bed_without_fractions_is_zero() {
        assert_eq!(bed(60.0, 0), 0.0);
        assert_eq!(bed(0.0, 30), 0.0);
    }

    #[test]
    fn treatment_type_from_flags() {
        assert_eq!(
            TreatmentType::from_flags(true, true),
            Some(TreatmentType::Chemoradiotherapy)
        );
        assert_eq!(
            TreatmentType::from_flags(false, true),
            Some(TreatmentType::Radiation)
        );
        assert_eq!(TreatmentType::from_flags(false, false), None);
        assert!(TreatmentType::Chemoradiotherapy.chemo_on());
        assert!(!TreatmentType::Chemotherapy.radio_on());
    }

    #[test]
    fn regimen_dosages_carry_bed() {
        let regimen = Regimen::chemoradiotherapy(75.0, RadioSchedule::new(60.0, 30));
        let dosages = regimen.dosages();
        assert_eq!(dosages.radio_bed, 72.0);
        assert_eq!(regimen.fraction_dose_gy(), 2.0);
        assert_eq!(regimen.to_string(), "TMZ 75 mg/m2 + RT 60 Gy/30 fr");
    }
}
