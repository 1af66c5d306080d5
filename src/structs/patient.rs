use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A single patient as received by the engine.
///
/// Only `id`, `age`, `tumor_size_before`, `kps` and `treatment` are required.
/// Every other attribute is optional and resolved to a documented default
/// during feature construction, so an absent field is never an error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PatientRecord {
    #[serde(alias = "patient_id")]
    pub id: String,
    pub age: f64,
    /// Tumor volume at baseline (cm³)
    pub tumor_size_before: f64,
    /// Karnofsky performance score, 0-100
    pub kps: f64,
    /// Free-text treatment description, e.g. "TMZ 75 mg/m2 + RT 60 Gy/30 fr"
    pub treatment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemotherapy: Option<ChemotherapyPrescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radiotherapy: Option<RadiotherapyPrescription>,

    #[serde(flatten)]
    pub genetics: GeneticMarkers,
    #[serde(flatten)]
    pub clinical: ClinicalFeatures,
    #[serde(flatten)]
    pub neurology: NeurologicalStatus,
    #[serde(flatten)]
    pub categories: CategoricalFields,

    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub family_history: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_radiation: Option<bool>,
}

/// Structured chemotherapy prescription, takes precedence over the treatment text
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct ChemotherapyPrescription {
    #[serde(default)]
    pub dose_mg_per_m2: f64,
}

/// Structured radiotherapy prescription, takes precedence over the treatment text
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct RadiotherapyPrescription {
    #[serde(default, alias = "total_dose_Gy")]
    pub total_dose_gy: f64,
    #[serde(default)]
    pub fractions: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GeneticMarkers {
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub mgmt_methylation: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub idh_mutation: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub egfr_amplification: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub tert_mutation: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub atrx_mutation: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClinicalFeatures {
    /// Peritumoral edema volume (cm³)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edema_volume: Option<f64>,
    /// Daily dexamethasone-equivalent dose (mg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steroid_dose: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub antiseizure_meds: Option<bool>,
}

/// Neurological presentation, either as free text or as explicit flags.
///
/// An explicit flag always wins over what the text says for that symptom.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NeurologicalStatus {
    #[serde(
        default,
        deserialize_with = "deserialize_symptom_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub neurological_symptoms: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_headache: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_motor_deficit: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_seizures: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_sensory_deficit: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_cognitive_decline: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_speech_disturbance: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_visual_disturbance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_count: Option<u32>,
}

/// Categorical fields fed to the one-hot encoder.
///
/// Non-string JSON values are kept in their textual form, so a malformed
/// value encodes like any other category unseen at training time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CategoricalFields {
    #[serde(
        default,
        deserialize_with = "deserialize_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub resection_extent: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub molecular_subtype: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub tumor_location: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub contrast_enhancement: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub stage: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub lateralization: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub rano_response: Option<String>,
}

impl CategoricalFields {
    /// Field name, value and the default used when the value is absent.
    pub fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("gender", self.gender.as_deref().unwrap_or("M")),
            (
                "resection_extent",
                self.resection_extent.as_deref().unwrap_or("subtotal"),
            ),
            (
                "molecular_subtype",
                self.molecular_subtype.as_deref().unwrap_or("classical"),
            ),
            (
                "tumor_location",
                self.tumor_location.as_deref().unwrap_or("frontal_lobe"),
            ),
            (
                "contrast_enhancement",
                self.contrast_enhancement.as_deref().unwrap_or("ring"),
            ),
            ("stage", self.stage.as_deref().unwrap_or("Stage 1")),
            (
                "lateralization",
                self.lateralization.as_deref().unwrap_or("left"),
            ),
            (
                "rano_response",
                self.rano_response.as_deref().unwrap_or("stable_disease"),
            ),
        ]
    }
}

impl PatientRecord {
    pub fn new(id: impl Into<String>, age: f64, tumor_size_before: f64, kps: f64) -> Self {
        PatientRecord {
            id: id.into(),
            age,
            tumor_size_before,
            kps,
            ..Default::default()
        }
    }

    pub fn with_treatment(mut self, treatment: impl Into<String>) -> Self {
        self.treatment = treatment.into();
        self
    }

    pub fn with_chemotherapy(mut self, dose_mg_per_m2: f64) -> Self {
        self.chemotherapy = Some(ChemotherapyPrescription { dose_mg_per_m2 });
        self
    }

    pub fn with_radiotherapy(mut self, total_dose_gy: f64, fractions: u32) -> Self {
        self.radiotherapy = Some(RadiotherapyPrescription {
            total_dose_gy,
            fractions,
        });
        self
    }

    pub fn with_symptoms(mut self, symptoms: impl Into<String>) -> Self {
        self.neurology.neurological_symptoms = Some(symptoms.into());
        self
    }

    /// Check the record against the ranges the engine assumes.
    ///
    /// The engine itself never calls this; callers are expected to reject a
    /// record with issues before asking for an optimization.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.id.trim().is_empty() {
            issues.push(ValidationIssue::MissingField("id"));
        }
        if self.treatment.trim().is_empty() {
            issues.push(ValidationIssue::MissingField("treatment"));
        }
        if !(0.0..=120.0).contains(&self.age) {
            issues.push(ValidationIssue::OutOfRange {
                field: "age",
                value: self.age,
                expected: "between 0 and 120",
            });
        }
        if !(self.tumor_size_before > 0.0) {
            issues.push(ValidationIssue::OutOfRange {
                field: "tumor_size_before",
                value: self.tumor_size_before,
                expected: "positive",
            });
        }
        if !(0.0..=100.0).contains(&self.kps) {
            issues.push(ValidationIssue::OutOfRange {
                field: "kps",
                value: self.kps,
                expected: "between 0 and 100",
            });
        }
        if let Some(chemo) = &self.chemotherapy {
            if chemo.dose_mg_per_m2 < 0.0 {
                issues.push(ValidationIssue::OutOfRange {
                    field: "chemotherapy.dose_mg_per_m2",
                    value: chemo.dose_mg_per_m2,
                    expected: "non-negative",
                });
            }
        }
        if let Some(radio) = &self.radiotherapy {
            if radio.total_dose_gy < 0.0 {
                issues.push(ValidationIssue::OutOfRange {
                    field: "radiotherapy.total_dose_gy",
                    value: radio.total_dose_gy,
                    expected: "non-negative",
                });
            } else if (radio.total_dose_gy > 0.0) != (radio.fractions > 0) {
                issues.push(ValidationIssue::OutOfRange {
                    field: "radiotherapy.fractions",
                    value: radio.fractions as f64,
                    expected: "positive exactly when the total dose is positive",
                });
            }
        }
        if let Some(edema) = self.clinical.edema_volume {
            if edema < 0.0 {
                issues.push(ValidationIssue::OutOfRange {
                    field: "edema_volume",
                    value: edema,
                    expected: "non-negative",
                });
            }
        }
        if let Some(steroid) = self.clinical.steroid_dose {
            if steroid < 0.0 {
                issues.push(ValidationIssue::OutOfRange {
                    field: "steroid_dose",
                    value: steroid,
                    expected: "non-negative",
                });
            }
        }
        issues
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    MissingField(&'static str),
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField(field) => write!(f, "{} is required", field),
            ValidationIssue::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "{} must be {} (got {})", field, expected, value),
        }
    }
}

/// The clinician's current plan, used as the comparison baseline.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClinicianPlan {
    pub treatment: String,
    #[serde(default)]
    pub chemotherapy: Option<ChemotherapyPrescription>,
    #[serde(default)]
    pub radiotherapy: Option<RadiotherapyPrescription>,
}

impl ClinicianPlan {
    /// The plan implied by a patient record's own treatment fields
    pub fn from_patient(patient: &PatientRecord) -> Self {
        ClinicianPlan {
            treatment: patient.treatment.clone(),
            chemotherapy: patient.chemotherapy,
            radiotherapy: patient.radiotherapy,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accepts `true`/`false`, `0`/`1` and their string forms.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr: Option<FlagRepr> = Option::deserialize(deserializer)?;
    Ok(repr.map(|repr| match repr {
        FlagRepr::Bool(b) => b,
        FlagRepr::Int(i) => i != 0,
        FlagRepr::Float(x) => x != 0.0,
        FlagRepr::Text(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "1" | "y"
        ),
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryRepr {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Accepts any scalar, numbers and booleans become their textual form.
fn deserialize_category<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr: Option<CategoryRepr> = Option::deserialize(deserializer)?;
    Ok(repr.map(|repr| match repr {
        CategoryRepr::Text(s) => s,
        CategoryRepr::Int(i) => i.to_string(),
        CategoryRepr::Float(x) => x.to_string(),
        CategoryRepr::Bool(b) => b.to_string(),
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SymptomRepr {
    Text(String),
    List(Vec<String>),
}

/// Symptoms may come as `"headache, seizures"` or `["headache", "seizures"]`.
fn deserialize_symptom_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr: Option<SymptomRepr> = Option::deserialize(deserializer)?;
    Ok(repr.map(|repr| match repr {
        SymptomRepr::Text(s) => s,
        SymptomRepr::List(items) => items.join(", "),
    }))
}
