use serde::{Deserialize, Serialize};

use crate::structs::patient::NeurologicalStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symptom {
    Headache,
    MotorDeficit,
    Seizures,
    SensoryDeficit,
    CognitiveDecline,
    SpeechDisturbance,
    VisualDisturbance,
}

/// Text marker that forces the symptom count to zero
pub const ASYMPTOMATIC: &str = "asymptomatic";

/// Keywords searched for in the lower-cased symptom text, one rule per symptom
pub const SYMPTOM_RULES: &[(Symptom, &[&str])] = &[
    (Symptom::Headache, &["headache"]),
    (Symptom::MotorDeficit, &["motor_deficit", "motor deficit"]),
    (Symptom::Seizures, &["seizure"]),
    (Symptom::SensoryDeficit, &["sensory_deficit", "sensory deficit"]),
    (Symptom::CognitiveDecline, &["cognitive"]),
    (Symptom::SpeechDisturbance, &["speech"]),
    (Symptom::VisualDisturbance, &["visual"]),
];

/// The seven binary symptom indicators plus their count
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomProfile {
    pub has_headache: bool,
    pub has_motor_deficit: bool,
    pub has_seizures: bool,
    pub has_sensory_deficit: bool,
    pub has_cognitive_decline: bool,
    pub has_speech_disturbance: bool,
    pub has_visual_disturbance: bool,
    pub symptom_count: u32,
}

impl SymptomProfile {
    fn slot(&mut self, symptom: Symptom) -> &mut bool {
        match symptom {
            Symptom::Headache => &mut self.has_headache,
            Symptom::MotorDeficit => &mut self.has_motor_deficit,
            Symptom::Seizures => &mut self.has_seizures,
            Symptom::SensoryDeficit => &mut self.has_sensory_deficit,
            Symptom::CognitiveDecline => &mut self.has_cognitive_decline,
            Symptom::SpeechDisturbance => &mut self.has_speech_disturbance,
            Symptom::VisualDisturbance => &mut self.has_visual_disturbance,
        }
    }

    pub fn flags(&self) -> [bool; 7] {
        [
            self.has_headache,
            self.has_motor_deficit,
            self.has_seizures,
            self.has_sensory_deficit,
            self.has_cognitive_decline,
            self.has_speech_disturbance,
            self.has_visual_disturbance,
        ]
    }

    fn flag_sum(&self) -> u32 {
        self.flags().iter().filter(|&&f| f).count() as u32
    }
}

fn explicit_flag(status: &NeurologicalStatus, symptom: Symptom) -> Option<bool> {
    match symptom {
        Symptom::Headache => status.has_headache,
        Symptom::MotorDeficit => status.has_motor_deficit,
        Symptom::Seizures => status.has_seizures,
        Symptom::SensoryDeficit => status.has_sensory_deficit,
        Symptom::CognitiveDecline => status.has_cognitive_decline,
        Symptom::SpeechDisturbance => status.has_speech_disturbance,
        Symptom::VisualDisturbance => status.has_visual_disturbance,
    }
}

/// Decompose a neurological status into a [SymptomProfile].
///
/// An explicit flag wins over the text for its symptom. The count is the
/// explicit count when given, zero when the text says "asymptomatic", and
/// otherwise the number of flags set.
pub fn parse_symptoms(status: &NeurologicalStatus) -> SymptomProfile {
    let text = status
        .neurological_symptoms
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    let mut profile = SymptomProfile::default();
    for (symptom, keywords) in SYMPTOM_RULES {
        let present = explicit_flag(status, *symptom)
            .unwrap_or_else(|| keywords.iter().any(|k| text.contains(k)));
        *profile.slot(*symptom) = present;
    }

    profile.symptom_count = match status.symptom_count {
        Some(count) => count,
        None if text.contains(ASYMPTOMATIC) => 0,
        None => profile.flag_sum(),
    };
    profile
}
