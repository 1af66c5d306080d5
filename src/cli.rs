use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::routines::settings::Settings;

#[derive(Debug, Parser)]
#[command(
    name = "oncodose",
    version,
    about = "Search chemo/radiotherapy regimens for the lowest predicted tumor volume"
)]
#[command(group(ArgGroup::new("modalities").args(["all_modalities", "current_only"])))]
pub struct Cli {
    /// Patient record as JSON; its treatment fields double as the clinician plan
    pub patient: PathBuf,

    #[arg(long, help = "TOML settings file")]
    pub settings: Option<PathBuf>,

    #[arg(long, help = "Directory holding the model artifacts")]
    pub artifacts: Option<PathBuf>,

    #[arg(long, help = "Directory for regimens.csv, result.json and settings.json")]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Search every treatment type")]
    pub all_modalities: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Search only the clinician's current treatment type"
    )]
    pub current_only: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Do not compare against the patient's current plan"
    )]
    pub no_plan: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the file/environment settings
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(artifacts) = &self.artifacts {
            settings.paths.artifacts = artifacts.clone();
        }
        if let Some(output) = &self.output {
            settings.paths.output = Some(output.clone());
        }
        if self.all_modalities {
            settings.search.test_all_modalities = true;
        }
        if self.current_only {
            settings.search.test_all_modalities = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_settings() {
        let cli = Cli::parse_from([
            "oncodose",
            "patient.json",
            "--artifacts",
            "trained",
            "--current-only",
        ]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.paths.artifacts, PathBuf::from("trained"));
        assert!(!settings.search.test_all_modalities);
        assert!(!cli.no_plan);
    }

    #[test]
    fn modality_flags_conflict() {
        let parsed =
            Cli::try_parse_from(["oncodose", "p.json", "--all-modalities", "--current-only"]);
        assert!(parsed.is_err());
    }
}
