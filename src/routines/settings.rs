use config::Config as eConfig;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::optimizer::types::{SearchOptions, DEFAULT_CHEMO_GRID, DEFAULT_RADIO_GRID};
use crate::routines::output::OutputFile;
use crate::simulator::{DEFAULT_DT, DEFAULT_HORIZON_MONTHS};
use crate::structs::regimen::RadioSchedule;

/// Prefix of environment variables overriding the settings file
pub const ENV_PREFIX: &str = "ONCODOSE";

/// Settings for a dosing run.
///
/// Read from a TOML file with [read_settings]; every field has a default so
/// the file only needs the values that differ.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub paths: Paths,
    pub simulation: Simulation,
    pub search: Search,
    pub log: Log,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Paths {
    /// Directory holding the model artifacts
    #[serde(default = "default_artifacts")]
    pub artifacts: PathBuf,
    /// Directory for result files, nothing is written when unset
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Simulation {
    #[serde(default = "default_horizon")]
    pub horizon_months: f64,
    #[serde(default = "default_dt")]
    pub dt: f64,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Search {
    #[serde(default = "default_chemo_grid")]
    pub chemo_grid: Vec<f64>,
    /// (total Gy, fractions) pairs
    #[serde(default = "default_radio_grid")]
    pub radio_grid: Vec<(f64, u32)>,
    #[serde(default = "default_true")]
    pub test_all_modalities: bool,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file name inside the output directory
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            artifacts: default_artifacts(),
            output: None,
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Simulation {
            horizon_months: default_horizon(),
            dt: default_dt(),
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Search {
            chemo_grid: default_chemo_grid(),
            radio_grid: default_radio_grid(),
            test_all_modalities: true,
            parallel: true,
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Settings {
    /// Search options equivalent to these settings
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            chemo_grid: self.search.chemo_grid.clone(),
            radio_grid: self
                .search
                .radio_grid
                .iter()
                .copied()
                .map(RadioSchedule::from)
                .collect(),
            test_all_modalities: self.search.test_all_modalities,
            parallel: self.search.parallel,
            horizon_months: self.simulation.horizon_months,
            dt: self.simulation.dt,
        }
    }

    /// Write the effective settings as `settings.json` in `folder`
    pub fn write(&self, folder: &Path) -> Result<()> {
        let serialized =
            serde_json::to_string_pretty(self).wrap_err("Failed to serialize settings")?;
        let outputfile = OutputFile::new(folder, "settings.json")?;
        std::io::Write::write_all(&mut outputfile.file_owned(), serialized.as_bytes())
            .wrap_err("Failed to write settings")?;
        Ok(())
    }
}

/// Read settings from an optional TOML file and `ONCODOSE_*` environment variables.
///
/// Nested keys use a double underscore, e.g. `ONCODOSE_LOG__LEVEL=debug`.
pub fn read_settings(path: Option<&Path>) -> Result<Settings> {
    let mut builder = eConfig::builder();
    if let Some(path) = path {
        builder = builder.add_source(
            config::File::from(path.to_path_buf()).format(config::FileFormat::Toml),
        );
    }
    let parsed = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .wrap_err("Failed to read settings")?;

    let settings: Settings = parsed
        .try_deserialize()
        .wrap_err("Failed to parse settings")?;
    Ok(settings)
}

// *********************************
// Default values for deserializing
// *********************************
fn default_true() -> bool {
    true
}

fn default_artifacts() -> PathBuf {
    PathBuf::from("models")
}

fn default_horizon() -> f64 {
    DEFAULT_HORIZON_MONTHS
}

fn default_dt() -> f64 {
    DEFAULT_DT
}

fn default_chemo_grid() -> Vec<f64> {
    DEFAULT_CHEMO_GRID.to_vec()
}

fn default_radio_grid() -> Vec<(f64, u32)> {
    DEFAULT_RADIO_GRID.to_vec()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_search_defaults() {
        assert_eq!(Settings::default().search_options(), SearchOptions::default());
    }

    #[test]
    fn reads_partial_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\nchemo_grid = [75.0, 100.0]\ntest_all_modalities = false\n\n[log]\nlevel = \"debug\""
        )
        .unwrap();
        let settings = read_settings(Some(file.path())).unwrap();
        assert_eq!(settings.search.chemo_grid, vec![75.0, 100.0]);
        assert!(!settings.search.test_all_modalities);
        assert_eq!(settings.search.radio_grid.len(), 4);
        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.simulation.dt, 0.01);
    }

    #[test]
    fn writes_settings_json() {
        let dir = tempfile::tempdir().unwrap();
        Settings::default().write(dir.path()).unwrap();
        let written = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        let parsed: Settings = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
