use csv::WriterBuilder;
use eyre::{Result, WrapErr};
use serde::Serialize;
use std::fs::{create_dir_all, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::optimizer::types::{Evaluation, OptimizationResult};
use crate::routines::settings::Settings;

pub const REGIMENS_FILE: &str = "regimens.csv";
pub const RESULT_FILE: &str = "result.json";

pub struct OutputFile {
    file: File,
    relative_path: PathBuf,
}

impl OutputFile {
    /// Create (or truncate) `file_name` inside `folder`, creating the folder if needed
    pub fn new(folder: impl AsRef<Path>, file_name: &str) -> Result<Self> {
        let relative_path = folder.as_ref().join(file_name);

        if let Some(parent) = relative_path.parent() {
            create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create directories for {:?}", parent))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&relative_path)
            .wrap_err_with(|| format!("Failed to open file: {:?}", relative_path))?;

        Ok(OutputFile {
            file,
            relative_path,
        })
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn file_owned(self) -> File {
        self.file
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }
}

/// One row of `regimens.csv`
#[derive(Debug, Serialize)]
struct RegimenRow {
    treatment_type: &'static str,
    chemo_dose_mg_per_m2: f64,
    radio_total_gy: f64,
    radio_fractions: u32,
    radio_fraction_dose_gy: f64,
    bed: f64,
    r: f64,
    k: f64,
    alpha: f64,
    beta: f64,
    predicted_volume: f64,
    global_best: bool,
}

impl RegimenRow {
    fn new(evaluation: &Evaluation, global_best: bool) -> Self {
        let regimen = &evaluation.regimen;
        RegimenRow {
            treatment_type: regimen.treatment_type.as_str(),
            chemo_dose_mg_per_m2: regimen.chemo_dose_mg_per_m2,
            radio_total_gy: regimen.radio_total_gy,
            radio_fractions: regimen.radio_fractions,
            radio_fraction_dose_gy: evaluation.radio_fraction_dose_gy,
            bed: evaluation.bed,
            r: evaluation.params.r,
            k: evaluation.params.k,
            alpha: evaluation.params.alpha,
            beta: evaluation.params.beta,
            predicted_volume: evaluation.predicted_volume,
            global_best,
        }
    }
}

/// Write every evaluated regimen, in evaluation order, to `regimens.csv`
pub fn write_regimens(result: &OptimizationResult, folder: &Path) -> Result<PathBuf> {
    let outputfile = OutputFile::new(folder, REGIMENS_FILE)?;
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_writer(outputfile.file());

    for evaluation in &result.evaluations {
        let is_best = result.global_best.as_ref() == Some(evaluation);
        writer
            .serialize(RegimenRow::new(evaluation, is_best))
            .wrap_err("Failed to write regimen row")?;
    }
    writer.flush().wrap_err("Failed to flush regimens.csv")?;
    Ok(outputfile.relative_path().to_path_buf())
}

/// Write the full [OptimizationResult] as pretty-printed JSON to `result.json`
pub fn write_result(result: &OptimizationResult, folder: &Path) -> Result<PathBuf> {
    let outputfile = OutputFile::new(folder, RESULT_FILE)?;
    serde_json::to_writer_pretty(outputfile.file(), result)
        .wrap_err("Failed to write result.json")?;
    Ok(outputfile.relative_path().to_path_buf())
}

/// Write every output of a run: regimens, result and the settings used
pub fn write_outputs(
    result: &OptimizationResult,
    settings: &Settings,
    folder: &Path,
) -> Result<()> {
    let regimens = write_regimens(result, folder)?;
    let json = write_result(result, folder)?;
    settings.write(folder)?;
    tracing::info!("Results written to {:?} and {:?}", regimens, json);
    Ok(())
}
