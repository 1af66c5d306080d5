use clap::Parser;
use eyre::{bail, Result, WrapErr};
use std::fs;

use oncodose::cli::Cli;
use oncodose::prelude::*;
use oncodose::routines::logger::setup_log;
use oncodose::routines::output::write_outputs;
use oncodose::routines::settings::read_settings;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = read_settings(cli.settings.as_deref())?;
    cli.apply(&mut settings);
    setup_log(&settings)?;

    let contents = fs::read_to_string(&cli.patient)
        .wrap_err_with(|| format!("Failed to read patient file {:?}", cli.patient))?;
    let patient: PatientRecord =
        serde_json::from_str(&contents).wrap_err("Failed to parse patient record")?;

    let issues = patient.validate();
    if !issues.is_empty() {
        for issue in &issues {
            tracing::error!("Invalid patient record: {}", issue);
        }
        bail!("Patient record failed validation with {} issue(s)", issues.len());
    }

    let ctx = ModelContext::load(&settings.paths.artifacts)?;
    let plan = (!cli.no_plan).then(|| ClinicianPlan::from_patient(&patient));
    let result = optimize(&ctx, &patient, plan.as_ref(), &settings.search_options())?;

    if let Some(folder) = &settings.paths.output {
        write_outputs(&result, &settings, folder)?;
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
