//! Script runs

use std::path::Path;

use anyhow::bail;
use colony_kernel::{bootstrap_meta_colony, Collaborators, ColonyConfig, ColonySummary};
use serde::Serialize;
use tracing::info;

use crate::output::{self, print_error, print_success, OutputFormat};
use crate::script::{script_config, Script, ScriptReport, ScriptRunner};

#[derive(Serialize)]
struct RunOutput<'a> {
    report: &'a ScriptReport,
    mismatches: usize,
    summary: ColonySummary,
}

pub fn execute(
    config_path: Option<&Path>,
    script_path: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let script = Script::load(script_path)?;
    let loaded = ColonyConfig::load(config_path)?;
    let config = script_config(&script, &loaded);

    let (colony, _) = bootstrap_meta_colony(&config, Collaborators::in_memory())?;
    let mut runner = ScriptRunner::new(colony);
    let report = runner.run(&script.steps);
    let mismatches = report.mismatches();

    info!(
        script = %script_path.display(),
        steps = report.steps.len(),
        mismatches = mismatches,
        "Script finished"
    );

    match format {
        OutputFormat::Json => output::print_json(&RunOutput {
            report: &report,
            mismatches,
            summary: runner.colony().summary(),
        })?,
        OutputFormat::Table => {
            output::print_script_report(&report);
            println!();
            output::print_summary(&runner.colony().summary());
            if mismatches == 0 {
                print_success(&format!("{} steps matched", report.steps.len()));
            } else {
                print_error(&format!(
                    "{mismatches} of {} steps did not match",
                    report.steps.len()
                ));
            }
        }
    }

    if mismatches > 0 {
        bail!("{mismatches} step(s) did not match their expectation");
    }
    Ok(())
}
