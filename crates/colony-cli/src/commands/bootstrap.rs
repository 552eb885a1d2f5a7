//! Meta colony bootstrap

use std::path::Path;

use colony_kernel::{bootstrap_meta_colony, Collaborators, ColonyConfig};
use serde::Serialize;

use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct BootstrapOutput<'a> {
    report: &'a colony_kernel::BootstrapReport,
    summary: colony_kernel::ColonySummary,
}

pub fn execute(config_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let config = ColonyConfig::load(config_path)?;
    let (colony, report) = bootstrap_meta_colony(&config, Collaborators::in_memory())?;

    match format {
        OutputFormat::Json => output::print_json(&BootstrapOutput {
            report: &report,
            summary: colony.summary(),
        }),
        OutputFormat::Table => {
            output::print_bootstrap(&report);
            println!();
            output::print_summary(&colony.summary());
            Ok(())
        }
    }
}
