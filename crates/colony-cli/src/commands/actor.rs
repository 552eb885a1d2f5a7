//! Deterministic actor lookup

use colony_kernel::seeded_actor;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct ActorRow {
    label: String,
    actor: String,
    verifying_key: String,
}

fn rows(labels: &[String]) -> Vec<ActorRow> {
    labels
        .iter()
        .map(|label| {
            let (key, actor) = seeded_actor(label);
            ActorRow {
                label: label.clone(),
                actor: actor.to_string(),
                verifying_key: hex::encode(key.verifying_key().to_bytes()),
            }
        })
        .collect()
}

pub fn execute(labels: &[String], format: OutputFormat) -> anyhow::Result<()> {
    let rows = rows(labels);
    match format {
        OutputFormat::Json => output::print_json(&rows),
        OutputFormat::Table => {
            println!("{}", Table::new(rows));
            Ok(())
        }
    }
}
