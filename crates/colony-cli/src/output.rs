//! Output formatting

use colony_kernel::{BootstrapReport, ColonySummary, PotOwner};
use colony_types::Role;
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::script::{format_amount, Outcome, ScriptReport};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// JSON
    Json,
}

pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

#[derive(Debug, Tabled)]
struct PotRow {
    pot: String,
    owner: String,
    balance: String,
}

#[derive(Debug, Tabled)]
struct RoleRow {
    actor: String,
    domain: String,
    roles: String,
}

#[derive(Debug, Tabled)]
struct StepRow {
    step: usize,
    op: String,
    status: String,
    detail: String,
}

fn owner_label(owner: PotOwner) -> String {
    match owner {
        PotOwner::Rewards => "rewards".to_string(),
        PotOwner::Domain(domain) => domain.to_string(),
        PotOwner::Task(task) => task.to_string(),
    }
}

/// Pots and effective roles of a colony.
pub fn print_summary(summary: &ColonySummary) {
    println!(
        "{} {} ({} domains, {} tasks, reward inverse {})",
        "Colony".bold(),
        summary.name,
        summary.domains.len(),
        summary.tasks.len(),
        summary.reward_inverse
    );

    let pots: Vec<PotRow> = summary
        .pots
        .iter()
        .map(|pot| PotRow {
            pot: pot.id.to_string(),
            owner: owner_label(pot.owner),
            balance: format!("{} {}", format_amount(pot.balance(&summary.token)), summary.token),
        })
        .collect();
    println!("{}", Table::new(pots));

    let roles: Vec<RoleRow> = summary
        .effective_roles
        .iter()
        .map(|entry| RoleRow {
            actor: entry.actor.short_id(),
            domain: entry.domain.to_string(),
            roles: entry
                .roles
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    if roles.is_empty() {
        println!("{}", "No roles".dimmed());
    } else {
        println!("{}", Table::new(roles));
    }
}

pub fn print_bootstrap(report: &BootstrapReport) {
    print_success(&format!("Bootstrapped colony {}", report.colony));
    println!("  Founder:        {}", report.founder);
    println!(
        "  Minted:         {} {}",
        format_amount(report.minted),
        report.token
    );
    println!(
        "  Funded:         {} {}",
        format_amount(report.funded),
        report.token
    );
    println!("  Root pot:       {}", format_amount(report.root_balance));
    println!("  Rewards pot:    {}", format_amount(report.rewards_balance));
    println!("  Reputation:     cycle {}", report.reputation_cycle);
}

pub fn print_script_report(report: &ScriptReport) {
    let rows: Vec<StepRow> = report
        .steps
        .iter()
        .map(|step| {
            let (status, detail) = match &step.outcome {
                Outcome::Ok { detail } => ("ok".to_string(), detail.clone()),
                Outcome::Failed { reason, message } => (reason.clone(), message.clone()),
            };
            let status = if step.matched {
                status.green().to_string()
            } else {
                let expected = step.expected.as_deref().unwrap_or("ok");
                format!("{} (expected {expected})", status.red())
            };
            StepRow {
                step: step.index,
                op: step.op.to_string(),
                status,
                detail,
            }
        })
        .collect();

    if rows.is_empty() {
        println!("{}", "No steps".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
}
