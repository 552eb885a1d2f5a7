//! Configuration commands

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Subcommand;
use colony_kernel::ColonyConfig;

use crate::output::{print_info, print_success};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

fn resolve(config_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(ColonyConfig::default_config_path()?),
    }
}

pub fn execute(command: ConfigCommands, config_path: Option<&Path>) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = ColonyConfig::load(config_path)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = resolve(config_path)?;
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(&path, ColonyConfig::default().to_toml_string()?)
                .with_context(|| format!("writing {}", path.display()))?;
            print_success(&format!("Wrote {}", path.display()));
            Ok(())
        }
        ConfigCommands::Path => {
            let path = resolve(config_path)?;
            if path.exists() {
                println!("{}", path.display());
            } else {
                print_info(&format!("{} (not created yet)", path.display()));
            }
            Ok(())
        }
    }
}
