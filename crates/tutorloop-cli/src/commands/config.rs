//! Config command

use crate::app::{ConfigAction, ConfigArgs, OutputFormat};
use anyhow::{bail, Result};
use std::path::Path;
use tutorloop_core::Config;

pub fn run(
    args: ConfigArgs,
    config: &Config,
    config_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Cli => print!("{}", serde_yaml::to_string(config)?),
        },

        ConfigAction::Path => println!("{}", config_path.display()),

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            Config::default().save_to(config_path)?;
            println!("Wrote default config to {}", config_path.display());
        }
    }
    Ok(())
}
