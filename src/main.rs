//! raxmini - Build Rax/JSX applications into mini-program output.

mod build;
mod cli;
mod compiler;
mod config;
mod logger;
mod utils;

use anyhow::Result;
use build::build_project;
use clap::Parser;
use cli::{Cli, Commands};
use config::ProjectConfig;
use std::path::Path;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Build { .. } => build_project(&config),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<ProjectConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        ProjectConfig::from_path(&config_path)?
    } else {
        ProjectConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}
