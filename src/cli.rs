//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build Rax/JSX pages into mini-program output
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Source directory path (relative to project root)
    #[arg(short, long)]
    pub src: Option<PathBuf>,

    /// Config file name (default: raxmini.toml)
    #[arg(short = 'C', long, default_value = "raxmini.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Walk every page's dependency graph and write mini-program output
    Build {
        /// Clean output directory completely before building
        #[arg(long)]
        clean: bool,

        /// Only build the given page (repeatable), relative to the source directory
        #[arg(short, long)]
        page: Vec<String>,
    },
}
