//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Rewrite command arguments.
#[derive(Debug, Default, Args)]
pub struct RewriteCommand {
    /// Directory to walk (defaults to `walk.root`, usually `libraries`)
    pub root: Option<PathBuf>,

    /// Project tag to prefix guard names with (defaults to `guard.tag`)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Only write headers whose guard actually changed
    #[arg(long)]
    pub changed_only: bool,

    /// Print the run report as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Directory to walk (defaults to `walk.root`, usually `libraries`)
    pub root: Option<PathBuf>,

    /// Project tag to check guard names against (defaults to `guard.tag`)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Print the run report as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Locate command arguments.
#[derive(Debug, Args)]
pub struct LocateCommand {
    /// File name to search for
    pub name: String,

    /// Directory to search (defaults to `walk.root`, usually `libraries`)
    pub root: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
