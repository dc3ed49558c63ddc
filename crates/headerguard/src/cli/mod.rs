//! Command-line interface for headerguard.
//!
//! This module provides the CLI structure for the `hguard` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{CheckCommand, ConfigCommand, LocateCommand, RewriteCommand};

/// hguard - Prefix C/C++ include guards with a project tag
///
/// Walks a header tree and rewrites the first `#ifndef`/`#define` pair of
/// every `.h` and `.hpp` file to `<TAG>_NAME`. Without a subcommand it
/// rewrites the configured root (default `libraries`) in place.
#[derive(Debug, Parser)]
#[command(name = "hguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute (defaults to `rewrite`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rewrite include guards in place
    Rewrite(RewriteCommand),

    /// Report headers whose guard would be rewritten, without writing
    Check(CheckCommand),

    /// Print the folder that contains a given file
    Locate(LocateCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }

    /// The command to run, with a bare invocation meaning `rewrite`.
    #[must_use]
    pub fn command_or_default(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Rewrite(RewriteCommand::default()))
    }
}
