//! `hguard` - CLI for headerguard
//!
//! Rewrites the include guards of a header tree so that every guard macro
//! carries the project tag.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use headerguard::cli::{CheckCommand, Cli, Command, ConfigCommand, LocateCommand, RewriteCommand};
use headerguard::{init_logging, walker, Config, GuardRewriter, HeaderRewriter, RunReport, WriteMode};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config_file = cli.config.clone();
    let succeeded = match cli.command_or_default() {
        Command::Rewrite(cmd) => handle_rewrite(&load_config(config_file)?, &cmd)?,
        Command::Check(cmd) => handle_check(&load_config(config_file)?, &cmd)?,
        Command::Locate(cmd) => handle_locate(&load_config(config_file)?, &cmd)?,
        Command::Config(cmd) => handle_config(config_file, cmd)?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_config(config_file: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(config_file).context("loading configuration")
}

fn resolve_root(config: &Config, root: Option<&Path>) -> PathBuf {
    root.map_or_else(|| config.walk.root.clone(), Path::to_path_buf)
}

fn guard_rewriter(config: &Config, tag: Option<&str>) -> anyhow::Result<GuardRewriter> {
    let tag = tag.unwrap_or(config.guard.tag.as_str());
    Ok(GuardRewriter::new(tag)?)
}

fn handle_rewrite(config: &Config, cmd: &RewriteCommand) -> anyhow::Result<bool> {
    let root = resolve_root(config, cmd.root.as_deref());
    let mode = if cmd.changed_only {
        WriteMode::Changed
    } else {
        config.write_mode()
    };
    let rewriter = HeaderRewriter::new(guard_rewriter(config, cmd.tag.as_deref())?, mode);

    let report = rewriter
        .run(&root)
        .with_context(|| format!("rewriting include guards under {}", root.display()))?;

    if cmd.json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report, "Rewrote");
    }
    Ok(true)
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<bool> {
    let root = resolve_root(config, cmd.root.as_deref());
    let rewriter = HeaderRewriter::new(guard_rewriter(config, cmd.tag.as_deref())?, WriteMode::Check);

    let report = rewriter
        .run(&root)
        .with_context(|| format!("checking include guards under {}", root.display()))?;

    if cmd.json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report, "Would rewrite");
    }

    Ok(report.headers_changed == 0)
}

fn handle_locate(config: &Config, cmd: &LocateCommand) -> anyhow::Result<bool> {
    let root = resolve_root(config, cmd.root.as_deref());
    match walker::find_containing_dir(&root, &cmd.name)
        .with_context(|| format!("searching {} for {}", root.display(), cmd.name))?
    {
        Some(folder) => {
            println!("{folder}");
            Ok(true)
        }
        None => {
            eprintln!("{} not found under {}", cmd.name, root.display());
            Ok(false)
        }
    }
}

fn print_report(report: &RunReport, verb: &str) {
    for file in report.changed_files() {
        println!("{verb} {}", display_relative(&file.path, &report.root));
        for change in &file.changes {
            println!("    {change}");
        }
    }
    println!();
    println!(
        "{} headers scanned, {} with guards to tag, {} written (tag: {})",
        report.headers_scanned, report.headers_changed, report.headers_written, report.tag
    );
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// `config` subcommands load the configuration themselves; `path` and
/// `validate` must keep working when the configuration is broken.
fn handle_config(config_file: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<bool> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_file)?;
            if json {
                println!("{}", config.to_json()?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Guard]");
                println!("  Tag:                {}", config.guard.tag);
                println!();
                println!("[Walk]");
                println!("  Root:               {}", config.walk.root.display());
                println!();
                println!("[Rewrite]");
                println!("  Always write:       {}", config.rewrite.always_write);
            }
        }
        ConfigCommand::Path => {
            let path = config_file.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_file)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}
