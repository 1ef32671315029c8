//! Props command - read and edit server.properties.

use crate::cli::{PropsArgs, PropsGetArgs, PropsSetArgs, PropsSubcommand};
use crate::error::ExitCode;
use crate::properties::{self, Properties};
use anyhow::{Context, Result};
use console::style;

pub async fn run(args: PropsArgs) -> Result<ExitCode> {
    match args.subcommand {
        PropsSubcommand::Get(args) => run_get(args),
        PropsSubcommand::Set(args) => run_set(args),
    }
}

fn run_get(args: PropsGetArgs) -> Result<ExitCode> {
    let Some(props) = properties::read(&args.dir)
        .with_context(|| format!("Failed to read {}", properties::path_in(&args.dir).display()))?
    else {
        eprintln!(
            "{} No {} in {}",
            style("error:").red().bold(),
            properties::FILE_NAME,
            args.dir.display()
        );
        return Ok(ExitCode::GeneralError);
    };

    match args.key {
        Some(key) => match props.get(&key) {
            Some(value) => {
                println!("{}", value);
                Ok(ExitCode::Success)
            }
            None => {
                eprintln!("{} {} is not set", style("error:").red().bold(), key);
                Ok(ExitCode::GeneralError)
            }
        },
        None => {
            for (key, value) in &props {
                println!("{}={}", key, value);
            }
            Ok(ExitCode::Success)
        }
    }
}

fn run_set(args: PropsSetArgs) -> Result<ExitCode> {
    if !args.dir.is_dir() {
        eprintln!(
            "{} {} is not a directory",
            style("error:").red().bold(),
            args.dir.display()
        );
        return Ok(ExitCode::ConfigError);
    }

    let updates: Properties = args.assignments.into_iter().collect();
    properties::write(&args.dir, &updates)
        .with_context(|| format!("Failed to write {}", properties::path_in(&args.dir).display()))?;

    for (key, value) in &updates {
        println!("  {} {}={}", style("✓").green(), key, value);
    }

    Ok(ExitCode::Success)
}
