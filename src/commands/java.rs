//! Java command - inspect and fill the runtime cache.

use crate::cli::{JavaArgs, JavaEnsureArgs, JavaSubcommand};
use crate::download::Silent;
use crate::error::ExitCode;
use crate::http;
use crate::jre::probe_version;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub async fn run(args: JavaArgs) -> Result<ExitCode> {
    match args.subcommand {
        JavaSubcommand::List => run_list(),
        JavaSubcommand::Ensure(args) => run_ensure(args).await,
    }
}

/// List cached runtimes and the configured system Java.
fn run_list() -> Result<ExitCode> {
    let (paths, settings) = super::load_context()?;
    let cache = super::java_cache(&paths, &settings, http::client()?)?;
    let runtimes = cache.list_cached().context("Failed to read the Java cache")?;

    println!("{} Java runtimes", style("▶").cyan().bold());
    println!();

    if runtimes.is_empty() {
        println!("  No cached runtimes.");
        println!();
        println!("  Run {} to download one.", style("mcserver java ensure <major>").cyan());
    }

    for runtime in &runtimes {
        println!("  {} Java {}", style("✓").green(), style(runtime.major).bold());
        println!("      {}", style(runtime.java_executable.display()).dim());
    }

    println!();
    let system = Path::new(&settings.java_executable_path);
    match probe_version(system) {
        Some((version, major)) => println!(
            "  System Java: {} ({}, Java {})",
            settings.java_executable_path,
            style(version).green(),
            major
        ),
        None => println!(
            "  System Java: {} {}",
            settings.java_executable_path,
            style("(not runnable)").yellow()
        ),
    }
    println!(
        "  Automatic Java downloads: {}",
        if settings.auto_download_java {
            style("on").green()
        } else {
            style("off").dim()
        }
    );
    println!("  Cache: {}", style(cache.root().display()).dim());
    println!("  Platform: {}", style(cache.platform().key()).cyan());

    Ok(ExitCode::Success)
}

/// Download a runtime unless it is already cached.
async fn run_ensure(args: JavaEnsureArgs) -> Result<ExitCode> {
    let (paths, settings) = super::load_context()?;
    paths
        .ensure_dirs()
        .context("Failed to create the mcserver home directory")?;

    let major = match (&args.major, &args.game_version) {
        (Some(major), _) => *major,
        (None, Some(game_version)) => settings.java.required_major(game_version),
        (None, None) => anyhow::bail!("Give a Java major version or --for <game-version>"),
    };

    let cache = super::java_cache(&paths, &settings, http::client()?)?;

    println!("{} Java {}", style("▶").cyan().bold(), major);

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message(format!("Preparing Java {}...", major));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    let result = cache.ensure(major, &Silent).await;
    spinner.finish_and_clear();

    let java = result?;
    println!("  {} {}", style("✓").green(), java.display());

    Ok(ExitCode::Success)
}
