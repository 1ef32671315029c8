//! Install command - run the install pipeline with a progress bar.

use crate::cli::InstallArgs;
use crate::error::ExitCode;
use crate::http;
use crate::pipeline::{InstallPipeline, InstallRequest, ManualDownloadPrompt};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

const BAR_LENGTH: u64 = 1000;

pub async fn run(args: InstallArgs) -> Result<ExitCode> {
    let (paths, settings) = super::load_context()?;
    paths
        .ensure_dirs()
        .context("Failed to create the mcserver home directory")?;

    let client = http::client()?;
    let cache = Arc::new(super::java_cache(&paths, &settings, client.clone())?);

    println!(
        "{} Installing {} {}",
        style("▶").cyan().bold(),
        args.backend,
        args.server_version
    );
    println!("  Target: {}", style(args.dir.display()).green());
    println!();

    let bar = ProgressBar::new(BAR_LENGTH);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {msg}")?
            .progress_chars("#>-"),
    );

    let prompt = Arc::new(TerminalPrompt {
        bar: bar.clone(),
        assume_yes: args.yes,
    });

    let request = InstallRequest::new(args.backend, args.server_version, args.dir.clone());
    let mut handle = InstallPipeline::new(settings, client, cache)
        .with_prompt(prompt)
        .spawn(request);

    while let Some(update) = handle.progress.recv().await {
        bar.set_position((update.fraction * BAR_LENGTH as f32).round() as u64);
        bar.set_message(update.message);
    }

    match handle.task.await.context("Install task stopped unexpectedly")? {
        Ok(label) => {
            bar.finish_and_clear();
            println!("  {} Installed {}", style("✓").green(), style(label).bold());
            println!();
            println!(
                "  Start it with {}",
                style(format!("mcserver start {}", args.dir.display())).cyan()
            );
            Ok(ExitCode::Success)
        }
        Err(e) => {
            bar.abandon();
            Err(e.into())
        }
    }
}

/// Walks the user through a download that has to happen in the browser.
struct TerminalPrompt {
    bar: ProgressBar,
    assume_yes: bool,
}

impl ManualDownloadPrompt for TerminalPrompt {
    fn open_page(&self, url: &str) {
        if let Err(e) = open::that(url) {
            tracing::warn!("Could not open a browser: {}", e);
        }
    }

    fn confirm(&self, url: &str, dir: &Path) -> bool {
        self.bar.suspend(|| {
            println!();
            println!(
                "{} This download is protected and cannot be automated.",
                style("!").yellow().bold()
            );
            println!("  1. Download the installer from {}", style(url).cyan());
            println!("  2. Save the .jar file into {}", style(dir.display()).green());

            if self.assume_yes {
                return true;
            }

            print!("  3. Continue once the file is there? [Y/n] ");
            if io::stdout().flush().is_err() {
                return false;
            }

            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_err() {
                return false;
            }
            let input = input.trim().to_lowercase();
            input.is_empty() || input == "y" || input == "yes"
        })
    }
}
