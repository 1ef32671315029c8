mod backend;
mod catalog;
mod cli;
mod commands;
mod config;
mod descriptor;
mod download;
mod error;
mod http;
mod jre;
mod pipeline;
mod platform;
mod properties;
mod registry;
mod resolver;
mod scripts;
mod version;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::error::{ExitCode, InstallError, PipelineError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let exit_code = run(cli).await;
    std::process::exit(exit_code.into());
}

async fn run(cli: Cli) -> ExitCode {
    // Handle --no-color globally
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let result = match cli.command {
        Command::Versions(args) => commands::versions::run(args).await,
        Command::Resolve(args) => commands::resolve::run(args).await,
        Command::Install(args) => commands::install::run(args).await,
        Command::Scan(args) => commands::scan::run(args).await,
        Command::Props(args) => commands::props::run(args).await,
        Command::Java(args) => commands::java::run(args).await,
        Command::Start(args) => commands::start::run(args).await,
        Command::Config(args) => commands::config::run(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_code_for(&e)
        }
    }
}

/// Exit code for an error that ended a command.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<PipelineError>() {
            return e.kind().exit_code();
        }
        if let Some(e) = cause.downcast_ref::<InstallError>() {
            return e.exit_code();
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return ExitCode::ConfigError;
        }
    }
    ExitCode::GeneralError
}
