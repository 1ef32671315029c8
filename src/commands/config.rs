//! Config command - view and initialize settings.

use crate::cli::ConfigArgs;
use crate::config::Settings;
use crate::error::ExitCode;
use crate::platform::AppPaths;
use anyhow::Result;
use console::style;

pub async fn run(args: ConfigArgs) -> Result<ExitCode> {
    let paths = AppPaths::new();

    if args.path {
        println!("{}", paths.settings.display());
        return Ok(ExitCode::Success);
    }

    if args.show {
        let settings = Settings::load_from_file(&paths.settings)?;
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(ExitCode::Success);
    }

    if args.init {
        if paths.settings.exists() {
            println!(
                "  {} Settings already exist at {}",
                style("!").yellow(),
                paths.settings.display()
            );
            return Ok(ExitCode::Success);
        }

        paths.ensure_dirs()?;
        Settings::default().save_to_file(&paths.settings)?;
        println!(
            "  {} Wrote default settings to {}",
            style("✓").green(),
            paths.settings.display()
        );
        return Ok(ExitCode::Success);
    }

    println!("{} Configuration", style("▶").cyan().bold());
    println!();
    println!("  Settings file: {}", style(paths.settings.display()).green());

    if !paths.settings.exists() {
        println!("  Status: {}", style("does not exist").yellow());
        println!();
        println!("  Defaults are in effect. Run with --init to write them to disk.");
    } else {
        // Parse now so a broken file is reported here rather than mid-install.
        Settings::load_from_file(&paths.settings)?;
        println!("  Status: {}", style("ok").green());
    }
    println!("  Java cache: {}", style(paths.java.display()).dim());
    println!();
    println!("  Run with --show to see resolved settings.");

    Ok(ExitCode::Success)
}
