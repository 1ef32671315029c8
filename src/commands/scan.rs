//! Scan command - find installed servers.

use crate::cli::ScanArgs;
use crate::error::ExitCode;
use crate::registry;
use anyhow::Result;
use console::style;
use std::path::PathBuf;

pub async fn run(args: ScanArgs) -> Result<ExitCode> {
    let (_, settings) = super::load_context()?;
    let root = args.dir.unwrap_or_else(|| PathBuf::from(&settings.scan_path));

    let servers = registry::scan(&root, settings.scan_depth);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&servers)?);
        return Ok(ExitCode::Success);
    }

    println!("{} Servers under {}", style("▶").cyan().bold(), root.display());
    println!();

    if servers.is_empty() {
        println!("  No servers found.");
        return Ok(ExitCode::Success);
    }

    for server in &servers {
        println!(
            "  {} {} {}",
            style("●").green(),
            style(format!("{} {}", server.descriptor.core_type, server.descriptor.version)).bold(),
            style(&server.descriptor.jar_name).dim()
        );
        println!("      {}", style(server.path.display()).dim());
    }

    Ok(ExitCode::Success)
}
