//! Versions command - list installable versions of a backend.

use crate::catalog::list_versions;
use crate::cli::VersionsArgs;
use crate::error::ExitCode;
use crate::http;
use crate::version::{Channel, ChannelFilter};
use anyhow::Result;
use console::style;

pub async fn run(args: VersionsArgs) -> Result<ExitCode> {
    let (_, settings) = super::load_context()?;
    let client = http::client()?;

    let filters: ChannelFilter = if args.channels.is_empty() {
        [Channel::Release].into_iter().collect()
    } else {
        args.channels.iter().copied().collect()
    };

    let versions = list_versions(&client, &settings.endpoints, args.backend, &filters).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&versions)?);
        return Ok(ExitCode::Success);
    }

    println!("{} {} versions", style("▶").cyan().bold(), args.backend);
    println!();

    if versions.is_empty() {
        println!("  No versions found.");
        println!("  Upstream may be unreachable; run with --verbose for details.");
        return Ok(ExitCode::Success);
    }

    for version in &versions {
        if version.channel == Channel::Release {
            println!("  {}", style(&version.id).bold());
        } else {
            println!("  {} {}", version.id, style(format!("({})", version.channel)).dim());
        }
    }

    Ok(ExitCode::Success)
}
