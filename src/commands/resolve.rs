//! Resolve command - show where a version would be downloaded from.

use crate::cli::ResolveArgs;
use crate::error::ExitCode;
use crate::http;
use crate::resolver::{resolve_download, Resolution};
use anyhow::Result;
use console::style;

pub async fn run(args: ResolveArgs) -> Result<ExitCode> {
    let (_, settings) = super::load_context()?;
    let client = http::client()?;

    match resolve_download(&client, &settings, args.backend, &args.server_version).await {
        Resolution::Direct(url) => {
            println!("{}", url);
            Ok(ExitCode::Success)
        }
        Resolution::ManualWebpage(page) => {
            println!("{} {} {} must be downloaded by hand:", style("!").yellow(), args.backend, args.server_version);
            println!("  {}", page);
            Ok(ExitCode::Success)
        }
        Resolution::NotFound => {
            eprintln!(
                "{} No download found for {} {}",
                style("error:").red().bold(),
                args.backend,
                args.server_version
            );
            Ok(ExitCode::InstallError)
        }
    }
}
