//! Start command - run a server's launch script in the foreground.

use crate::cli::StartArgs;
use crate::descriptor::InstallationDescriptor;
use crate::error::ExitCode;
use crate::platform::{Os, Platform};
use anyhow::{Context, Result};
use console::style;
use std::process::Command;

pub async fn run(args: StartArgs) -> Result<ExitCode> {
    let platform = Platform::detect()?;
    let script = args.dir.join(platform.os.launch_script());

    if !script.is_file() {
        eprintln!(
            "{} No {} in {}",
            style("error:").red().bold(),
            platform.os.launch_script(),
            args.dir.display()
        );
        return Ok(ExitCode::GeneralError);
    }

    match InstallationDescriptor::read(&args.dir) {
        Ok(Some(descriptor)) => println!(
            "{} Starting {} {}",
            style("▶").cyan().bold(),
            descriptor.core_type,
            descriptor.version
        ),
        Ok(None) => tracing::warn!("{} has no installation descriptor", args.dir.display()),
        Err(e) => tracing::warn!("Unreadable installation descriptor: {}", e),
    }

    let mut cmd = match platform.os {
        Os::Windows => {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&script);
            cmd
        }
        _ => {
            let mut cmd = Command::new("sh");
            cmd.arg(&script);
            cmd
        }
    };

    let status = cmd
        .current_dir(&args.dir)
        .status()
        .with_context(|| format!("Failed to run {}", script.display()))?;

    if status.success() {
        Ok(ExitCode::Success)
    } else {
        let code = status.code().unwrap_or(1);
        // Pass through the server's exit code
        std::process::exit(ExitCode::passthrough(code));
    }
}
