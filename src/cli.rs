//! CLI argument parsing using clap derive macros.

use crate::backend::Backend;
use crate::version::Channel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// mcserver - install, discover and configure Minecraft servers
#[derive(Parser, Debug)]
#[command(name = "mcserver")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log progress details (same as RUST_LOG=info)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List installable versions of a backend
    Versions(VersionsArgs),

    /// Show where a backend version would be downloaded from
    Resolve(ResolveArgs),

    /// Install a server into a directory
    Install(InstallArgs),

    /// Find installed servers below a directory
    Scan(ScanArgs),

    /// Read or edit server.properties
    Props(PropsArgs),

    /// Java runtime cache
    Java(JavaArgs),

    /// Run a server's launch script
    Start(StartArgs),

    /// View or initialize settings
    Config(ConfigArgs),
}

// ============================================================================
// Versions command
// ============================================================================

#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Backend: paper, purpur, vanilla, fabric, forge, neoforge
    pub backend: Backend,

    /// Release channels to include (repeatable). Defaults to release.
    #[arg(long = "channel", short)]
    pub channels: Vec<Channel>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Resolve command
// ============================================================================

#[derive(Args, Debug)]
pub struct ResolveArgs {
    pub backend: Backend,

    #[arg(value_name = "VERSION")]
    pub server_version: String,
}

// ============================================================================
// Install command
// ============================================================================

#[derive(Args, Debug)]
pub struct InstallArgs {
    pub backend: Backend,

    /// Version as listed by `mcserver versions`
    #[arg(value_name = "VERSION")]
    pub server_version: String,

    /// Target directory (created if missing)
    pub dir: PathBuf,

    /// Confirm manual downloads without asking
    #[arg(long, short)]
    pub yes: bool,
}

// ============================================================================
// Scan command
// ============================================================================

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to search (defaults to scan_path from settings)
    pub dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Props command
// ============================================================================

#[derive(Args, Debug)]
pub struct PropsArgs {
    #[command(subcommand)]
    pub subcommand: PropsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PropsSubcommand {
    /// Print all properties, or one value
    Get(PropsGetArgs),

    /// Set one or more properties (key=value)
    Set(PropsSetArgs),
}

#[derive(Args, Debug)]
pub struct PropsGetArgs {
    /// Server directory
    pub dir: PathBuf,

    pub key: Option<String>,
}

#[derive(Args, Debug)]
pub struct PropsSetArgs {
    /// Server directory
    pub dir: PathBuf,

    /// Assignments like server-port=25566
    #[arg(required = true, value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

// ============================================================================
// Java command
// ============================================================================

#[derive(Args, Debug)]
pub struct JavaArgs {
    #[command(subcommand)]
    pub subcommand: JavaSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum JavaSubcommand {
    /// List cached runtimes and the configured system Java
    List,

    /// Download a runtime into the cache unless already present
    Ensure(JavaEnsureArgs),
}

#[derive(Args, Debug)]
pub struct JavaEnsureArgs {
    /// Java major version, e.g. 17
    #[arg(required_unless_present = "game_version", conflicts_with = "game_version")]
    pub major: Option<u32>,

    /// Pick the major version a game version needs, e.g. 1.20.1
    #[arg(long = "for")]
    pub game_version: Option<String>,
}

// ============================================================================
// Start command
// ============================================================================

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Server directory
    pub dir: PathBuf,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print resolved settings as JSON
    #[arg(long, conflicts_with_all = ["path", "init"])]
    pub show: bool,

    /// Print the settings file location
    #[arg(long, conflicts_with = "init")]
    pub path: bool,

    /// Write default settings if no settings file exists
    #[arg(long)]
    pub init: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("server-port = 25566"),
            Ok(("server-port".to_string(), "25566".to_string()))
        );
        assert_eq!(
            parse_assignment("motd=a=b"),
            Ok(("motd".to_string(), "a=b".to_string()))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_cli_parses_install() {
        let cli = Cli::try_parse_from(["mcserver", "install", "paper", "1.20.1", "/srv/mc", "--yes"]).unwrap();
        match cli.command {
            Command::Install(args) => {
                assert_eq!(args.backend, Backend::Paper);
                assert_eq!(args.server_version, "1.20.1");
                assert!(args.yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_resolve() {
        let cli = Cli::try_parse_from(["mcserver", "resolve", "neoforge", "21.1.65"]).unwrap();
        match cli.command {
            Command::Resolve(args) => {
                assert_eq!(args.backend, Backend::NeoForge);
                assert_eq!(args.server_version, "21.1.65");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_java_ensure_needs_major_or_for() {
        assert!(Cli::try_parse_from(["mcserver", "java", "ensure"]).is_err());
        assert!(Cli::try_parse_from(["mcserver", "java", "ensure", "17"]).is_ok());
        assert!(Cli::try_parse_from(["mcserver", "java", "ensure", "--for", "1.20.1"]).is_ok());
    }
}
