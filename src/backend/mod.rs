//! Server backends: the upstream distributions a server can be installed from.
//!
//! `Backend` is a closed set. Everything the catalog, the resolver and the
//! install pipeline need to know about a distribution is answered here, so
//! adding a backend means adding a variant and its module, never touching
//! the orchestrator.

mod fabric;
mod forge;
mod neoforge;
mod paper;
mod purpur;
mod vanilla;

use crate::config::Endpoints;
use crate::error::InstallError;
use crate::resolver::Resolution;
use crate::version::VersionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Artifact name recorded in the descriptor for installer-produced servers.
pub const INSTALLER_ARTIFACT_NAME: &str = "N/A (Installer Core)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    #[serde(alias = "paper")]
    Paper,
    #[serde(alias = "purpur")]
    Purpur,
    #[serde(alias = "vanilla")]
    Vanilla,
    #[serde(alias = "fabric")]
    Fabric,
    #[serde(alias = "forge")]
    Forge,
    #[serde(alias = "neoforge")]
    NeoForge,
}

impl Backend {
    pub const ALL: [Backend; 6] = [
        Backend::Paper,
        Backend::Purpur,
        Backend::Vanilla,
        Backend::Fabric,
        Backend::Forge,
        Backend::NeoForge,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Backend::Paper => "Paper",
            Backend::Purpur => "Purpur",
            Backend::Vanilla => "Vanilla",
            Backend::Fabric => "Fabric",
            Backend::Forge => "Forge",
            Backend::NeoForge => "NeoForge",
        }
    }

    /// Whether the distributed artifact is a self-installer that has to be
    /// run to produce the server files.
    pub fn requires_installer_execution(&self) -> bool {
        matches!(self, Backend::Forge | Backend::NeoForge)
    }

    /// Extension of the downloaded artifact.
    pub fn artifact_extension(&self) -> &'static str {
        "jar"
    }

    /// Fixed file name an auto-downloaded artifact is saved under.
    pub fn download_file_name(&self) -> String {
        let stem = if self.requires_installer_execution() {
            "installer"
        } else {
            "server"
        };
        format!("{}.{}", stem, self.artifact_extension())
    }

    /// Game version a backend version targets, used to pick a Java runtime.
    pub fn game_version(&self, version: &str) -> String {
        match self {
            Backend::NeoForge => neoforge::game_version(version),
            _ => version.split('-').next().unwrap_or(version).to_string(),
        }
    }

    /// Browser page a human downloads the artifact from.
    pub fn manual_page(&self, endpoints: &Endpoints, version: &str) -> String {
        match self {
            Backend::Paper => "https://papermc.io/downloads/paper".to_string(),
            Backend::Purpur => "https://purpurmc.org/downloads".to_string(),
            Backend::Vanilla => "https://www.minecraft.net/en-us/download/server".to_string(),
            Backend::Fabric => "https://fabricmc.net/use/server/".to_string(),
            Backend::Forge => forge::index_page(endpoints, version),
            Backend::NeoForge => "https://neoforged.net/".to_string(),
        }
    }

    /// Every version the backend publishes, newest first, classified.
    pub(crate) async fn fetch_versions(
        &self,
        client: &reqwest::Client,
        endpoints: &Endpoints,
    ) -> Result<Vec<VersionId>, InstallError> {
        match self {
            Backend::Paper => paper::list(client, endpoints).await,
            Backend::Purpur => purpur::list(client, endpoints).await,
            Backend::Vanilla => vanilla::list(client, endpoints).await,
            Backend::Fabric => fabric::list(client, endpoints).await,
            Backend::Forge => forge::list(client, endpoints).await,
            Backend::NeoForge => neoforge::list(client, endpoints).await,
        }
    }

    /// Resolve a direct download for `version`.
    pub(crate) async fn fetch_download(
        &self,
        client: &reqwest::Client,
        endpoints: &Endpoints,
        version: &str,
    ) -> Result<Resolution, InstallError> {
        match self {
            Backend::Paper => paper::resolve(client, endpoints, version).await,
            Backend::Purpur => purpur::resolve(client, endpoints, version).await,
            Backend::Vanilla => vanilla::resolve(client, endpoints, version).await,
            Backend::Fabric => fabric::resolve(client, endpoints, version).await,
            Backend::Forge => forge::resolve(client, endpoints, version).await,
            Backend::NeoForge => neoforge::resolve(client, endpoints, version).await,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .iter()
            .copied()
            .find(|b| b.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Backend::ALL.iter().map(|b| b.label()).collect();
                format!("unknown backend '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}
