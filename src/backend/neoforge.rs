//! NeoForge: versions come from the Maven `maven-metadata.xml`; the
//! installer jar sits at a predictable Maven path.

use crate::config::Endpoints;
use crate::error::InstallError;
use crate::http::get_xml;
use crate::resolver::Resolution;
use crate::version::{sort_newest_first, Channel, VersionId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    versioning: Versioning,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    versions: VersionList,
}

#[derive(Debug, Deserialize)]
struct VersionList {
    #[serde(default)]
    version: Vec<String>,
}

fn artifact_url(endpoints: &Endpoints) -> String {
    format!(
        "{}/net/neoforged/neoforge",
        endpoints.neoforge_maven.trim_end_matches('/')
    )
}

async fn fetch_versions(
    client: &reqwest::Client,
    endpoints: &Endpoints,
) -> Result<Vec<String>, InstallError> {
    let url = format!("{}/maven-metadata.xml", artifact_url(endpoints));
    let metadata: MavenMetadata = get_xml(client, &url).await?;
    Ok(metadata.versioning.versions.version)
}

/// NeoForge versions encode the game version: `21.1.65` targets `1.21.1`,
/// `21.0.10-beta` targets `1.21`.
pub(super) fn game_version(version: &str) -> String {
    let base = version.split('-').next().unwrap_or(version);
    let mut parts = base.split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some("0")) => format!("1.{}", major),
        (Some(major), Some(minor)) => format!("1.{}.{}", major, minor),
        _ => base.to_string(),
    }
}

pub(super) async fn list(
    client: &reqwest::Client,
    endpoints: &Endpoints,
) -> Result<Vec<VersionId>, InstallError> {
    let mut versions = fetch_versions(client, endpoints).await?;
    sort_newest_first(&mut versions);

    Ok(versions
        .into_iter()
        .map(|v| {
            let channel = Channel::guess(&v);
            VersionId::new(v, channel)
        })
        .collect())
}

pub(super) async fn resolve(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    version: &str,
) -> Result<Resolution, InstallError> {
    let versions = fetch_versions(client, endpoints).await?;
    if !versions.iter().any(|v| v == version) {
        return Ok(Resolution::NotFound);
    }

    Ok(Resolution::Direct(format!(
        "{}/{v}/neoforge-{v}-installer.jar",
        artifact_url(endpoints),
        v = version
    )))
}
