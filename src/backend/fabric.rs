//! Fabric: the server launcher URL is composed from the game version, the
//! newest stable loader for it, and the newest stable installer.

use crate::config::Endpoints;
use crate::error::InstallError;
use crate::http::get_json;
use crate::resolver::Resolution;
use crate::version::{Channel, VersionId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Component {
    version: String,
    #[serde(default)]
    stable: bool,
}

#[derive(Debug, Deserialize)]
struct LoaderEntry {
    loader: Option<Component>,
}

fn meta_url(endpoints: &Endpoints) -> String {
    format!("{}/v2/versions", endpoints.fabric_meta.trim_end_matches('/'))
}

pub(super) async fn list(
    client: &reqwest::Client,
    endpoints: &Endpoints,
) -> Result<Vec<VersionId>, InstallError> {
    let games: Vec<Component> = get_json(client, &format!("{}/game", meta_url(endpoints))).await?;

    Ok(games
        .into_iter()
        .map(|g| {
            let channel = if g.stable {
                Channel::Release
            } else {
                Channel::Snapshot
            };
            VersionId::new(g.version, channel)
        })
        .collect())
}

pub(super) async fn resolve(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    version: &str,
) -> Result<Resolution, InstallError> {
    let base = meta_url(endpoints);

    let loaders: Vec<LoaderEntry> = get_json(client, &format!("{}/loader/{}", base, version)).await?;
    let Some(loader) = loaders
        .into_iter()
        .filter_map(|entry| entry.loader)
        .find(|loader| loader.stable)
    else {
        tracing::warn!("No stable Fabric loader for {}", version);
        return Ok(Resolution::NotFound);
    };

    let installers: Vec<Component> = get_json(client, &format!("{}/installer", base)).await?;
    let Some(installer) = installers.into_iter().find(|i| i.stable) else {
        tracing::warn!("No stable Fabric installer published");
        return Ok(Resolution::NotFound);
    };

    Ok(Resolution::Direct(format!(
        "{}/loader/{}/{}/{}/server/jar",
        base, version, loader.version, installer.version
    )))
}
