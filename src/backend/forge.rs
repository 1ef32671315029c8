//! Forge: `maven-metadata.json` maps each game version to its Forge builds,
//! oldest build first. Downloads normally sit behind an ad wall, so the
//! resolver sends users to the index page unless configured otherwise.

use crate::config::Endpoints;
use crate::error::InstallError;
use crate::http::get_json;
use crate::resolver::Resolution;
use crate::version::{sort_newest_first, Channel, VersionId};
use std::collections::BTreeMap;

type Metadata = BTreeMap<String, Vec<String>>;

async fn fetch_metadata(
    client: &reqwest::Client,
    endpoints: &Endpoints,
) -> Result<Metadata, InstallError> {
    let url = format!(
        "{}/net/minecraftforge/forge/maven-metadata.json",
        endpoints.forge_files.trim_end_matches('/')
    );
    get_json(client, &url).await
}

pub(super) fn index_page(endpoints: &Endpoints, version: &str) -> String {
    format!(
        "{}/net/minecraftforge/forge/index_{}.html",
        endpoints.forge_files.trim_end_matches('/'),
        version
    )
}

pub(super) async fn list(
    client: &reqwest::Client,
    endpoints: &Endpoints,
) -> Result<Vec<VersionId>, InstallError> {
    let mut games: Vec<String> = fetch_metadata(client, endpoints).await?.into_keys().collect();
    sort_newest_first(&mut games);

    Ok(games
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
    let metadata = fetch_metadata(client, endpoints).await?;

    let Some(build) = metadata.get(version).and_then(|builds| builds.last()) else {
        return Ok(Resolution::NotFound);
    };

    Ok(Resolution::Direct(format!(
        "{}/net/minecraftforge/forge/{build}/forge-{build}-installer.jar",
        endpoints.forge_maven.trim_end_matches('/'),
        build = build
    )))
}
