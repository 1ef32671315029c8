//! Vanilla: the launcher manifest lists every version newest first with an
//! explicit type; the server jar URL lives in each version's own document.

use crate::config::Endpoints;
use crate::error::InstallError;
use crate::http::get_json;
use crate::resolver::Resolution;
use crate::version::{Channel, VersionId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Manifest {
    versions: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct VersionDocument {
    downloads: VersionDownloads,
}

#[derive(Debug, Deserialize)]
struct VersionDownloads {
    server: Option<DownloadEntry>,
}

#[derive(Debug, Deserialize)]
struct DownloadEntry {
    url: String,
}

pub(super) async fn list(
    client: &reqwest::Client,
    endpoints: &Endpoints,
) -> Result<Vec<VersionId>, InstallError> {
    let manifest: Manifest = get_json(client, &endpoints.vanilla_manifest).await?;

    Ok(manifest
        .versions
        .into_iter()
        .filter_map(|entry| match entry.kind.parse::<Channel>() {
            Ok(channel) => Some(VersionId::new(entry.id, channel)),
            Err(_) => {
                tracing::debug!("Skipping {} with unknown type {}", entry.id, entry.kind);
                None
            }
        })
        .collect())
}

pub(super) async fn resolve(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    version: &str,
) -> Result<Resolution, InstallError> {
    let manifest: Manifest = get_json(client, &endpoints.vanilla_manifest).await?;

    let Some(entry) = manifest.versions.iter().find(|v| v.id == version) else {
        return Ok(Resolution::NotFound);
    };

    let document: VersionDocument = get_json(client, &entry.url).await?;

    // Early alphas shipped no server jar.
    Ok(match document.downloads.server {
        Some(server) => Resolution::Direct(server.url),
        None => Resolution::NotFound,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_manifest(server: &MockServer) {
        let body = format!(
            r#"{{"latest":{{"release":"1.20.1","snapshot":"23w31a"}},"versions":[
                {{"id":"23w31a","type":"snapshot","url":"{uri}/v/23w31a.json"}},
                {{"id":"1.20.1","type":"release","url":"{uri}/v/1.20.1.json"}},
                {{"id":"b1.7.3","type":"old_beta","url":"{uri}/v/b1.7.3.json"}},
                {{"id":"a1.0.4","type":"old_alpha","url":"{uri}/v/a1.0.4.json"}},
                {{"id":"x","type":"experiment","url":"{uri}/v/x.json"}}
            ]}}"#,
            uri = server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/mc/game/version_manifest.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_list_keeps_all_four_channels() {
        let server = MockServer::start().await;
        mount_manifest(&server).await;

        let endpoints = Endpoints::with_base(&server.uri());
        let versions = list(&client().unwrap(), &endpoints).await.unwrap();
        let channels: Vec<_> = versions.iter().map(|v| v.channel).collect();
        assert_eq!(
            channels,
            vec![
                Channel::Snapshot,
                Channel::Release,
                Channel::LegacyBeta,
                Channel::LegacyAlpha
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_two_hops() {
        let server = MockServer::start().await;
        mount_manifest(&server).await;
        Mock::given(method("GET"))
            .and(path("/v/1.20.1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"id":"1.20.1","downloads":{"server":{"sha1":"abc","size":1,"url":"https://example.invalid/server.jar"}}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let endpoints = Endpoints::with_base(&server.uri());
        let resolution = resolve(&client().unwrap(), &endpoints, "1.20.1").await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Direct("https://example.invalid/server.jar".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_is_not_found() {
        let server = MockServer::start().await;
        mount_manifest(&server).await;

        let endpoints = Endpoints::with_base(&server.uri());
        let resolution = resolve(&client().unwrap(), &endpoints, "9.9.9").await.unwrap();
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_version_without_server_jar() {
        let server = MockServer::start().await;
        mount_manifest(&server).await;
        Mock::given(method("GET"))
            .and(path("/v/a1.0.4.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"id":"a1.0.4","downloads":{"client":{"url":"https://example.invalid/client.jar"}}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let endpoints = Endpoints::with_base(&server.uri());
        let resolution = resolve(&client().unwrap(), &endpoints, "a1.0.4").await.unwrap();
        assert_eq!(resolution, Resolution::NotFound);
    }
}
