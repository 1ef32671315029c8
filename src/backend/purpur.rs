//! Purpur: same publishing model as Paper, different document shapes.

use crate::config::Endpoints;
use crate::error::InstallError;
use crate::http::get_json;
use crate::resolver::Resolution;
use crate::version::{Channel, VersionId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Project {
    versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    builds: Builds,
}

#[derive(Debug, Deserialize)]
struct Builds {
    #[serde(default)]
    all: Vec<String>,
}

fn project_url(endpoints: &Endpoints) -> String {
    format!("{}/v2/purpur", endpoints.purpur.trim_end_matches('/'))
}

pub(super) async fn list(
    client: &reqwest::Client,
    endpoints: &Endpoints,
) -> Result<Vec<VersionId>, InstallError> {
    let project: Project = get_json(client, &project_url(endpoints)).await?;

    Ok(project
        .versions
        .into_iter()
        .rev()
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
    let base = project_url(endpoints);
    let info: VersionInfo = get_json(client, &format!("{}/{}", base, version)).await?;

    Ok(match info.builds.all.last() {
        Some(build) => Resolution::Direct(format!("{}/{}/{}/download", base, version, build)),
        None => Resolution::NotFound,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolve_uses_last_build() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/purpur/1.20.1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"project":"purpur","version":"1.20.1","builds":{"latest":"2062","all":["2060","2061","2062"]}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let endpoints = Endpoints::with_base(&server.uri());
        let resolution = resolve(&client().unwrap(), &endpoints, "1.20.1").await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Direct(format!("{}/v2/purpur/1.20.1/2062/download", server.uri()))
        );
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/purpur"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"project":"purpur","versions":["1.14.1","1.20.1"]}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let endpoints = Endpoints::with_base(&server.uri());
        let versions = list(&client().unwrap(), &endpoints).await.unwrap();
        assert_eq!(versions[0].id, "1.20.1");
    }
}
