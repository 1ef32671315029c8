//! Paper: project metadata lists versions oldest first, each version has a
//! build list whose last entry is the newest build.

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
struct BuildList {
    builds: Vec<Build>,
}

#[derive(Debug, Deserialize)]
struct Build {
    build: u64,
    downloads: Downloads,
}

#[derive(Debug, Deserialize)]
struct Downloads {
    application: Application,
}

#[derive(Debug, Deserialize)]
struct Application {
    name: String,
}

fn project_url(endpoints: &Endpoints) -> String {
    format!("{}/v2/projects/paper", endpoints.paper.trim_end_matches('/'))
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
    let builds: BuildList = get_json(client, &format!("{}/versions/{}/builds", base, version)).await?;

    let Some(latest) = builds.builds.last() else {
        return Ok(Resolution::NotFound);
    };

    Ok(Resolution::Direct(format!(
        "{}/versions/{}/builds/{}/downloads/{}",
        base, version, latest.build, latest.downloads.application.name
    )))
}
