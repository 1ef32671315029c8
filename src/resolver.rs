//! Download resolution.

use crate::backend::Backend;
use crate::config::Settings;
use std::fmt;

/// Where the artifact for a backend version can be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A URL the downloader can fetch directly.
    Direct(String),
    /// No automatable link exists; a human has to download from this page.
    ManualWebpage(String),
    /// Nothing installable for this version.
    NotFound,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Direct(url) => write!(f, "{}", url),
            Resolution::ManualWebpage(url) => write!(f, "manual download: {}", url),
            Resolution::NotFound => write!(f, "not found"),
        }
    }
}

/// Resolve the download for `backend` at `version`.
///
/// Never fails: upstream errors are logged and reported as
/// [`Resolution::NotFound`]; the caller decides whether to try again.
pub async fn resolve_download(
    client: &reqwest::Client,
    settings: &Settings,
    backend: Backend,
    version: &str,
) -> Resolution {
    if settings.requires_manual_download(backend) {
        return Resolution::ManualWebpage(backend.manual_page(&settings.endpoints, version));
    }

    match backend.fetch_download(client, &settings.endpoints, version).await {
        Ok(resolution) => {
            tracing::debug!("Resolved {} {} -> {}", backend, version, resolution);
            resolution
        }
        Err(e) => {
            tracing::warn!("Could not resolve {} {}: {}", backend, version, e);
            Resolution::NotFound
        }
    }
}
