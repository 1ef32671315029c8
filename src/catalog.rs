//! Version catalog.
//!
//! Listing versions only populates choices for the user, so it fails open:
//! any upstream problem yields an empty list and a logged warning.

use crate::backend::Backend;
use crate::config::Endpoints;
use crate::version::{ChannelFilter, VersionId};

/// Installable versions of `backend` whose channel is in `filters`, newest first.
pub async fn list_versions(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    backend: Backend,
    filters: &ChannelFilter,
) -> Vec<VersionId> {
    if filters.is_empty() {
        return Vec::new();
    }

    match backend.fetch_versions(client, endpoints).await {
        Ok(versions) => versions
            .into_iter()
            .filter(|v| filters.contains(&v.channel))
            .collect(),
        Err(e) => {
            tracing::warn!("Could not list {} versions: {}", backend, e);
            Vec::new()
        }
    }
}
