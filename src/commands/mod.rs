//! Command implementations.

pub mod config;
pub mod install;
pub mod java;
pub mod props;
pub mod resolve;
pub mod scan;
pub mod start;
pub mod versions;

use crate::config::Settings;
use crate::jre::JavaRuntimeCache;
use crate::platform::{AppPaths, Platform};
use anyhow::Result;

/// Application paths and the settings loaded from them.
pub(crate) fn load_context() -> Result<(AppPaths, Settings)> {
    let paths = AppPaths::new();
    let settings = Settings::load_from_file(&paths.settings)?;
    Ok((paths, settings))
}

/// The shared Java runtime cache under the application home.
pub(crate) fn java_cache(paths: &AppPaths, settings: &Settings, client: reqwest::Client) -> Result<JavaRuntimeCache> {
    let platform = Platform::detect()?;
    Ok(JavaRuntimeCache::new(
        paths.java.clone(),
        platform,
        client,
        &settings.endpoints.adoptium,
    ))
}
