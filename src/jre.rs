//! Java runtime cache.
//!
//! Each Java major version gets one slot, `<root>/jdk-<major>`. A slot only
//! ever appears by renaming a fully extracted runtime into place, so a slot
//! that exists is complete.

use crate::download::{download_to_memory, extract_archive, ProgressBand, ProgressSink};
use crate::error::InstallError;
use crate::http::get_json;
use crate::platform::{Os, Platform};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

/// Progress checkpoints of [`JavaRuntimeCache::ensure`].
pub const CACHED: f32 = 0.10;
pub const RESOLVING: f32 = 0.02;
pub const DOWNLOAD_BAND: ProgressBand = ProgressBand::new(0.05, 0.35);
pub const EXTRACTING: f32 = 0.35;
pub const READY: f32 = 0.40;

#[derive(Debug, Deserialize)]
struct Asset {
    binary: Binary,
}

#[derive(Debug, Deserialize)]
struct Binary {
    image_type: String,
    package: Package,
}

#[derive(Debug, Deserialize)]
struct Package {
    link: String,
    name: String,
}

/// A runtime found in the cache.
#[derive(Debug, Clone)]
pub struct CachedRuntime {
    pub major: u32,
    pub java_executable: PathBuf,
}

/// Downloads JDKs from the Adoptium API and keeps one per major version.
pub struct JavaRuntimeCache {
    root: PathBuf,
    platform: Platform,
    client: reqwest::Client,
    api_base: String,
    slots: Mutex<HashMap<u32, Arc<tokio::sync::Mutex<()>>>>,
}

impl JavaRuntimeCache {
    /// A relative `root` is anchored at the current directory, since the
    /// returned executables are used from other working directories.
    pub fn new(root: PathBuf, platform: Platform, client: reqwest::Client, api_base: &str) -> Self {
        JavaRuntimeCache {
            root: std::path::absolute(&root).unwrap_or(root),
            platform,
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn slot_dir(&self, major: u32) -> PathBuf {
        self.root.join(format!("jdk-{}", major))
    }

    fn slot_lock(&self, major: u32) -> Arc<tokio::sync::Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(major).or_default().clone()
    }

    /// Path to a `java` executable of the given major version, downloading
    /// and caching the runtime first if needed.
    ///
    /// Concurrent calls for the same major version download at most once.
    pub async fn ensure(&self, major: u32, progress: &dyn ProgressSink) -> Result<PathBuf, InstallError> {
        let lock = self.slot_lock(major);
        let _guard = lock.lock().await;

        let slot = self.slot_dir(major);
        if slot.is_dir() {
            if let Some(java) = find_java_executable(&slot, &self.platform.os) {
                progress.report(&format!("Java {} already installed", major), CACHED);
                return Ok(java);
            }
            tracing::warn!("Cached Java {} at {} has no executable, reinstalling", major, slot.display());
            tokio::fs::remove_dir_all(&slot).await?;
        }

        progress.report(&format!("Resolving Java {} for {}...", major, self.platform.key()), RESOLVING);
        let package = self.find_package(major).await?;
        tracing::info!("Java {} package: {}", major, package.link);

        let label = format!("Java {}", major);
        let data = download_to_memory(&self.client, &package.link, DOWNLOAD_BAND, &label, progress).await?;

        progress.report(&format!("Extracting Java {}...", major), EXTRACTING);
        let root = self.root.clone();
        let name = package.name.clone();
        let target = slot.clone();
        tokio::task::spawn_blocking(move || install_into_slot(&data, &name, &root, &target))
            .await
            .map_err(|e| InstallError::Archive(format!("Extraction task failed: {}", e)))??;

        let java = find_java_executable(&slot, &self.platform.os).ok_or_else(|| {
            InstallError::Archive(format!("No java executable inside {}", package.name))
        })?;

        progress.report(&format!("Java {} ready", major), READY);
        Ok(java)
    }

    async fn find_package(&self, major: u32) -> Result<Package, InstallError> {
        let url = format!(
            "{}/v3/assets/latest/{}/hotspot?vendor=eclipse&os={}&architecture={}",
            self.api_base,
            major,
            self.platform.runtime_os(),
            self.platform.runtime_arch()
        );

        let assets: Vec<Asset> = get_json(&self.client, &url).await?;
        assets
            .into_iter()
            .find(|a| a.binary.image_type == "jdk")
            .map(|a| a.binary.package)
            .ok_or_else(|| InstallError::NoRuntimeAsset {
                major,
                platform: self.platform.key(),
            })
    }

    /// Runtimes currently in the cache, by major version.
    pub fn list_cached(&self) -> std::io::Result<Vec<CachedRuntime>> {
        let mut runtimes = Vec::new();

        if !self.root.exists() {
            return Ok(runtimes);
        }

        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }

            let major = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix("jdk-"))
                .and_then(|n| n.parse::<u32>().ok());

            let (Some(major), Some(java_executable)) = (major, find_java_executable(&path, &self.platform.os)) else {
                continue;
            };

            runtimes.push(CachedRuntime { major, java_executable });
        }

        runtimes.sort_by_key(|r| r.major);
        Ok(runtimes)
    }
}

/// Extract next to the slot, then move the runtime's home directory into it.
fn install_into_slot(data: &[u8], name: &str, root: &Path, slot: &Path) -> Result<(), InstallError> {
    std::fs::create_dir_all(root)?;
    let staging = tempfile::Builder::new().prefix(".staging-").tempdir_in(root)?;
    extract_archive(data, name, staging.path())?;

    // Adoptium archives hold a single top-level directory like jdk-17.0.9+9.
    let entries: Vec<PathBuf> = std::fs::read_dir(staging.path())?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    let home = match entries.as_slice() {
        [only] if only.is_dir() => only.clone(),
        _ => staging.path().to_path_buf(),
    };

    match std::fs::rename(&home, slot) {
        Ok(()) => Ok(()),
        Err(_) if slot.is_dir() => {
            tracing::debug!("{} appeared while extracting, keeping it", slot.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Find the java executable within a runtime directory.
fn find_java_executable(jre_dir: &Path, os: &Os) -> Option<PathBuf> {
    let java_name = os.java_executable();

    // Try common JRE layouts
    let candidates = [
        jre_dir.join("bin").join(java_name),
        jre_dir.join("Contents/Home/bin").join(java_name), // macOS bundle
        jre_dir.join("jre/bin").join(java_name),
    ];

    if let Some(found) = candidates.iter().find(|c| c.is_file()) {
        return Some(found.clone());
    }

    walkdir::WalkDir::new(jre_dir)
        .max_depth(5)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name() == java_name)
        .map(|e| e.into_path())
}

/// Run `java -version` and return (version string, major version).
pub fn probe_version(java_executable: &Path) -> Option<(String, u32)> {
    let output = Command::new(java_executable).arg("-version").output().ok()?;

    // Java prints version to stderr
    let stderr = String::from_utf8_lossy(&output.stderr);
    let first_line = stderr.lines().next()?;

    let version = extract_version_from_line(first_line)?;
    let major = parse_major_version(&version)?;
    Some((version, major))
}

/// Extract the quoted version from a `java -version` line, e.g.
/// `openjdk version "21.0.1" 2023-10-17`.
fn extract_version_from_line(line: &str) -> Option<String> {
    let start = line.find('"')? + 1;
    let end = line[start..].find('"')? + start;
    Some(line[start..end].to_string())
}

/// "21.0.1" -> 21, "1.8.0_301" -> 8
fn parse_major_version(version: &str) -> Option<u32> {
    let first_part = version.split('.').next()?;
    let major: u32 = first_part.parse().ok()?;

    if major == 1 {
        version.split('.').nth(1)?.parse().ok()
    } else {
        Some(major)
    }
}
