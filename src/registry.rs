//! Discovery of installed servers.
//!
//! There is no database: a directory holding a readable descriptor is an
//! installation, and everything below it belongs to that installation.

use crate::descriptor::{InstallationDescriptor, FILE_NAME};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A descriptor together with the directory it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledServer {
    #[serde(flatten)]
    pub descriptor: InstallationDescriptor,
    pub path: PathBuf,
}

/// Find installations under `root`, descending at most `max_depth` levels.
///
/// Never descends into an installation. Unreadable or corrupt descriptors
/// are skipped and the walk continues below them.
pub fn scan(root: &Path, max_depth: usize) -> Vec<InstalledServer> {
    let mut found = Vec::new();
    if !root.is_dir() {
        return found;
    }

    let mut walker = WalkDir::new(root).max_depth(max_depth).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_dir() || !entry.path().join(FILE_NAME).is_file() {
            continue;
        }

        match InstallationDescriptor::read(entry.path()) {
            Ok(Some(descriptor)) => {
                found.push(InstalledServer {
                    descriptor,
                    path: entry.path().to_path_buf(),
                });
                walker.skip_current_dir();
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring descriptor in {}: {}", entry.path().display(), e),
        }
    }

    found
}
