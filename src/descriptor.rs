//! Installation descriptor: `installer_profile.json` at an installation root.
//!
//! Its presence marks the directory as a complete installation. The field
//! names are shared with descriptors written by earlier tools and must stay
//! readable.

use crate::backend::Backend;
use crate::error::InstallError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const FILE_NAME: &str = "installer_profile.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationDescriptor {
    pub core_type: Backend,
    pub version: String,
    /// Jar the launch script runs, or a marker for installer-based backends.
    pub jar_name: String,
}

impl InstallationDescriptor {
    pub fn new(core_type: Backend, version: impl Into<String>, jar_name: impl Into<String>) -> Self {
        InstallationDescriptor {
            core_type,
            version: version.into(),
            jar_name: jar_name.into(),
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(FILE_NAME)
    }

    /// Read the descriptor in `dir`, if there is one.
    pub fn read(dir: &Path) -> Result<Option<Self>, InstallError> {
        let path = Self::path_in(dir);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| InstallError::Schema {
                url: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    /// Write the descriptor into `dir`, replacing any previous one whole.
    pub fn write(&self, dir: &Path) -> Result<(), InstallError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| InstallError::Schema {
            url: Self::path_in(dir).display().to_string(),
            reason: e.to_string(),
        })?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.persist(Self::path_in(dir)).map_err(|e| InstallError::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let tmp = tempfile::tempdir().unwrap();
        let descriptor = InstallationDescriptor::new(Backend::Paper, "1.20.1", "server.jar");
        descriptor.write(tmp.path()).unwrap();

        let raw = std::fs::read_to_string(tmp.path().join(FILE_NAME)).unwrap();
        assert!(raw.contains("\"core_type\": \"Paper\""));
        assert_eq!(InstallationDescriptor::read(tmp.path()).unwrap(), Some(descriptor));
    }

    #[test]
    fn test_reads_legacy_descriptor() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(FILE_NAME),
            r#"{
    "core_type": "NeoForge",
    "version": "21.1.65",
    "jar_name": "N/A (Installer Core)"
}"#,
        )
        .unwrap();

        let descriptor = InstallationDescriptor::read(tmp.path()).unwrap().unwrap();
        assert_eq!(descriptor.core_type, Backend::NeoForge);
        assert_eq!(descriptor.jar_name, crate::backend::INSTALLER_ARTIFACT_NAME);
    }

    #[test]
    fn test_corrupt_descriptor_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(FILE_NAME), "{not json").unwrap();
        assert!(matches!(
            InstallationDescriptor::read(tmp.path()),
            Err(InstallError::Schema { .. })
        ));
        assert_eq!(InstallationDescriptor::read(&tmp.path().join("nope")).unwrap(), None);
    }
}
