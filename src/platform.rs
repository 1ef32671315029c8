//! Platform detection and OS-specific utilities.

use crate::error::InstallError;
use std::path::PathBuf;

/// Detected platform information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Os {
    MacOS,
    Linux,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Arch {
    X64,
    X86,
    Aarch64,
}

impl Platform {
    /// Detect the current platform.
    pub fn detect() -> Result<Self, InstallError> {
        let os = Self::detect_os()?;
        let arch = Self::detect_arch()?;
        Ok(Platform { os, arch })
    }

    fn detect_os() -> Result<Os, InstallError> {
        cfg_if::cfg_if! {
            if #[cfg(target_os = "macos")] {
                Ok(Os::MacOS)
            } else if #[cfg(target_os = "linux")] {
                Ok(Os::Linux)
            } else if #[cfg(target_os = "windows")] {
                Ok(Os::Windows)
            } else {
                Err(InstallError::UnsupportedPlatform {
                    os: std::env::consts::OS.to_string(),
                    arch: std::env::consts::ARCH.to_string(),
                })
            }
        }
    }

    fn detect_arch() -> Result<Arch, InstallError> {
        cfg_if::cfg_if! {
            if #[cfg(target_arch = "x86_64")] {
                Ok(Arch::X64)
            } else if #[cfg(target_arch = "x86")] {
                Ok(Arch::X86)
            } else if #[cfg(target_arch = "aarch64")] {
                Ok(Arch::Aarch64)
            } else {
                Err(InstallError::UnsupportedPlatform {
                    os: std::env::consts::OS.to_string(),
                    arch: std::env::consts::ARCH.to_string(),
                })
            }
        }
    }

    /// OS name as the runtime distribution API spells it.
    pub fn runtime_os(&self) -> &'static str {
        match self.os {
            Os::MacOS => "mac",
            Os::Linux => "linux",
            Os::Windows => "windows",
        }
    }

    /// Architecture name as the runtime distribution API spells it.
    pub fn runtime_arch(&self) -> &'static str {
        match self.arch {
            Arch::X64 => "x64",
            Arch::X86 => "x86",
            Arch::Aarch64 => "aarch64",
        }
    }

    /// Short key for messages, e.g. "linux-x64".
    pub fn key(&self) -> String {
        format!("{}-{}", self.runtime_os(), self.runtime_arch())
    }
}

impl Os {
    /// Get the Java executable name.
    pub fn java_executable(&self) -> &'static str {
        match self {
            Os::Windows => "java.exe",
            _ => "java",
        }
    }

    /// Name of the launch script other tooling expects in a server directory.
    pub fn launch_script(&self) -> &'static str {
        match self {
            Os::Windows => "start.bat",
            _ => "start.sh",
        }
    }
}

/// Locations of the tool's own files.
pub struct AppPaths {
    /// Application home (MCSERVER_HOME or the platform config dir)
    pub home: PathBuf,
    /// Java runtime cache root
    pub java: PathBuf,
    /// Global settings file
    pub settings: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::with_home(Self::resolve_home())
    }

    pub fn with_home(home: PathBuf) -> Self {
        AppPaths {
            java: home.join("java"),
            settings: home.join("settings.json"),
            home,
        }
    }

    /// Priority: MCSERVER_HOME env var → <config dir>/mcserver → ./.mcserver
    fn resolve_home() -> PathBuf {
        if let Ok(home) = std::env::var("MCSERVER_HOME") {
            return PathBuf::from(home);
        }

        dirs::config_dir()
            .map(|d| d.join("mcserver"))
            .unwrap_or_else(|| PathBuf::from(".mcserver"))
    }

    /// Ensure the home and cache directories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.home)?;
        std::fs::create_dir_all(&self.java)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_keys() {
        let platform = Platform {
            os: Os::MacOS,
            arch: Arch::Aarch64,
        };
        assert_eq!(platform.key(), "mac-aarch64");

        let platform = Platform {
            os: Os::Windows,
            arch: Arch::X64,
        };
        assert_eq!(platform.runtime_os(), "windows");
        assert_eq!(platform.os.java_executable(), "java.exe");
        assert_eq!(platform.os.launch_script(), "start.bat");
    }

    #[test]
    fn test_paths_under_home() {
        let paths = AppPaths::with_home(PathBuf::from("/tmp/mcs"));
        assert_eq!(paths.java, PathBuf::from("/tmp/mcs/java"));
        assert_eq!(paths.settings, PathBuf::from("/tmp/mcs/settings.json"));
    }
}
