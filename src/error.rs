//! Error types and exit codes for the mcserver CLI.

use crate::pipeline::Phase;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Configuration error (unreadable settings, bad arguments)
    ConfigError = 2,
    /// Network error (metadata unreachable, download failed)
    NetworkError = 3,
    /// Java runtime error (no runtime for platform, java missing)
    JavaError = 4,
    /// Installation failed after it started
    InstallError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Map a child process exit code onto ours. Success stays success,
    /// everything else is passed through as-is, capped to a valid byte.
    pub fn passthrough(code: i32) -> i32 {
        if code == 0 {
            0
        } else {
            code.abs().min(255)
        }
    }
}

/// Failures raised by the installation core.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response from {url}: {reason}")]
    Schema { url: String, reason: String },

    #[error("No downloadable artifact for {backend} {version}. Pick another version.")]
    NotFound { backend: String, version: String },

    #[error(
        "No manually downloaded .{extension} installer found in {}.\n\
        Save the installer into that folder and try again.",
        dir.display()
    )]
    MissingManualArtifact { dir: PathBuf, extension: String },

    #[error(
        "Found {count} .{extension} files in {}; cannot tell which one is the installer.\n\
        Leave exactly one installer in that folder and try again.",
        dir.display()
    )]
    AmbiguousManualArtifact {
        dir: PathBuf,
        extension: String,
        count: usize,
    },

    #[error("Manual download declined by user")]
    UserDeclined,

    #[error(
        "Java executable '{}' not found. Check java_executable_path or enable auto_download_java.",
        path.display()
    )]
    JavaNotFound { path: PathBuf },

    #[error("Installer failed!\nExit code: {code}\nOutput: {stdout}\nError: {stderr}")]
    Subprocess {
        code: String,
        stdout: String,
        stderr: String,
    },

    #[error(
        "Installer finished but {expected} was not generated in {}. \
        This installer version is not supported.",
        dir.display()
    )]
    UnsupportedInstallerOutput { expected: String, dir: PathBuf },

    #[error("No Java {major} runtime published for platform {platform}")]
    NoRuntimeAsset { major: u32, platform: String },

    #[error("Unsupported platform: {os}-{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InstallError {
    /// Exit code the CLI uses when this error ends a command.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            InstallError::Network(_) | InstallError::Schema { .. } => ExitCode::NetworkError,
            InstallError::JavaNotFound { .. }
            | InstallError::NoRuntimeAsset { .. }
            | InstallError::UnsupportedPlatform { .. } => ExitCode::JavaError,
            InstallError::Io(_) => ExitCode::GeneralError,
            _ => ExitCode::InstallError,
        }
    }
}

impl From<reqwest::Error> for InstallError {
    fn from(err: reqwest::Error) -> Self {
        InstallError::Network(err.to_string())
    }
}

impl From<zip::result::ZipError> for InstallError {
    fn from(err: zip::result::ZipError) -> Self {
        InstallError::Archive(err.to_string())
    }
}

/// An [`InstallError`] tagged with the pipeline phase it interrupted.
#[derive(Error, Debug)]
#[error("Installation failed while {phase}")]
pub struct PipelineError {
    pub phase: Phase,
    #[source]
    pub source: InstallError,
}

impl PipelineError {
    pub fn new(phase: Phase, source: InstallError) -> Self {
        PipelineError { phase, source }
    }

    /// The underlying failure, without phase context.
    pub fn kind(&self) -> &InstallError {
        &self.source
    }
}
