//! Install pipeline.
//!
//! One installation runs these phases strictly in order, each gated on the
//! previous one:
//!
//! 1. prepare Java (cached runtime or the configured system Java)
//! 2. resolve the artifact
//! 3. download it, or wait for a manual download
//! 4. run the installer, for backends that ship one
//! 5. write launch scripts
//! 6. write `eula.txt` and default `server.properties`
//! 7. write the installation descriptor
//!
//! The descriptor is written last. A failure stops the pipeline on the spot
//! and leaves whatever was already written for inspection.

use crate::backend::{Backend, INSTALLER_ARTIFACT_NAME};
use crate::config::Settings;
use crate::descriptor::InstallationDescriptor;
use crate::download::{download_file, Progress, ProgressBand, ProgressSink, Silent};
use crate::error::{InstallError, PipelineError};
use crate::jre::JavaRuntimeCache;
use crate::resolver::{resolve_download, Resolution};
use crate::{properties, scripts};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const RESOLVING: f32 = 0.42;
const DOWNLOAD_BAND: ProgressBand = ProgressBand::new(0.45, 0.85);
const INSTALLER_STARTED: f32 = 0.86;
const INSTALLER_FINISHED: f32 = 0.90;
const SCRIPTS_WRITTEN: f32 = 0.92;
const EULA_ACCEPTED: f32 = 0.95;
const DONE: f32 = 1.0;

/// Pipeline phase, used to give failures context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    PreparingJava,
    Resolving,
    Downloading,
    RunningInstaller,
    WritingScripts,
    Configuring,
    WritingDescriptor,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Phase::Init => "preparing the target directory",
            Phase::PreparingJava => "preparing Java",
            Phase::Resolving => "resolving the download",
            Phase::Downloading => "downloading the server",
            Phase::RunningInstaller => "running the installer",
            Phase::WritingScripts => "writing launch scripts",
            Phase::Configuring => "writing server configuration",
            Phase::WritingDescriptor => "writing the installation descriptor",
        };
        f.write_str(text)
    }
}

fn at(phase: Phase) -> impl FnOnce(InstallError) -> PipelineError {
    move |source| PipelineError::new(phase, source)
}

/// Asks a human to fetch an artifact that cannot be downloaded automatically.
///
/// Both methods may block; the pipeline calls them off the async runtime.
pub trait ManualDownloadPrompt: Send + Sync {
    /// Show the download page, e.g. in a browser. Failing to do so is not fatal.
    fn open_page(&self, url: &str);

    /// Wait until the user has saved the artifact into `dir`. `false` means
    /// the user gave up.
    fn confirm(&self, url: &str, dir: &Path) -> bool;
}

/// Prompt that always declines, for non-interactive use.
pub struct DeclineManualDownload;

impl ManualDownloadPrompt for DeclineManualDownload {
    fn open_page(&self, _url: &str) {}

    fn confirm(&self, _url: &str, _dir: &Path) -> bool {
        false
    }
}

/// What to install, and where.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub backend: Backend,
    pub version: String,
    pub target: PathBuf,
}

impl InstallRequest {
    pub fn new(backend: Backend, version: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        InstallRequest {
            backend,
            version: version.into(),
            target: target.into(),
        }
    }

    /// "<backend> <version>"
    pub fn label(&self) -> String {
        format!("{} {}", self.backend, self.version)
    }
}

/// A pipeline running on its own task.
pub struct InstallHandle {
    /// Progress updates; closes when the pipeline finishes.
    pub progress: mpsc::UnboundedReceiver<Progress>,
    pub task: JoinHandle<Result<String, PipelineError>>,
}

pub struct InstallPipeline {
    settings: Settings,
    client: reqwest::Client,
    java_cache: Arc<JavaRuntimeCache>,
    progress: Arc<dyn ProgressSink>,
    prompt: Arc<dyn ManualDownloadPrompt>,
}

impl InstallPipeline {
    pub fn new(settings: Settings, client: reqwest::Client, java_cache: Arc<JavaRuntimeCache>) -> Self {
        InstallPipeline {
            settings,
            client,
            java_cache,
            progress: Arc::new(Silent),
            prompt: Arc::new(DeclineManualDownload),
        }
    }

    #[cfg(test)]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn ManualDownloadPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Run on a new task, streaming progress through the returned handle.
    pub fn spawn(mut self, request: InstallRequest) -> InstallHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        self.progress = Arc::new(tx);
        let task = tokio::spawn(async move { self.run(&request).await });
        InstallHandle { progress: rx, task }
    }

    fn report(&self, message: &str, fraction: f32) {
        self.progress.report(message, fraction);
    }

    /// Install `request`, returning "<backend> <version>" on success.
    pub async fn run(&self, request: &InstallRequest) -> Result<String, PipelineError> {
        let backend = request.backend;
        let dir = request.target.as_path();
        let os = self.java_cache.platform().os;
        tracing::info!("Installing {} into {}", request.label(), dir.display());

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PipelineError::new(Phase::Init, e.into()))?;

        let java = self.prepare_java(request).await.map_err(at(Phase::PreparingJava))?;
        tracing::info!("Using Java at {}", java.display());

        self.report(&format!("Looking for {}...", request.label()), RESOLVING);
        let resolution = resolve_download(&self.client, &self.settings, backend, &request.version).await;

        let (artifact, auto_downloaded) = match resolution {
            Resolution::NotFound => {
                return Err(PipelineError::new(
                    Phase::Resolving,
                    InstallError::NotFound {
                        backend: backend.to_string(),
                        version: request.version.clone(),
                    },
                ));
            }
            Resolution::ManualWebpage(page) => {
                let artifact = self
                    .await_manual_download(&page, backend, dir)
                    .await
                    .map_err(at(Phase::Downloading))?;
                (artifact, false)
            }
            Resolution::Direct(url) => {
                let dest = dir.join(backend.download_file_name());
                download_file(&self.client, &url, &dest, DOWNLOAD_BAND, self.progress.as_ref())
                    .await
                    .map_err(at(Phase::Downloading))?;
                self.report("Download complete", DOWNLOAD_BAND.end);
                (dest, true)
            }
        };

        let artifact_name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| backend.download_file_name());

        let jar_name = if backend.requires_installer_execution() {
            self.report(&format!("Running the {} installer...", backend), INSTALLER_STARTED);
            run_installer(&java, &artifact_name, dir)
                .await
                .map_err(at(Phase::RunningInstaller))?;

            if auto_downloaded {
                tokio::fs::remove_file(&artifact)
                    .await
                    .map_err(|e| PipelineError::new(Phase::RunningInstaller, e.into()))?;
            }
            self.report("Installer finished, adapting launch scripts...", INSTALLER_FINISHED);

            scripts::adapt_installer_scripts(dir, &self.settings, os).map_err(at(Phase::WritingScripts))?;
            INSTALLER_ARTIFACT_NAME.to_string()
        } else {
            let java = java.to_string_lossy();
            scripts::write_launch_script(dir, os, &java, &self.settings, &artifact_name)
                .map_err(at(Phase::WritingScripts))?;
            artifact_name
        };
        self.report("Launch script ready", SCRIPTS_WRITTEN);

        self.configure(dir).map_err(at(Phase::Configuring))?;

        InstallationDescriptor::new(backend, &request.version, jar_name)
            .write(dir)
            .map_err(at(Phase::WritingDescriptor))?;

        let label = request.label();
        self.report(&format!("Installed {}", label), DONE);
        tracing::info!("Installed {} into {}", label, dir.display());
        Ok(label)
    }

    async fn prepare_java(&self, request: &InstallRequest) -> Result<PathBuf, InstallError> {
        if !self.settings.auto_download_java {
            self.report("Using system Java", crate::jre::READY);
            return Ok(absolute_if_relative_path(&self.settings.java_executable_path));
        }

        let game_version = request.backend.game_version(&request.version);
        let major = self.settings.java.required_major(&game_version);
        tracing::info!("{} needs Java {}", request.label(), major);
        self.java_cache.ensure(major, self.progress.as_ref()).await
    }

    async fn await_manual_download(
        &self,
        page: &str,
        backend: Backend,
        dir: &Path,
    ) -> Result<PathBuf, InstallError> {
        tracing::info!("{} requires a manual download from {}", backend, page);

        let prompt = Arc::clone(&self.prompt);
        let url = page.to_string();
        let target = dir.to_path_buf();
        let confirmed = tokio::task::spawn_blocking(move || {
            prompt.open_page(&url);
            prompt.confirm(&url, &target)
        })
        .await
        .map_err(|e| InstallError::Io(std::io::Error::other(e)))?;

        if !confirmed {
            return Err(InstallError::UserDeclined);
        }

        let artifact = find_manual_artifact(dir, backend.artifact_extension())?;
        self.report("Found the manually downloaded installer", DOWNLOAD_BAND.end);
        Ok(artifact)
    }

    fn configure(&self, dir: &Path) -> Result<(), InstallError> {
        if self.settings.auto_accept_eula {
            std::fs::write(dir.join("eula.txt"), "eula=true")?;
            self.report("Accepted the EULA", EULA_ACCEPTED);
        }

        if properties::write_defaults_if_absent(dir, &self.settings.default_properties())? {
            tracing::debug!("Wrote default {}", properties::FILE_NAME);
        }
        Ok(())
    }
}

/// Paths like `./jdk/bin/java` are made absolute because the installer runs
/// inside the target directory. Bare names are left for PATH lookup.
fn absolute_if_relative_path(java: &str) -> PathBuf {
    let path = PathBuf::from(java);
    if path.is_relative() && path.components().count() > 1 {
        if let Ok(cwd) = std::env::current_dir() {
            return cwd.join(path);
        }
    }
    path
}

/// The single `*.<extension>` file a user saved into `dir`.
fn find_manual_artifact(dir: &Path, extension: &str) -> Result<PathBuf, InstallError> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect();

    match candidates.len() {
        0 => Err(InstallError::MissingManualArtifact {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        count => Err(InstallError::AmbiguousManualArtifact {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
            count,
        }),
    }
}

/// Run `java -jar <installer> --installServer` inside `dir`.
async fn run_installer(java: &Path, installer: &str, dir: &Path) -> Result<(), InstallError> {
    let output = tokio::process::Command::new(java)
        .arg("-jar")
        .arg(installer)
        .arg("--installServer")
        .current_dir(dir)
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InstallError::JavaNotFound {
                path: java.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if !output.status.success() {
        return Err(InstallError::Subprocess {
            code: output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "terminated by signal".to_string()),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    tracing::debug!("Installer output:\n{}", String::from_utf8_lossy(&output.stdout));
    Ok(())
}
