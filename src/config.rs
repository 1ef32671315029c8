//! Settings for mcserver.
//!
//! Settings are loaded once by the command layer and handed to the install
//! pipeline as a value. Every field has a default, and unknown keys are
//! ignored so settings files written by older front-ends still load.

use crate::backend::Backend;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// User settings read by the install pipeline and the commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory `scan` searches when none is given
    pub scan_path: String,

    /// Minimum heap, in MiB
    pub min_ram_mb: u32,

    /// Maximum heap, in MiB
    pub max_ram_mb: u32,

    /// Start the server with its own GUI window instead of `nogui`
    pub use_server_gui: bool,

    /// Download and cache a Java runtime matching the game version
    pub auto_download_java: bool,

    /// Write `eula=true` during installation
    pub auto_accept_eula: bool,

    /// Java used when `auto_download_java` is off
    pub java_executable_path: String,

    pub default_server_port: String,
    pub default_max_players: String,
    pub default_difficulty: String,
    pub default_gamemode: String,
    pub default_online_mode: bool,
    pub default_pvp: bool,

    /// How deep `scan` descends looking for installations
    pub scan_depth: usize,

    /// Game version → Java major version rules
    pub java: JavaPolicy,

    /// Backends whose downloads must be fetched by hand in a browser
    pub manual_download_backends: Vec<Backend>,

    /// Upstream API locations
    pub endpoints: Endpoints,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            scan_path: default_scan_path(),
            min_ram_mb: 1024,
            max_ram_mb: 2048,
            use_server_gui: false,
            auto_download_java: false,
            auto_accept_eula: true,
            java_executable_path: "java".to_string(),
            default_server_port: "25565".to_string(),
            default_max_players: "20".to_string(),
            default_difficulty: "easy".to_string(),
            default_gamemode: "survival".to_string(),
            default_online_mode: true,
            default_pvp: true,
            scan_depth: 6,
            java: JavaPolicy::default(),
            manual_download_backends: vec![Backend::Forge],
            endpoints: Endpoints::default(),
        }
    }
}

fn default_scan_path() -> String {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string())
}

impl Settings {
    /// Load settings from a file, falling back to defaults when it is absent.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// Save settings to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        Ok(())
    }

    /// Heap flags shared by every launch script.
    pub fn heap_flags(&self) -> String {
        format!("-Xms{}M -Xmx{}M", self.min_ram_mb, self.max_ram_mb)
    }

    /// Whether downloads for `backend` go through the browser.
    pub fn requires_manual_download(&self, backend: Backend) -> bool {
        self.manual_download_backends.contains(&backend)
    }

    /// Contents of a freshly created `server.properties`, in file order.
    pub fn default_properties(&self) -> IndexMap<String, String> {
        let mut props = IndexMap::new();
        props.insert("server-port".to_string(), self.default_server_port.clone());
        props.insert("max-players".to_string(), self.default_max_players.clone());
        props.insert("online-mode".to_string(), self.default_online_mode.to_string());
        props.insert("difficulty".to_string(), self.default_difficulty.clone());
        props.insert("gamemode".to_string(), self.default_gamemode.clone());
        props.insert("pvp".to_string(), self.default_pvp.to_string());
        props
    }
}

/// One threshold in the Java selection table: game versions `1.<minor>` with
/// `minor >= min_minor` need Java `major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaRule {
    pub min_minor: u32,
    pub major: u32,
}

/// Rule table mapping a game version onto the Java major it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JavaPolicy {
    /// Checked in order; the first matching rule wins.
    pub rules: Vec<JavaRule>,
    /// Used when no rule matches or the version cannot be parsed.
    pub floor: u32,
}

impl Default for JavaPolicy {
    fn default() -> Self {
        JavaPolicy {
            rules: vec![
                JavaRule { min_minor: 21, major: 21 },
                JavaRule { min_minor: 17, major: 17 },
                JavaRule { min_minor: 16, major: 16 },
            ],
            floor: 8,
        }
    }
}

impl JavaPolicy {
    /// Java major version required by a game version like "1.20.1".
    pub fn required_major(&self, game_version: &str) -> u32 {
        let minor = game_version
            .split('.')
            .nth(1)
            .and_then(|part| part.parse::<u32>().ok());

        let Some(minor) = minor else {
            return self.floor;
        };

        self.rules
            .iter()
            .find(|rule| minor >= rule.min_minor)
            .map(|rule| rule.major)
            .unwrap_or(self.floor)
    }
}

/// Base URLs of every upstream service the tool talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub paper: String,
    pub purpur: String,
    pub vanilla_manifest: String,
    pub fabric_meta: String,
    pub forge_files: String,
    pub forge_maven: String,
    pub neoforge_maven: String,
    pub adoptium: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            paper: "https://api.papermc.io".to_string(),
            purpur: "https://api.purpurmc.org".to_string(),
            vanilla_manifest: "https://launchermeta.mojang.com/mc/game/version_manifest.json"
                .to_string(),
            fabric_meta: "https://meta.fabricmc.net".to_string(),
            forge_files: "https://files.minecraftforge.net".to_string(),
            forge_maven: "https://maven.minecraftforge.net".to_string(),
            neoforge_maven: "https://maven.neoforged.net/releases".to_string(),
            adoptium: "https://api.adoptium.net".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one host, keeping the upstream path layout.
    #[cfg(test)]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Endpoints {
            paper: base.to_string(),
            purpur: base.to_string(),
            vanilla_manifest: format!("{}/mc/game/version_manifest.json", base),
            fabric_meta: base.to_string(),
            forge_files: base.to_string(),
            forge_maven: base.to_string(),
            neoforge_maven: base.to_string(),
            adoptium: base.to_string(),
        }
    }
}
