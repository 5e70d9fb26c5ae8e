//! Configuration management (`r3d.toml`)
//!
//! Optional shader source overrides and debug switches, stored in TOML in
//! the platform-specific config directory or any path the embedder chooses.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{R3dError, R3dResult};

/// File name looked up in [`config_dir`]
pub const CONFIG_FILE_NAME: &str = "r3d.toml";

/// R3D shading configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct R3dConfig {
    /// Shader source overrides
    #[serde(default)]
    pub shader: ShaderConfig,
    /// Debug settings
    #[serde(default)]
    pub debug: DebugConfig,
}

/// Per-stage WGSL replacements for the built-in program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShaderConfig {
    /// Vertex stage source file (default: built-in)
    #[serde(default)]
    pub vertex: Option<PathBuf>,
    /// Fragment stage source file (default: built-in)
    #[serde(default)]
    pub fragment: Option<PathBuf>,
}

/// Debug configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DebugConfig {
    /// Log upload counters at debug level on every deactivation (default: false)
    #[serde(default)]
    pub report_stats: bool,
}

impl R3dConfig {
    /// Load from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> R3dResult<Self> {
        let content = read(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Parse from a TOML string
    ///
    /// # Errors
    ///
    /// Returns [`R3dError::ConfigParse`] on malformed input.
    pub fn from_toml(content: &str) -> R3dResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read the override files, `None` for a stage without one.
    ///
    /// # Errors
    ///
    /// Returns an I/O error naming the first unreadable file.
    pub fn program_overrides(&self) -> R3dResult<(Option<String>, Option<String>)> {
        let vertex = self.shader.vertex.as_deref().map(read).transpose()?;
        let fragment = self.shader.fragment.as_deref().map(read).transpose()?;
        Ok((vertex, fragment))
    }
}

fn read(path: &Path) -> R3dResult<String> {
    std::fs::read_to_string(path).map_err(|source| R3dError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Nethercore\config`
/// On macOS: `~/Library/Application Support/io.nethercore.Nethercore`
/// On Linux: `~/.config/Nethercore`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.nethercore", "", "Nethercore")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from the platform config directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> R3dConfig {
    let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE_NAME)) else {
        return R3dConfig::default();
    };
    match R3dConfig::load(&path) {
        Ok(config) => config,
        Err(R3dError::Io { .. }) => R3dConfig::default(),
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            R3dConfig::default()
        }
    }
}
