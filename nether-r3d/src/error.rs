//! Error types for program build and configuration loading

use std::path::PathBuf;

use thiserror::Error;

/// Shader stage a build error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Errors surfaced by the R3D shading core.
///
/// Absent uniform locations and degenerate draw inputs are not errors and
/// never show up here.
#[derive(Debug, Error)]
pub enum R3dError {
    /// Reading a config or shader override file failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::R3dConfig`]
    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// WGSL source failed to parse
    #[error("{stage} shader parse error: {message}")]
    ShaderParse { stage: ShaderStage, message: String },

    /// WGSL source parsed but failed validation
    #[error("{stage} shader validation error: {message}")]
    ShaderValidation { stage: ShaderStage, message: String },

    /// An operation needed a built program but none is loaded
    #[error("No shading program is loaded")]
    ProgramUnavailable,
}

pub type R3dResult<T> = Result<T, R3dError>;
