//! Nether R3D - Render-state synchronization for the R3D shading model
//!
//! This crate drives a fixed shading program (texture compositing, sun and
//! ambient lighting, an elliptical spotlight and distance fog) from a stream
//! of meshes, models and viewports, issuing only the GPU state changes that
//! differ from what the program already holds.
//!
//! # Architecture
//!
//! - [`R3dShader`] - Program activation and draw sequencing
//! - [`MaterialStateCache`] - Dirty-tracked per-mesh uniform state
//! - [`FaceCullingResolver`] - Culling from model transform handedness
//! - [`RenderBackend`] - GPU boundary, implemented for wgpu by [`WgpuBackend`]
//! - [`shading`] - WGSL program sources and a host-side reference

pub mod backend;
pub mod cache;
pub mod config;
pub mod culling;
pub mod error;
#[cfg(test)]
mod integration;
pub mod material;
pub mod shader;
pub mod shading;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod uniforms;
pub mod viewport;
pub mod wgpu_backend;

// Re-export core types
pub use backend::{CullFace, ProgramHandle, ProgramSource, RenderBackend};
pub use cache::MaterialStateCache;
pub use config::R3dConfig;
pub use culling::{FaceCullingResolver, Handedness, classify_determinant};
pub use error::{R3dError, R3dResult, ShaderStage};
pub use material::MeshMaterial;
pub use shader::R3dShader;
pub use stats::UploadStats;
pub use uniforms::{UniformLocation, UniformLocations, UniformName, UniformValue};
pub use viewport::ViewportUniforms;
pub use wgpu_backend::{RasterState, WgpuBackend};
