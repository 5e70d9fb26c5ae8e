//! R3D shading program
//!
//! WGSL sources for the GPU program, assembled from a shared prelude (uniform
//! block, inter-stage struct) and one file per stage, plus a host-side
//! [`reference`] evaluation of the same per-fragment algorithm.

pub mod reference;


const COMMON: &str = include_str!("../../shaders/common.wgsl");
const VERTEX: &str = include_str!("../../shaders/vertex.wgsl");
const FRAGMENT: &str = include_str!("../../shaders/fragment.wgsl");

/// Vertex stage entry point
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment stage entry point
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Bind group and binding of the `R3dUniforms` block
pub const UNIFORM_GROUP: u32 = 0;
pub const UNIFORM_BINDING: u32 = 0;
/// Bind group and binding of the caller-owned transforms block
pub const TRANSFORMS_BINDING: u32 = 1;
/// Bind group holding `tex1`, `tex2` and the sampler
pub const TEXTURE_GROUP: u32 = 1;

/// Complete vertex stage source
pub fn vertex_source() -> String {
    format!("{COMMON}\n{VERTEX}")
}

/// Complete fragment stage source
pub fn fragment_source() -> String {
    format!("{COMMON}\n{FRAGMENT}")
}
