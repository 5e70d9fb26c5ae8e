//! GPU boundary
//!
//! The GPU and its state machine are one shared, mutable resource. Everything
//! the core does to it goes through [`RenderBackend`], in call order, from a
//! single thread. Uploads are fire-and-forget; only program build can fail.

use std::borrow::Cow;

use crate::error::R3dResult;
use crate::shading;
use crate::uniforms::{UniformLocation, UniformValue};

/// Handle to a built (compiled and linked) shading program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Which winding gets culled while face culling is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CullFace {
    /// Cull front faces (mirrored transforms)
    Front = 0,
    /// Cull back faces
    #[default]
    Back = 1,
}

impl CullFace {
    pub fn to_wgpu(self) -> wgpu::Face {
        match self {
            CullFace::Front => wgpu::Face::Front,
            CullFace::Back => wgpu::Face::Back,
        }
    }
}

/// Vertex and fragment sources for one program build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource<'a> {
    pub vertex: Cow<'a, str>,
    pub fragment: Cow<'a, str>,
}

impl<'a> ProgramSource<'a> {
    /// Built-in R3D sources with optional per-stage replacements
    pub fn with_overrides(vertex: Option<&'a str>, fragment: Option<&'a str>) -> Self {
        Self {
            vertex: vertex.map_or_else(|| Cow::Owned(shading::vertex_source()), Cow::Borrowed),
            fragment: fragment
                .map_or_else(|| Cow::Owned(shading::fragment_source()), Cow::Borrowed),
        }
    }
}

impl Default for ProgramSource<'_> {
    fn default() -> Self {
        Self::with_overrides(None, None)
    }
}

/// GPU state machine as seen by the R3D core.
pub trait RenderBackend {
    /// Compile and link a program.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error naming the failing stage.
    fn build_program(&mut self, source: &ProgramSource<'_>) -> R3dResult<ProgramHandle>;

    /// Location of a named uniform, `None` if the program does not expose it
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Bind a program, or unbind with `None`
    fn use_program(&mut self, program: Option<ProgramHandle>);

    /// Write a value into the bound program's uniform state
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    fn set_stencil_test(&mut self, enabled: bool);

    fn set_face_culling(&mut self, enabled: bool);

    fn set_cull_face(&mut self, face: CullFace);
}
