//! Named uniforms of the R3D shading program
//!
//! The program exposes a fixed set of named uniforms. Locations are resolved
//! once per program build and kept in a [`UniformLocations`] table indexed by
//! [`UniformName`]. A name the program does not expose resolves to `None` and
//! every upload to it is skipped.

use glam::{Vec2, Vec3, Vec4};

use crate::backend::{CullFace, ProgramHandle, RenderBackend};
use crate::stats::UploadStats;

/// Opaque backend-specific uniform location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Every uniform the R3D program declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UniformName {
    // Texture units
    Tex1 = 0,
    Tex2,
    // Per-mesh flags
    TextureEnabled,
    MicroTexture,
    TextureAlpha,
    AlphaTest,
    TextureInverted,
    LightEnable,
    // Per-mesh scalars and vectors
    MicroTextureScale,
    BaseTexSize,
    FogIntensity,
    Shininess,
    SpecularCoefficient,
    // Per-viewport globals
    FogDensity,
    FogStart,
    FogAttenuation,
    FogAmbient,
    FogColour,
    Lighting,
    SpotEllipse,
    SpotRange,
    SpotColor,
    SpotFogColor,
}

impl UniformName {
    pub const COUNT: usize = 23;

    pub const ALL: [UniformName; Self::COUNT] = [
        UniformName::Tex1,
        UniformName::Tex2,
        UniformName::TextureEnabled,
        UniformName::MicroTexture,
        UniformName::TextureAlpha,
        UniformName::AlphaTest,
        UniformName::TextureInverted,
        UniformName::LightEnable,
        UniformName::MicroTextureScale,
        UniformName::BaseTexSize,
        UniformName::FogIntensity,
        UniformName::Shininess,
        UniformName::SpecularCoefficient,
        UniformName::FogDensity,
        UniformName::FogStart,
        UniformName::FogAttenuation,
        UniformName::FogAmbient,
        UniformName::FogColour,
        UniformName::Lighting,
        UniformName::SpotEllipse,
        UniformName::SpotRange,
        UniformName::SpotColor,
        UniformName::SpotFogColor,
    ];

    /// Identifier used in the shader source
    pub fn as_str(self) -> &'static str {
        match self {
            UniformName::Tex1 => "tex1",
            UniformName::Tex2 => "tex2",
            UniformName::TextureEnabled => "textureEnabled",
            UniformName::MicroTexture => "microTexture",
            UniformName::TextureAlpha => "textureAlpha",
            UniformName::AlphaTest => "alphaTest",
            UniformName::TextureInverted => "textureInverted",
            UniformName::LightEnable => "lightEnable",
            UniformName::MicroTextureScale => "microTextureScale",
            UniformName::BaseTexSize => "baseTexSize",
            UniformName::FogIntensity => "fogIntensity",
            UniformName::Shininess => "shininess",
            UniformName::SpecularCoefficient => "specularCoefficient",
            UniformName::FogDensity => "fogDensity",
            UniformName::FogStart => "fogStart",
            UniformName::FogAttenuation => "fogAttenuation",
            UniformName::FogAmbient => "fogAmbient",
            UniformName::FogColour => "fogColour",
            UniformName::Lighting => "lighting",
            UniformName::SpotEllipse => "spotEllipse",
            UniformName::SpotRange => "spotRange",
            UniformName::SpotColor => "spotColor",
            UniformName::SpotFogColor => "spotFogColor",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for UniformName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value written to a uniform location.
///
/// Flags travel as `Bool`; the backend decides the storage (GL int, WGSL u32).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Texture unit index for a sampler
    Int(i32),
    Bool(bool),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    /// `lighting[2]`: sun direction, then (diffuse, ambient, unused)
    Vec3x2([Vec3; 2]),
}

/// Resolved locations for every [`UniformName`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocations {
    slots: [Option<UniformLocation>; UniformName::COUNT],
}

impl UniformLocations {
    /// Table where every uniform is absent (no program, or a failed build)
    pub const fn absent() -> Self {
        Self {
            slots: [None; UniformName::COUNT],
        }
    }

    /// Look every name up in `program`
    pub fn resolve<B: RenderBackend + ?Sized>(backend: &B, program: ProgramHandle) -> Self {
        let mut slots = [None; UniformName::COUNT];
        for name in UniformName::ALL {
            slots[name.index()] = backend.uniform_location(program, name.as_str());
            if slots[name.index()].is_none() {
                tracing::debug!("Uniform '{}' not exposed by program {:?}", name, program);
            }
        }
        Self { slots }
    }

    #[inline]
    pub fn get(&self, name: UniformName) -> Option<UniformLocation> {
        self.slots[name.index()]
    }

    /// Number of names that resolved to a location
    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for UniformLocations {
    fn default() -> Self {
        Self::absent()
    }
}

/// Uploads through a location table, skipping absent locations and
/// counting everything that reaches the backend.
pub(crate) struct UniformWriter<'a, B: RenderBackend + ?Sized> {
    pub backend: &'a mut B,
    pub locations: &'a UniformLocations,
    pub stats: &'a mut UploadStats,
}

impl<B: RenderBackend + ?Sized> UniformWriter<'_, B> {
    pub fn upload(&mut self, name: UniformName, value: UniformValue) {
        match self.locations.get(name) {
            Some(location) => {
                tracing::trace!("upload {} = {:?}", name, value);
                self.backend.set_uniform(location, value);
                self.stats.uniform_uploads += 1;
            }
            None => self.stats.skipped_uploads += 1,
        }
    }

    pub fn stencil_test(&mut self, enabled: bool) {
        tracing::debug!("stencil test {}", if enabled { "on" } else { "off" });
        self.backend.set_stencil_test(enabled);
        self.stats.state_changes += 1;
    }

    pub fn face_culling(&mut self, enabled: bool) {
        tracing::debug!("face culling {}", if enabled { "on" } else { "off" });
        self.backend.set_face_culling(enabled);
        self.stats.state_changes += 1;
    }

    pub fn cull_face(&mut self, face: CullFace) {
        tracing::debug!("cull face {:?}", face);
        self.backend.set_cull_face(face);
        self.stats.state_changes += 1;
    }
}
