//! Per-mesh material descriptor
//!
//! A [`MeshMaterial`] is the subset of a mesh's source data that feeds the
//! shading program. The state cache only reads it and compares it field by
//! field against what was last uploaded.

/// Per-drawable material attributes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeshMaterial {
    /// Sample the base texture (`tex1`)
    pub textured: bool,
    /// Blend in the micro texture (`tex2`)
    pub micro_texture: bool,
    /// Extra tiling factor applied to micro texture coordinates
    pub micro_texture_scale: f32,
    /// Base texture width in texels
    pub width: u32,
    /// Base texture height in texels
    pub height: u32,
    /// Complement the base texture RGB
    pub inverted: bool,
    /// Discard fragments whose texture alpha is below 8/16
    pub alpha_test: bool,
    /// Keep texture alpha (otherwise forced to 1.0)
    pub texture_alpha: bool,
    /// Per-mesh fog scale in [0, 1]
    pub fog_intensity: f32,
    /// Lit (true) or luminous, drawn at full intensity (false)
    pub lighting: bool,
    /// Raw shininess exponent code, see [`shininess_uniform`]
    pub shininess: f32,
    /// Specular coefficient; 0 disables the specular term
    pub specular_coefficient: f32,
    /// Drawn with the stencil test enabled
    pub layered: bool,
    /// Both faces visible (face culling disabled)
    pub double_sided: bool,
}

impl MeshMaterial {
    /// Base texture size as uploaded to `baseTexSize`
    #[inline]
    pub fn base_tex_size(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// Shininess value the shader sees: `(raw + 1) * 4`.
///
/// Only the raw attribute is cached for comparison; this transform happens
/// at upload time.
#[inline]
pub fn shininess_uniform(raw: f32) -> f32 {
    (raw + 1.0) * 4.0
}
