//! Per-mesh material state cache
//!
//! Mirrors the material values last uploaded to the bound program so that a
//! stream of meshes only pays for the fields that actually change. Float
//! fields compare with exact equality.
//!
//! A dirty cache (fresh activation) uploads every field once regardless of
//! what it holds.

use glam::Vec2;

use crate::backend::RenderBackend;
use crate::culling::Handedness;
use crate::material::{MeshMaterial, shininess_uniform};
use crate::uniforms::{UniformName, UniformValue, UniformWriter};

/// Texture unit written to `tex1`, the base texture sampler
pub const BASE_TEXTURE_UNIT: i32 = 0;

/// Texture unit written to `tex2`, the micro-texture sampler
pub const MICRO_TEXTURE_UNIT: i32 = 1;

/// Last uploaded value of one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cached<T> {
    /// Nothing uploaded since the last reset
    Unset,
    Value(T),
}

impl<T: Copy + PartialEq> Cached<T> {
    /// True when `next` must be uploaded: never uploaded, or different
    #[inline]
    pub fn differs(&self, next: T) -> bool {
        match self {
            Cached::Unset => true,
            Cached::Value(current) => *current != next,
        }
    }

    #[inline]
    pub fn get(&self) -> Option<T> {
        match self {
            Cached::Unset => None,
            Cached::Value(value) => Some(*value),
        }
    }

    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, Cached::Unset)
    }
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Cached::Unset
    }
}

/// Store `next` and report whether it must be uploaded
#[inline]
fn refresh<T: Copy + PartialEq>(dirty: bool, slot: &mut Cached<T>, next: T) -> bool {
    let upload = dirty || slot.differs(next);
    *slot = Cached::Value(next);
    upload
}

/// Cached GPU-visible material state for one activated program.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialStateCache {
    dirty: bool,
    textured: Cached<bool>,
    micro_texture: Cached<bool>,
    micro_texture_scale: Cached<f32>,
    base_tex_size: Cached<[u32; 2]>,
    inverted: Cached<bool>,
    alpha_test: Cached<bool>,
    texture_alpha: Cached<bool>,
    fog_intensity: Cached<f32>,
    lighting: Cached<bool>,
    shininess: Cached<f32>,
    specular_coefficient: Cached<f32>,
    layered: Cached<bool>,
    double_sided: Cached<bool>,
}

impl MaterialStateCache {
    pub fn new() -> Self {
        Self {
            dirty: true,
            textured: Cached::Unset,
            micro_texture: Cached::Unset,
            micro_texture_scale: Cached::Unset,
            base_tex_size: Cached::Unset,
            inverted: Cached::Unset,
            alpha_test: Cached::Unset,
            texture_alpha: Cached::Unset,
            fog_intensity: Cached::Unset,
            lighting: Cached::Unset,
            shininess: Cached::Unset,
            specular_coefficient: Cached::Unset,
            layered: Cached::Unset,
            double_sided: Cached::Unset,
        }
    }

    /// Clear every field and mark the whole cache dirty
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Double-sidedness implied by the model's culling state.
    ///
    /// The face culling resolver calls this whenever it rewrites culling, so
    /// the next mesh toggles culling only if it disagrees.
    pub fn assume_double_sided(&mut self, double_sided: bool) {
        self.double_sided = Cached::Value(double_sided);
    }

    /// Last uploaded double-sided state
    pub fn double_sided(&self) -> Option<bool> {
        self.double_sided.get()
    }

    /// Base texture size last uploaded to `baseTexSize`
    pub fn base_tex_size(&self) -> Option<[u32; 2]> {
        self.base_tex_size.get()
    }

    /// Snapshot of the cached fields as a descriptor, `None` for any field
    /// not uploaded since the last reset.
    pub fn snapshot(&self) -> Option<MeshMaterial> {
        let [width, height] = self.base_tex_size.get()?;
        Some(MeshMaterial {
            textured: self.textured.get()?,
            micro_texture: self.micro_texture.get()?,
            micro_texture_scale: self.micro_texture_scale.get()?,
            width,
            height,
            inverted: self.inverted.get()?,
            alpha_test: self.alpha_test.get()?,
            texture_alpha: self.texture_alpha.get()?,
            fog_intensity: self.fog_intensity.get()?,
            lighting: self.lighting.get()?,
            shininess: self.shininess.get()?,
            specular_coefficient: self.specular_coefficient.get()?,
            layered: self.layered.get()?,
            double_sided: self.double_sided.get()?,
        })
    }

    /// Bring the program's material uniforms and the stencil / culling
    /// enables in line with `mesh`, uploading only what changed.
    ///
    /// `handedness` is the face culling resolver's last classification;
    /// under [`Handedness::Degenerate`] culling is forced off and the mesh's
    /// double-sided flag is ignored. `None` mesh is a no-op.
    pub(crate) fn apply_mesh<B: RenderBackend + ?Sized>(
        &mut self,
        writer: &mut UniformWriter<'_, B>,
        mesh: Option<&MeshMaterial>,
        handedness: Option<Handedness>,
    ) {
        let Some(mesh) = mesh else {
            return;
        };
        let dirty = self.dirty;

        if dirty {
            writer.upload(UniformName::Tex1, UniformValue::Int(BASE_TEXTURE_UNIT));
            writer.upload(UniformName::Tex2, UniformValue::Int(MICRO_TEXTURE_UNIT));
        }

        if refresh(dirty, &mut self.textured, mesh.textured) {
            writer.upload(UniformName::TextureEnabled, UniformValue::Bool(mesh.textured));
        }

        if refresh(dirty, &mut self.micro_texture, mesh.micro_texture) {
            writer.upload(UniformName::MicroTexture, UniformValue::Bool(mesh.micro_texture));
        }

        if refresh(dirty, &mut self.micro_texture_scale, mesh.micro_texture_scale) {
            writer.upload(
                UniformName::MicroTextureScale,
                UniformValue::Float(mesh.micro_texture_scale),
            );
        }

        // Size only matters while micro texturing; keep the last uploaded size
        // so re-enabling catches changes made while it was off.
        let size = [mesh.width, mesh.height];
        if dirty || (mesh.micro_texture && self.base_tex_size.differs(size)) {
            self.base_tex_size = Cached::Value(size);
            writer.upload(
                UniformName::BaseTexSize,
                UniformValue::Vec2(Vec2::from_array(mesh.base_tex_size())),
            );
        }

        if refresh(dirty, &mut self.inverted, mesh.inverted) {
            writer.upload(UniformName::TextureInverted, UniformValue::Bool(mesh.inverted));
        }

        if refresh(dirty, &mut self.alpha_test, mesh.alpha_test) {
            writer.upload(UniformName::AlphaTest, UniformValue::Bool(mesh.alpha_test));
        }

        if refresh(dirty, &mut self.texture_alpha, mesh.texture_alpha) {
            writer.upload(UniformName::TextureAlpha, UniformValue::Bool(mesh.texture_alpha));
        }

        if refresh(dirty, &mut self.fog_intensity, mesh.fog_intensity) {
            writer.upload(UniformName::FogIntensity, UniformValue::Float(mesh.fog_intensity));
        }

        if refresh(dirty, &mut self.lighting, mesh.lighting) {
            writer.upload(UniformName::LightEnable, UniformValue::Bool(mesh.lighting));
        }

        if refresh(dirty, &mut self.shininess, mesh.shininess) {
            writer.upload(
                UniformName::Shininess,
                UniformValue::Float(shininess_uniform(mesh.shininess)),
            );
        }

        if refresh(dirty, &mut self.specular_coefficient, mesh.specular_coefficient) {
            writer.upload(
                UniformName::SpecularCoefficient,
                UniformValue::Float(mesh.specular_coefficient),
            );
        }

        if refresh(dirty, &mut self.layered, mesh.layered) {
            writer.stencil_test(mesh.layered);
        }

        if handedness != Some(Handedness::Degenerate)
            && refresh(dirty, &mut self.double_sided, mesh.double_sided)
        {
            writer.face_culling(!mesh.double_sided);
        }

        self.dirty = false;
    }
}

impl Default for MaterialStateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
