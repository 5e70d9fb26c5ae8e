//! Host-side evaluation of the R3D shading algorithm
//!
//! Mirrors `vs_main` / `fs_main` term for term so the shading rules can be
//! checked without a GPU. A discarded fragment is `None`.

use glam::{Vec2, Vec3, Vec4};

use crate::material::{MeshMaterial, shininess_uniform};
use crate::viewport::ViewportUniforms;

/// Fragments with texture alpha below this are dropped when alpha testing
pub const ALPHA_TEST_THRESHOLD: f32 = 8.0 / 16.0;

/// Smallest alpha the hardware keeps; anything below is discarded
pub const MIN_ALPHA: f32 = 1.0 / 16.0;

/// Upper bound on the ambient weight
pub const AMBIENT_CAP: f32 = 0.75;

/// Anything a texture can be sampled from
pub trait TexelSource {
    fn sample(&self, uv: Vec2) -> Vec4;
}

impl<F: Fn(Vec2) -> Vec4> TexelSource for F {
    fn sample(&self, uv: Vec2) -> Vec4 {
        self(uv)
    }
}

/// Interpolated inputs reaching one fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentInput {
    pub uv: Vec2,
    pub color: Vec4,
    pub view_position: Vec3,
    /// Unit view-space normal
    pub view_normal: Vec3,
    /// Window coordinates (pixels, top-left origin)
    pub frag_coord: Vec2,
    /// Output of [`vertex_fog_factor`]
    pub fog_factor: f32,
}

/// Per-vertex fog blend weight from the eye distance.
pub fn vertex_fog_factor(
    fog_intensity: f32,
    viewport: &ViewportUniforms,
    view_position: Vec3,
) -> f32 {
    let linear = viewport.fog_start + view_position.length() * viewport.fog_density;
    fog_intensity * linear.clamp(0.0, 1.0)
}

/// Spotlight ellipse falloff: 1 at the center, 0 at and past the boundary.
pub fn ellipse_factor(frag_coord: Vec2, spot_ellipse: Vec4) -> f32 {
    let center = Vec2::new(spot_ellipse.x, spot_ellipse.y);
    let half_size = Vec2::new(spot_ellipse.z, spot_ellipse.w);
    let d = ((frag_coord - center) / half_size).length();
    (1.0 - d * d).max(0.0)
}

/// Sun plus capped ambient, clamped to [0, 1]
pub fn light_intensity(sun_factor: f32, diffuse: f32, ambient: f32) -> f32 {
    (sun_factor * diffuse + ambient.min(AMBIENT_CAP)).clamp(0.0, 1.0)
}

/// Depth attenuation of the spotlight at view-space `view_z`.
///
/// Zero in front of `start + min(limit, 0)`, otherwise an inverse-square
/// falloff past `start + limit`.
pub fn spot_range(view_z: f32, spot_range: Vec2) -> f32 {
    let (start, limit) = (spot_range.x, spot_range.y);
    let d = start + limit + view_z;
    let enable = if -view_z >= start + limit.min(0.0) { 1.0 } else { 0.0 };
    let falloff = (d / start).min(0.0) - 1.0;
    (1.0 / (falloff * falloff)).clamp(0.0, 1.0) * enable
}

/// Texture stage: invert, micro-texture average, alpha test, alpha override.
///
/// Returns opaque white for untextured meshes.
pub fn composite_texture(
    mesh: &MeshMaterial,
    uv: Vec2,
    base: &impl TexelSource,
    micro: &impl TexelSource,
) -> Option<Vec4> {
    if !mesh.textured {
        return Some(Vec4::ONE);
    }

    let mut tex = base.sample(uv);
    if mesh.inverted {
        tex = (Vec3::ONE - tex.truncate()).extend(tex.w);
    }
    if mesh.micro_texture {
        let scale = Vec2::from_array(mesh.base_tex_size()) / 256.0 * mesh.micro_texture_scale;
        tex = (tex + micro.sample(uv * scale)) * 0.5;
    }
    if mesh.alpha_test && tex.w < ALPHA_TEST_THRESHOLD {
        return None;
    }
    if !mesh.texture_alpha {
        tex.w = 1.0;
    }
    Some(tex)
}

/// Full fragment shade, `None` if the fragment is discarded.
pub fn shade_fragment(
    mesh: &MeshMaterial,
    viewport: &ViewportUniforms,
    input: &FragmentInput,
    base: &impl TexelSource,
    micro: &impl TexelSource,
) -> Option<Vec4> {
    let tex = composite_texture(mesh, input.uv, base, micro)?;
    let color = tex * input.color;
    if color.w < MIN_ALPHA {
        return None;
    }

    let ellipse = ellipse_factor(input.frag_coord, viewport.spot_ellipse);
    let mut rgb = color.truncate();

    if mesh.lighting {
        let sun = viewport.sun_direction;
        let sun_factor = sun.dot(input.view_normal).max(0.0);

        let lobe = spot_range(input.view_position.z, viewport.spot_range) * ellipse;
        let intensity = Vec3::splat(light_intensity(sun_factor, viewport.diffuse, viewport.ambient))
            + viewport.spot_color * lobe;
        rgb *= intensity;

        if sun_factor > 0.0 && mesh.specular_coefficient > 0.0 {
            let n_dot_l = input.view_normal.dot(sun).max(0.0);
            let specular = n_dot_l.powf(shininess_uniform(mesh.shininess));
            rgb += Vec3::splat(mesh.specular_coefficient * specular);
        }
    }

    let spot_fog = viewport.spot_fog_color * ellipse * viewport.fog_colour;
    let fog = spot_fog * viewport.fog_attenuation + viewport.fog_colour * viewport.fog_ambient;
    Some(rgb.lerp(fog, input.fog_factor).extend(color.w))
}
