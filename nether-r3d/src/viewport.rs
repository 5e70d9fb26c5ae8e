//! Per-viewport global uniforms
//!
//! Fog, sun lighting and spotlight parameters change at most once per
//! viewport, so they are pushed as a block every time and never diffed.

use glam::{Vec2, Vec3, Vec4};

use crate::backend::RenderBackend;
use crate::uniforms::{UniformName, UniformValue, UniformWriter};

/// Global shading inputs shared by every mesh drawn in a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportUniforms {
    /// Fog RGB
    pub fog_colour: Vec3,
    pub fog_density: f32,
    pub fog_start: f32,
    /// Scale of the spotlight-on-fog contribution
    pub fog_attenuation: f32,
    /// Scale of the plain fog colour contribution
    pub fog_ambient: f32,
    /// View-space sun direction (pointing away from the surface)
    pub sun_direction: Vec3,
    /// Diffuse weight
    pub diffuse: f32,
    /// Ambient weight (capped at 0.75 by the shader)
    pub ambient: f32,
    /// Screen-space ellipse: x, y center, then half-width, half-height.
    ///
    /// Framebuffer pixels with the origin at the top-left corner and y
    /// pointing down, matching `@builtin(position)`. A center measured from
    /// the bottom-left goes through [`Self::flip_ellipse_y`] first.
    pub spot_ellipse: Vec4,
    /// View-space z range: start, limit
    pub spot_range: Vec2,
    pub spot_color: Vec3,
    /// Spotlight color on fog
    pub spot_fog_color: Vec3,
}

impl ViewportUniforms {
    /// Build from the packed fog parameter array
    /// `[r, g, b, density, start, attenuation, ambient]`
    /// and lighting array `[sun.x, sun.y, sun.z, diffuse, ambient, _]`.
    pub fn from_packed(
        fog_params: [f32; 7],
        lighting_params: [f32; 6],
        spot_ellipse: [f32; 4],
        spot_range: [f32; 2],
        spot_color: [f32; 3],
        spot_fog_color: [f32; 3],
    ) -> Self {
        Self {
            fog_colour: Vec3::new(fog_params[0], fog_params[1], fog_params[2]),
            fog_density: fog_params[3],
            fog_start: fog_params[4],
            fog_attenuation: fog_params[5],
            fog_ambient: fog_params[6],
            sun_direction: Vec3::new(lighting_params[0], lighting_params[1], lighting_params[2]),
            diffuse: lighting_params[3],
            ambient: lighting_params[4],
            spot_ellipse: Vec4::from_array(spot_ellipse),
            spot_range: Vec2::from_array(spot_range),
            spot_color: Vec3::from_array(spot_color),
            spot_fog_color: Vec3::from_array(spot_fog_color),
        }
    }

    /// Convert a bottom-left origin ellipse center to the top-left origin
    /// used by [`Self::spot_ellipse`]
    pub fn flip_ellipse_y(spot_ellipse: Vec4, viewport_height: f32) -> Vec4 {
        Vec4::new(
            spot_ellipse.x,
            viewport_height - spot_ellipse.y,
            spot_ellipse.z,
            spot_ellipse.w,
        )
    }

    /// `lighting[2]` as the shader sees it
    pub fn lighting(&self) -> [Vec3; 2] {
        [self.sun_direction, Vec3::new(self.diffuse, self.ambient, 0.0)]
    }

    /// Push every viewport uniform
    pub(crate) fn upload<B: RenderBackend + ?Sized>(&self, writer: &mut UniformWriter<'_, B>) {
        writer.upload(UniformName::FogDensity, UniformValue::Float(self.fog_density));
        writer.upload(UniformName::FogStart, UniformValue::Float(self.fog_start));
        writer.upload(UniformName::FogColour, UniformValue::Vec3(self.fog_colour));
        writer.upload(UniformName::FogAttenuation, UniformValue::Float(self.fog_attenuation));
        writer.upload(UniformName::FogAmbient, UniformValue::Float(self.fog_ambient));

        writer.upload(UniformName::Lighting, UniformValue::Vec3x2(self.lighting()));
        writer.upload(UniformName::SpotEllipse, UniformValue::Vec4(self.spot_ellipse));
        writer.upload(UniformName::SpotRange, UniformValue::Vec2(self.spot_range));
        writer.upload(UniformName::SpotColor, UniformValue::Vec3(self.spot_color));
        writer.upload(UniformName::SpotFogColor, UniformValue::Vec3(self.spot_fog_color));
    }
}

impl Default for ViewportUniforms {
    fn default() -> Self {
        Self {
            fog_colour: Vec3::ZERO,
            fog_density: 0.0,
            fog_start: 0.0,
            fog_attenuation: 0.0,
            fog_ambient: 1.0,
            sun_direction: Vec3::new(0.0, 0.0, 1.0),
            diffuse: 1.0,
            ambient: 0.5,
            // far off-screen and tiny: no spotlight contribution
            spot_ellipse: Vec4::new(-1.0e6, -1.0e6, 1.0, 1.0),
            spot_range: Vec2::new(1.0, 0.0),
            spot_color: Vec3::ZERO,
            spot_fog_color: Vec3::ZERO,
        }
    }
}
