//! Face culling from model transform handedness
//!
//! A mirrored model transform (negative determinant) flips triangle winding,
//! so the face that must be culled flips with it. Degenerate transforms
//! (zero or NaN determinant) have no usable winding and draw both faces.

use crate::backend::{CullFace, RenderBackend};
use crate::uniforms::UniformWriter;

/// Sign class of a model transform determinant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    /// Mirrored transform: cull front faces
    Negative,
    /// Regular transform: cull back faces
    Positive,
    /// Zero or NaN determinant: culling off, both faces visible
    Degenerate,
}

impl Handedness {
    /// Face to cull, `None` when culling is disabled
    pub fn cull_face(self) -> Option<CullFace> {
        match self {
            Handedness::Negative => Some(CullFace::Front),
            Handedness::Positive => Some(CullFace::Back),
            Handedness::Degenerate => None,
        }
    }

    /// Whether meshes under this transform are treated as double-sided
    pub fn is_double_sided(self) -> bool {
        self == Handedness::Degenerate
    }
}

/// Classify a determinant by sign. NaN is never `< 0` nor `> 0`, so it lands
/// in [`Handedness::Degenerate`] together with zero.
pub fn classify_determinant(determinant: f32) -> Handedness {
    if determinant < 0.0 {
        Handedness::Negative
    } else if determinant > 0.0 {
        Handedness::Positive
    } else {
        Handedness::Degenerate
    }
}

/// Tracks the last applied classification and re-applies culling state only
/// when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCullingResolver {
    current: Option<Handedness>,
    dirty: bool,
}

impl FaceCullingResolver {
    pub fn new() -> Self {
        Self {
            current: None,
            dirty: true,
        }
    }

    /// Forget the classification and force the next model to re-apply
    pub fn reset(&mut self) {
        self.current = None;
        self.dirty = true;
    }

    /// Last classification applied, `None` until the first model after a reset
    pub fn classification(&self) -> Option<Handedness> {
        self.current
    }

    /// Classify `determinant` and push the culling state if it differs from
    /// the previous model's (or the resolver is dirty).
    ///
    /// Returns the classification when GPU state was written.
    pub(crate) fn apply_model<B: RenderBackend + ?Sized>(
        &mut self,
        writer: &mut UniformWriter<'_, B>,
        determinant: f32,
    ) -> Option<Handedness> {
        let class = classify_determinant(determinant);
        let changed = self.dirty || self.current != Some(class);

        if changed {
            match class.cull_face() {
                Some(face) => {
                    writer.cull_face(face);
                    writer.face_culling(true);
                }
                None => writer.face_culling(false),
            }
        }

        self.current = Some(class);
        self.dirty = false;

        changed.then_some(class)
    }
}

impl Default for FaceCullingResolver {
    fn default() -> Self {
        Self::new()
    }
}
