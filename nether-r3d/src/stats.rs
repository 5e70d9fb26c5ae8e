//! Upload accounting for one program activation

/// Counters reset on every activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadStats {
    /// Uniform writes that reached the backend
    pub uniform_uploads: u64,
    /// Uniform writes dropped because the location is absent
    pub skipped_uploads: u64,
    /// Stencil / culling enable and cull-face changes
    pub state_changes: u64,
    /// `set_mesh_uniforms` calls with a descriptor
    pub meshes: u64,
    /// `set_model_states` calls
    pub models: u64,
    /// `set_viewport_uniforms` calls
    pub viewports: u64,
}

impl UploadStats {
    /// Uniform uploads per applied mesh, 0.0 before the first mesh
    pub fn uploads_per_mesh(&self) -> f64 {
        if self.meshes == 0 {
            0.0
        } else {
            self.uniform_uploads as f64 / self.meshes as f64
        }
    }
}
