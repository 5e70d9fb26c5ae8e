//! R3D shading program controller
//!
//! Owns the built program, its resolved uniform locations, the material state
//! cache and the face culling resolver, and sequences them for a draw:
//!
//! ```text
//! activate
//!   set_viewport_uniforms        (once per viewport)
//!   for each model:
//!     set_model_states           (face culling from determinant sign)
//!     for each mesh:
//!       set_mesh_uniforms        (diffed material upload)
//!       <draw>
//! deactivate
//! ```
//!
//! Every activation starts from a clean slate: the cache is fully dirty and
//! the culling classification is unset, so the first mesh and model after
//! activation re-upload everything once.

use crate::backend::{ProgramHandle, ProgramSource, RenderBackend};
use crate::cache::MaterialStateCache;
use crate::config::R3dConfig;
use crate::culling::{FaceCullingResolver, Handedness};
use crate::error::{R3dError, R3dResult};
use crate::material::MeshMaterial;
use crate::stats::UploadStats;
use crate::uniforms::{UniformLocations, UniformWriter};
use crate::viewport::ViewportUniforms;

/// Shading program plus the state it needs to draw R3D models.
#[derive(Debug, Clone)]
pub struct R3dShader {
    program: Option<ProgramHandle>,
    locations: UniformLocations,
    cache: MaterialStateCache,
    culling: FaceCullingResolver,
    stats: UploadStats,
    active: bool,
    report_stats: bool,
}

impl R3dShader {
    pub fn new() -> Self {
        Self {
            program: None,
            locations: UniformLocations::absent(),
            cache: MaterialStateCache::new(),
            culling: FaceCullingResolver::new(),
            stats: UploadStats::default(),
            active: false,
            report_stats: false,
        }
    }

    pub fn with_config(config: &R3dConfig) -> Self {
        Self {
            report_stats: config.debug.report_stats,
            ..Self::new()
        }
    }

    /// Build the program from the built-in sources, replacing either stage
    /// when an override is given, and resolve every uniform location.
    ///
    /// # Errors
    ///
    /// Returns the backend's build error. The shader is then left without a
    /// program and every location resolves as absent.
    ///
    /// An active program is unbound first; call [`Self::activate`] again to
    /// draw with the rebuilt one.
    pub fn load_shader<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        vertex: Option<&str>,
        fragment: Option<&str>,
    ) -> R3dResult<()> {
        if self.active {
            tracing::debug!("Reloading R3D program while active, unbinding");
            self.deactivate(backend);
        }

        let source = ProgramSource::with_overrides(vertex, fragment);

        match backend.build_program(&source) {
            Ok(program) => {
                self.program = Some(program);
                self.locations = UniformLocations::resolve(&*backend, program);
                tracing::info!(
                    "R3D program {:?} built, {} of {} uniforms resolved",
                    program,
                    self.locations.resolved_count(),
                    crate::uniforms::UniformName::COUNT
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!("R3D program build failed: {}", e);
                self.program = None;
                self.locations = UniformLocations::absent();
                Err(e)
            }
        }
    }

    /// [`Self::load_shader`] with the override files named in `config`
    ///
    /// # Errors
    ///
    /// Returns an I/O error for an unreadable override file, otherwise the
    /// build error.
    pub fn load_from_config<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        config: &R3dConfig,
    ) -> R3dResult<()> {
        let (vertex, fragment) = config.program_overrides()?;
        self.load_shader(backend, vertex.as_deref(), fragment.as_deref())
    }

    /// Bind (`true`) or unbind (`false`) the program
    ///
    /// # Errors
    ///
    /// See [`Self::activate`].
    pub fn set_shader<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        enable: bool,
    ) -> R3dResult<()> {
        if enable {
            self.activate(backend)
        } else {
            self.deactivate(backend);
            Ok(())
        }
    }

    /// Bind the program and reset all cached state to dirty / unset.
    ///
    /// # Errors
    ///
    /// Returns [`R3dError::ProgramUnavailable`] without binding anything if no
    /// program was built successfully.
    pub fn activate<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> R3dResult<()> {
        let Some(program) = self.program else {
            tracing::warn!("R3D activation requested without a usable program");
            return Err(R3dError::ProgramUnavailable);
        };

        backend.use_program(Some(program));
        self.cache.reset();
        self.culling.reset();
        self.stats = UploadStats::default();
        self.active = true;
        tracing::debug!("R3D program {:?} activated", program);
        Ok(())
    }

    /// Unbind the program
    pub fn deactivate<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        backend.use_program(None);
        if self.active && self.report_stats {
            tracing::debug!(
                "R3D stats: {} uploads ({:.2}/mesh), {} skipped, {} state changes, \
                 {} meshes, {} models, {} viewports",
                self.stats.uniform_uploads,
                self.stats.uploads_per_mesh(),
                self.stats.skipped_uploads,
                self.stats.state_changes,
                self.stats.meshes,
                self.stats.models,
                self.stats.viewports
            );
        }
        self.active = false;
    }

    /// Upload the material uniforms of `mesh` that differ from the cache.
    /// `None` is ignored, as is any call while inactive.
    pub fn set_mesh_uniforms<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        mesh: Option<&MeshMaterial>,
    ) {
        if mesh.is_none() || !self.ready("mesh") {
            return;
        }
        let handedness = self.culling.classification();
        let mut writer = UniformWriter {
            backend,
            locations: &self.locations,
            stats: &mut self.stats,
        };
        self.cache.apply_mesh(&mut writer, mesh, handedness);
        self.stats.meshes += 1;
    }

    /// Update face culling for a model from its transform determinant
    pub fn set_model_states<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        determinant: f32,
    ) {
        if !self.ready("model") {
            return;
        }
        let mut writer = UniformWriter {
            backend,
            locations: &self.locations,
            stats: &mut self.stats,
        };
        if let Some(class) = self.culling.apply_model(&mut writer, determinant) {
            self.cache.assume_double_sided(class.is_double_sided());
        }
        self.stats.models += 1;
    }

    /// Push the per-viewport globals, always in full
    pub fn set_viewport_uniforms<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        viewport: &ViewportUniforms,
    ) {
        if !self.ready("viewport") {
            return;
        }
        let mut writer = UniformWriter {
            backend,
            locations: &self.locations,
            stats: &mut self.stats,
        };
        viewport.upload(&mut writer);
        self.stats.viewports += 1;
    }

    /// Draw-sequence calls only reach the backend between activate and deactivate
    fn ready(&self, what: &str) -> bool {
        if !self.active {
            tracing::trace!("Ignoring R3D {} state while inactive", what);
        }
        self.active
    }

    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    pub fn is_loaded(&self) -> bool {
        self.program.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn locations(&self) -> &UniformLocations {
        &self.locations
    }

    pub fn cache(&self) -> &MaterialStateCache {
        &self.cache
    }

    /// Culling classification of the last model, `None` since activation
    pub fn handedness(&self) -> Option<Handedness> {
        self.culling.classification()
    }

    /// Counters since the last activation
    pub fn stats(&self) -> UploadStats {
        self.stats
    }
}

impl Default for R3dShader {
    fn default() -> Self {
        Self::new()
    }
}
