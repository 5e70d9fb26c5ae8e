//! Integration tests for the R3D draw sequence
//!
//! Exercises activation, viewport, model and mesh calls together against a
//! recording backend, and program loading through config overrides.


pub(crate) mod test_utils {
    use tracing_subscriber::EnvFilter;

    use crate::backend::{ProgramHandle, ProgramSource, RenderBackend};
    use crate::error::{R3dResult, ShaderStage};
    use crate::material::MeshMaterial;
    use crate::test_utils::RecordingBackend;
    use crate::uniforms::UniformLocation;
    use crate::wgpu_backend::compile_stage;

    /// Route `tracing` output to the test harness
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }

    /// Recording backend that compiles both stages with naga before building
    pub struct ValidatingBackend {
        pub inner: RecordingBackend,
    }

    impl ValidatingBackend {
        pub fn new() -> Self {
            Self {
                inner: RecordingBackend::new(),
            }
        }
    }

    impl RenderBackend for ValidatingBackend {
        fn build_program(&mut self, source: &ProgramSource<'_>) -> R3dResult<ProgramHandle> {
            compile_stage(ShaderStage::Vertex, &source.vertex)?;
            compile_stage(ShaderStage::Fragment, &source.fragment)?;
            self.inner.build_program(source)
        }

        fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
            self.inner.uniform_location(program, name)
        }

        fn use_program(&mut self, program: Option<ProgramHandle>) {
            self.inner.use_program(program);
        }

        fn set_uniform(&mut self, location: UniformLocation, value: crate::UniformValue) {
            self.inner.set_uniform(location, value);
        }

        fn set_stencil_test(&mut self, enabled: bool) {
            self.inner.set_stencil_test(enabled);
        }

        fn set_face_culling(&mut self, enabled: bool) {
            self.inner.set_face_culling(enabled);
        }

        fn set_cull_face(&mut self, face: crate::CullFace) {
            self.inner.set_cull_face(face);
        }
    }

    /// Textured, lit, single-sided mesh
    pub fn brick_wall() -> MeshMaterial {
        MeshMaterial {
            textured: true,
            micro_texture: true,
            micro_texture_scale: 4.0,
            width: 256,
            height: 256,
            inverted: false,
            alpha_test: false,
            texture_alpha: false,
            fog_intensity: 1.0,
            lighting: true,
            shininess: 1.0,
            specular_coefficient: 0.5,
            layered: false,
            double_sided: false,
        }
    }

    /// Untextured, luminous, double-sided decal on the stencil layer
    pub fn glow_decal() -> MeshMaterial {
        MeshMaterial {
            textured: false,
            micro_texture: false,
            micro_texture_scale: 4.0,
            width: 64,
            height: 64,
            inverted: false,
            alpha_test: true,
            texture_alpha: true,
            fog_intensity: 0.0,
            lighting: false,
            shininess: 0.0,
            specular_coefficient: 0.0,
            layered: true,
            double_sided: true,
        }
    }
}
