use super::*;
use crate::backend::ProgramHandle;
use crate::stats::UploadStats;
use crate::test_utils::{GpuCall, RecordingBackend};
use crate::uniforms::UniformLocations;

struct Harness {
    backend: RecordingBackend,
    locations: UniformLocations,
    stats: UploadStats,
    cache: MaterialStateCache,
}

impl Harness {
    fn new() -> Self {
        Self::with_backend(RecordingBackend::new())
    }

    fn with_backend(mut backend: RecordingBackend) -> Self {
        let program = backend
            .build_program(&crate::backend::ProgramSource::default())
            .unwrap();
        assert_eq!(program, ProgramHandle(1));
        let locations = UniformLocations::resolve(&backend, program);
        backend.clear();
        Self {
            backend,
            locations,
            stats: UploadStats::default(),
            cache: MaterialStateCache::new(),
        }
    }

    fn apply(&mut self, mesh: Option<&MeshMaterial>, handedness: Option<Handedness>) {
        let mut writer = UniformWriter {
            backend: &mut self.backend,
            locations: &self.locations,
            stats: &mut self.stats,
        };
        self.cache.apply_mesh(&mut writer, mesh, handedness);
    }

    fn apply_mesh(&mut self, mesh: &MeshMaterial) {
        self.apply(Some(mesh), None);
    }
}

fn sample_mesh() -> MeshMaterial {
    MeshMaterial {
        textured: true,
        micro_texture: true,
        micro_texture_scale: 2.0,
        width: 128,
        height: 64,
        inverted: false,
        alpha_test: true,
        texture_alpha: true,
        fog_intensity: 0.5,
        lighting: true,
        shininess: 2.0,
        specular_coefficient: 0.25,
        layered: false,
        double_sided: false,
    }
}

#[test]
fn test_first_apply_uploads_everything() {
    let mut h = Harness::new();
    h.apply_mesh(&sample_mesh());

    let names: Vec<UniformName> = h.backend.uniform_calls().iter().map(|(n, _)| *n).collect();
    assert_eq!(
        names,
        vec![
            UniformName::Tex1,
            UniformName::Tex2,
            UniformName::TextureEnabled,
            UniformName::MicroTexture,
            UniformName::MicroTextureScale,
            UniformName::BaseTexSize,
            UniformName::TextureInverted,
            UniformName::AlphaTest,
            UniformName::TextureAlpha,
            UniformName::FogIntensity,
            UniformName::LightEnable,
            UniformName::Shininess,
            UniformName::SpecularCoefficient,
        ]
    );
    assert_eq!(
        h.backend.state_calls(),
        vec![GpuCall::StencilTest(false), GpuCall::FaceCulling(true)]
    );
    assert!(!h.cache.is_dirty());
}

#[test]
fn test_dirty_apply_uploads_base_size_even_without_micro_texture() {
    let mut h = Harness::new();
    let mesh = MeshMaterial {
        micro_texture: false,
        width: 32,
        height: 16,
        ..sample_mesh()
    };
    h.apply_mesh(&mesh);
    assert_eq!(
        h.backend.uploads_to(UniformName::BaseTexSize),
        vec![UniformValue::Vec2(Vec2::new(32.0, 16.0))]
    );
}

#[test]
fn test_identical_mesh_uploads_nothing() {
    let mut h = Harness::new();
    let mesh = sample_mesh();
    h.apply_mesh(&mesh);
    h.backend.clear();

    h.apply_mesh(&mesh);
    assert!(h.backend.calls().is_empty());
}

#[test]
fn test_single_field_change_uploads_only_that_field() {
    let mut h = Harness::new();
    let a = sample_mesh();
    h.apply_mesh(&a);
    h.backend.clear();

    let b = MeshMaterial {
        fog_intensity: 0.75,
        ..a
    };
    h.apply_mesh(&b);
    assert_eq!(
        h.backend.calls(),
        &[GpuCall::Uniform(
            UniformName::FogIntensity,
            UniformValue::Float(0.75)
        )]
    );
}

#[test]
fn test_float_fields_use_exact_equality() {
    let mut h = Harness::new();
    let a = sample_mesh();
    h.apply_mesh(&a);
    h.backend.clear();

    let b = MeshMaterial {
        micro_texture_scale: a.micro_texture_scale + f32::EPSILON * 2.0,
        ..a
    };
    h.apply_mesh(&b);
    assert_eq!(h.backend.uploads_to(UniformName::MicroTextureScale).len(), 1);
}

#[test]
fn test_shininess_uploads_transformed_value() {
    let mut h = Harness::new();
    h.apply_mesh(&MeshMaterial {
        shininess: 2.0,
        ..sample_mesh()
    });
    assert_eq!(
        h.backend.uploads_to(UniformName::Shininess),
        vec![UniformValue::Float(12.0)]
    );

    // the raw value is what gets compared
    h.backend.clear();
    h.apply_mesh(&MeshMaterial {
        shininess: 2.0,
        ..sample_mesh()
    });
    assert!(h.backend.uploads_to(UniformName::Shininess).is_empty());
}

#[test]
fn test_base_size_skipped_while_micro_texture_off() {
    let mut h = Harness::new();
    let off = MeshMaterial {
        micro_texture: false,
        ..sample_mesh()
    };
    h.apply_mesh(&off);
    h.backend.clear();

    h.apply_mesh(&MeshMaterial {
        width: 512,
        height: 512,
        ..off
    });
    assert!(h.backend.uploads_to(UniformName::BaseTexSize).is_empty());
    assert_eq!(h.cache.base_tex_size(), Some([128, 64]));
}

#[test]
fn test_base_size_uploaded_when_micro_texture_resumes_with_new_size() {
    let mut h = Harness::new();
    let off = MeshMaterial {
        micro_texture: false,
        ..sample_mesh()
    };
    h.apply_mesh(&off);
    h.apply_mesh(&MeshMaterial {
        width: 512,
        height: 256,
        ..off
    });
    h.backend.clear();

    h.apply_mesh(&MeshMaterial {
        micro_texture: true,
        width: 512,
        height: 256,
        ..off
    });
    assert_eq!(
        h.backend.uploads_to(UniformName::BaseTexSize),
        vec![UniformValue::Vec2(Vec2::new(512.0, 256.0))]
    );
    assert_eq!(h.cache.base_tex_size(), Some([512, 256]));
}

#[test]
fn test_base_size_not_reuploaded_when_micro_texture_resumes_with_same_size() {
    let mut h = Harness::new();
    let on = sample_mesh();
    h.apply_mesh(&on);
    h.apply_mesh(&MeshMaterial {
        micro_texture: false,
        ..on
    });
    h.backend.clear();

    h.apply_mesh(&on);
    assert_eq!(
        h.backend.uniform_calls(),
        vec![(UniformName::MicroTexture, UniformValue::Bool(true))]
    );
}

#[test]
fn test_layered_toggles_stencil() {
    let mut h = Harness::new();
    let a = sample_mesh();
    h.apply_mesh(&a);
    h.backend.clear();

    h.apply_mesh(&MeshMaterial { layered: true, ..a });
    assert_eq!(h.backend.calls(), &[GpuCall::StencilTest(true)]);

    h.backend.clear();
    h.apply_mesh(&a);
    assert_eq!(h.backend.calls(), &[GpuCall::StencilTest(false)]);
}

#[test]
fn test_double_sided_toggles_culling() {
    let mut h = Harness::new();
    let a = sample_mesh();
    h.apply(Some(&a), Some(Handedness::Positive));
    h.backend.clear();

    h.apply(
        Some(&MeshMaterial {
            double_sided: true,
            ..a
        }),
        Some(Handedness::Positive),
    );
    assert_eq!(h.backend.calls(), &[GpuCall::FaceCulling(false)]);
    assert_eq!(h.cache.double_sided(), Some(true));
}

#[test]
fn test_degenerate_model_ignores_double_sided_flag() {
    let mut h = Harness::new();
    h.cache.assume_double_sided(true);
    h.apply(Some(&sample_mesh()), Some(Handedness::Degenerate));

    assert_eq!(h.backend.state_calls(), vec![GpuCall::StencilTest(false)]);
    assert_eq!(h.cache.double_sided(), Some(true));
}

#[test]
fn test_none_mesh_is_noop() {
    let mut h = Harness::new();
    h.apply(None, None);
    assert!(h.backend.calls().is_empty());
    assert!(h.cache.is_dirty());
}

#[test]
fn test_reset_forces_full_reapply() {
    let mut h = Harness::new();
    let mesh = sample_mesh();
    h.apply_mesh(&mesh);
    let first = h.backend.calls().to_vec();

    h.cache.reset();
    assert!(h.cache.is_dirty());
    assert!(h.cache.snapshot().is_none());
    h.backend.clear();

    h.apply_mesh(&mesh);
    assert_eq!(h.backend.calls(), first.as_slice());
}

#[test]
fn test_cache_mirrors_last_descriptor() {
    let mut h = Harness::new();
    let a = sample_mesh();
    let b = MeshMaterial {
        textured: false,
        inverted: true,
        fog_intensity: 1.0,
        lighting: false,
        shininess: 7.0,
        specular_coefficient: 0.0,
        layered: true,
        double_sided: true,
        ..a
    };
    h.apply_mesh(&a);
    h.apply_mesh(&b);
    assert_eq!(h.cache.snapshot(), Some(b));
}

#[test]
fn test_absent_locations_are_skipped() {
    let mut h = Harness::with_backend(RecordingBackend::without_uniforms(&[
        UniformName::FogIntensity,
        UniformName::Tex2,
    ]));
    h.apply_mesh(&sample_mesh());

    assert!(h.backend.uploads_to(UniformName::FogIntensity).is_empty());
    assert!(h.backend.uploads_to(UniformName::Tex2).is_empty());
    assert_eq!(h.stats.skipped_uploads, 2);
    assert_eq!(h.stats.uniform_uploads, 11);
}

#[test]
fn test_cached_tri_state() {
    let mut slot: Cached<f32> = Cached::default();
    assert!(slot.is_unset());
    assert!(slot.differs(0.0));
    assert!(refresh(false, &mut slot, 1.0));
    assert!(!refresh(false, &mut slot, 1.0));
    assert!(refresh(true, &mut slot, 1.0));
    assert_eq!(slot.get(), Some(1.0));
}
