//! Shared test utilities for unit and integration tests

use hashbrown::HashSet;

use crate::backend::{CullFace, ProgramHandle, ProgramSource, RenderBackend};
use crate::error::{R3dError, R3dResult, ShaderStage};
use crate::uniforms::{UniformLocation, UniformName, UniformValue};

/// One call made against a [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    BuildProgram,
    UseProgram(Option<ProgramHandle>),
    Uniform(UniformName, UniformValue),
    StencilTest(bool),
    FaceCulling(bool),
    CullFace(CullFace),
}

impl GpuCall {
    pub fn is_uniform(&self) -> bool {
        matches!(self, GpuCall::Uniform(..))
    }
}

/// Backend that records every call instead of touching a GPU.
///
/// Every [`UniformName`] resolves to a location unless marked missing with
/// [`RecordingBackend::without_uniforms`].
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<GpuCall>,
    missing: HashSet<&'static str>,
    fail_builds: bool,
    built: Vec<ProgramHandle>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose program builds always fail
    pub fn failing() -> Self {
        Self {
            fail_builds: true,
            ..Self::default()
        }
    }

    /// Backend whose programs do not expose `names`
    pub fn without_uniforms(names: &[UniformName]) -> Self {
        Self {
            missing: names.iter().map(|name| name.as_str()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Uniform writes only, in call order
    pub fn uniform_calls(&self) -> Vec<(UniformName, UniformValue)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GpuCall::Uniform(name, value) => Some((*name, *value)),
                _ => None,
            })
            .collect()
    }

    /// Values written to one uniform, in call order
    pub fn uploads_to(&self, name: UniformName) -> Vec<UniformValue> {
        self.uniform_calls()
            .into_iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, value)| value)
            .collect()
    }

    /// Non-uniform state calls (stencil, culling) in call order
    pub fn state_calls(&self) -> Vec<GpuCall> {
        self.calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    GpuCall::StencilTest(_) | GpuCall::FaceCulling(_) | GpuCall::CullFace(_)
                )
            })
            .cloned()
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn build_program(&mut self, _source: &ProgramSource<'_>) -> R3dResult<ProgramHandle> {
        self.calls.push(GpuCall::BuildProgram);
        if self.fail_builds {
            return Err(R3dError::ShaderValidation {
                stage: ShaderStage::Fragment,
                message: "build failure requested by test".to_string(),
            });
        }
        let handle = ProgramHandle(self.built.len() as u32 + 1);
        self.built.push(handle);
        Ok(handle)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if !self.built.contains(&program) || self.missing.contains(name) {
            return None;
        }
        UniformName::ALL
            .iter()
            .position(|n| n.as_str() == name)
            .map(|index| UniformLocation(index as u32))
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.calls.push(GpuCall::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let name = UniformName::ALL[location.0 as usize];
        self.calls.push(GpuCall::Uniform(name, value));
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        self.calls.push(GpuCall::StencilTest(enabled));
    }

    fn set_face_culling(&mut self, enabled: bool) {
        self.calls.push(GpuCall::FaceCulling(enabled));
    }

    fn set_cull_face(&mut self, face: CullFace) {
        self.calls.push(GpuCall::CullFace(face));
    }
}
