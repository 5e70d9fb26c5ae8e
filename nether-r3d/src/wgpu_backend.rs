//! wgpu implementation of [`RenderBackend`]
//!
//! Program build parses and validates each WGSL stage with naga, reflects the
//! named uniforms out of the `R3dUniforms` block, and creates one shader
//! module per stage. Uniform writes land in a CPU staging copy of the block
//! which [`WgpuBackend::flush`] pushes to the GPU once per draw. Stencil and
//! culling switches are tracked in a [`RasterState`] that the caller folds
//! into its pipeline key.

use hashbrown::HashMap;

use crate::backend::{CullFace, ProgramHandle, ProgramSource, RenderBackend};
use crate::error::{R3dError, R3dResult, ShaderStage};
use crate::shading;
use crate::uniforms::{UniformLocation, UniformValue};

/// Locations with this bit set address a texture binding, not a block offset
const TEXTURE_LOCATION_BIT: u32 = 1 << 31;

/// Byte distance between the two rows of a `array<vec3<f32>, 2>` member
const VEC3_ARRAY_STRIDE: usize = 16;

// =============================================================================
// Compilation and reflection
// =============================================================================

/// Parse and validate one WGSL stage.
///
/// # Errors
///
/// [`R3dError::ShaderParse`] or [`R3dError::ShaderValidation`] naming `stage`.
pub fn compile_stage(stage: ShaderStage, source: &str) -> R3dResult<naga::Module> {
    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| R3dError::ShaderParse {
            stage,
            message: e.emit_to_string(source),
        })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| R3dError::ShaderValidation {
            stage,
            message: format!("{:?}", e),
        })?;

    Ok(module)
}

/// Uniform names a built program exposes, and the size of its block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramReflection {
    locations: HashMap<String, UniformLocation>,
    block_size: u32,
}

impl ProgramReflection {
    /// Collect block members and texture bindings from every stage.
    pub fn from_modules(modules: &[&naga::Module]) -> Self {
        let mut reflection = Self::default();

        for module in modules {
            for (_, var) in module.global_variables.iter() {
                let Some(binding) = &var.binding else {
                    continue;
                };

                match var.space {
                    naga::AddressSpace::Uniform
                        if binding.group == shading::UNIFORM_GROUP
                            && binding.binding == shading::UNIFORM_BINDING =>
                    {
                        if let naga::TypeInner::Struct { members, span } =
                            &module.types[var.ty].inner
                        {
                            reflection.block_size = reflection.block_size.max(*span);
                            for member in members {
                                if let Some(name) = &member.name {
                                    reflection
                                        .locations
                                        .insert(name.clone(), UniformLocation(member.offset));
                                }
                            }
                        }
                    }
                    naga::AddressSpace::Handle if binding.group == shading::TEXTURE_GROUP => {
                        if let Some(name) = &var.name {
                            reflection.locations.insert(
                                name.clone(),
                                UniformLocation(TEXTURE_LOCATION_BIT | binding.binding),
                            );
                        }
                    }
                    _ => {}
                }
            }
        }

        reflection
    }

    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied()
    }

    /// Byte size of the `R3dUniforms` block
    pub fn block_size(&self) -> u32 {
        self.block_size
    }
}

// =============================================================================
// Uniform staging
// =============================================================================

/// CPU copy of a program's uniform block plus its texture unit assignments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformStaging {
    bytes: Vec<u8>,
    texture_units: HashMap<u32, i32>,
    dirty: bool,
}

impl UniformStaging {
    pub fn new(block_size: u32) -> Self {
        Self {
            bytes: vec![0; block_size as usize],
            texture_units: HashMap::new(),
            dirty: true,
        }
    }

    /// Store `value` at `location`
    pub fn write(&mut self, location: UniformLocation, value: UniformValue) {
        if location.0 & TEXTURE_LOCATION_BIT != 0 {
            let binding = location.0 & !TEXTURE_LOCATION_BIT;
            match value {
                UniformValue::Int(unit) => {
                    self.texture_units.insert(binding, unit);
                }
                other => tracing::warn!(
                    "Ignoring non-integer value {:?} for texture binding {}",
                    other,
                    binding
                ),
            }
            return;
        }

        let offset = location.0 as usize;
        match value {
            UniformValue::Int(v) => self.put(offset, bytemuck::bytes_of(&v)),
            UniformValue::Bool(v) => self.put(offset, bytemuck::bytes_of(&u32::from(v))),
            UniformValue::Float(v) => self.put(offset, bytemuck::bytes_of(&v)),
            UniformValue::Vec2(v) => self.put(offset, bytemuck::bytes_of(&v)),
            UniformValue::Vec3(v) => self.put(offset, bytemuck::bytes_of(&v)),
            UniformValue::Vec4(v) => self.put(offset, bytemuck::bytes_of(&v)),
            UniformValue::Vec3x2([a, b]) => {
                self.put(offset, bytemuck::bytes_of(&a));
                self.put(offset + VEC3_ARRAY_STRIDE, bytemuck::bytes_of(&b));
            }
        }
    }

    fn put(&mut self, offset: usize, data: &[u8]) {
        let Some(dst) = self.bytes.get_mut(offset..offset + data.len()) else {
            tracing::warn!(
                "Uniform write of {} bytes at offset {} outside {}-byte block",
                data.len(),
                offset,
                self.bytes.len()
            );
            return;
        };
        if dst != data {
            dst.copy_from_slice(data);
            self.dirty = true;
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Texture unit written to the sampler at `binding`
    pub fn texture_unit(&self, binding: u32) -> Option<i32> {
        self.texture_units.get(&binding).copied()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Take the block contents if they changed since the last call
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        if self.dirty {
            self.dirty = false;
            Some(&self.bytes)
        } else {
            None
        }
    }
}

// =============================================================================
// Raster state
// =============================================================================

/// Fixed-function switches the core toggles between draws.
///
/// wgpu bakes these into the pipeline, so the caller selects or creates a
/// pipeline from the current value before each draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RasterState {
    pub culling_enabled: bool,
    pub cull_face: CullFace,
    pub stencil_test: bool,
}

impl RasterState {
    pub fn cull_mode(&self) -> Option<wgpu::Face> {
        self.culling_enabled.then(|| self.cull_face.to_wgpu())
    }

    pub fn primitive_state(&self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: self.cull_mode(),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        }
    }

    /// Layered meshes draw only where the stencil equals the reference value
    pub fn stencil_state(&self) -> wgpu::StencilState {
        let compare = if self.stencil_test {
            wgpu::CompareFunction::Equal
        } else {
            wgpu::CompareFunction::Always
        };
        let face_state = wgpu::StencilFaceState {
            compare,
            fail_op: wgpu::StencilOperation::Keep,
            depth_fail_op: wgpu::StencilOperation::Keep,
            pass_op: wgpu::StencilOperation::Keep,
        };

        wgpu::StencilState {
            front: face_state,
            back: face_state,
            read_mask: 0xFF,
            write_mask: 0x00,
        }
    }
}

// =============================================================================
// Backend
// =============================================================================

/// One built program
pub struct WgpuProgram {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
    pub uniform_buffer: wgpu::Buffer,
    reflection: ProgramReflection,
    staging: UniformStaging,
}

impl WgpuProgram {
    pub fn reflection(&self) -> &ProgramReflection {
        &self.reflection
    }

    pub fn staging(&self) -> &UniformStaging {
        &self.staging
    }
}

/// [`RenderBackend`] over a wgpu device
pub struct WgpuBackend {
    device: wgpu::Device,
    programs: Vec<WgpuProgram>,
    bound: Option<ProgramHandle>,
    raster: RasterState,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device) -> Self {
        Self {
            device,
            programs: Vec::new(),
            bound: None,
            raster: RasterState::default(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn program(&self, handle: ProgramHandle) -> Option<&WgpuProgram> {
        (handle.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.programs.get(index))
    }

    fn program_mut(&mut self, handle: ProgramHandle) -> Option<&mut WgpuProgram> {
        (handle.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.programs.get_mut(index))
    }

    pub fn bound_program(&self) -> Option<&WgpuProgram> {
        self.bound.and_then(|handle| self.program(handle))
    }

    pub fn raster_state(&self) -> RasterState {
        self.raster
    }

    /// Upload the bound program's uniform block if it changed.
    ///
    /// Call once before each draw.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        let Some(handle) = self.bound else {
            return;
        };
        if let Some(program) = self.program_mut(handle)
            && let Some(bytes) = program.staging.take_dirty()
        {
            queue.write_buffer(&program.uniform_buffer, 0, bytes);
        }
    }

    fn create_module(&self, label: &str, source: &str) -> wgpu::ShaderModule {
        self.device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
    }
}

impl RenderBackend for WgpuBackend {
    fn build_program(&mut self, source: &ProgramSource<'_>) -> R3dResult<ProgramHandle> {
        let vertex = compile_stage(ShaderStage::Vertex, &source.vertex)?;
        let fragment = compile_stage(ShaderStage::Fragment, &source.fragment)?;
        let reflection = ProgramReflection::from_modules(&[&vertex, &fragment]);
        let block_size = reflection.block_size();

        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("R3D Uniforms"),
            size: u64::from(block_size),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let program = WgpuProgram {
            vertex: self.create_module("R3D Vertex", &source.vertex),
            fragment: self.create_module("R3D Fragment", &source.fragment),
            uniform_buffer,
            staging: UniformStaging::new(block_size),
            reflection,
        };

        self.programs.push(program);
        let handle = ProgramHandle(self.programs.len() as u32);
        tracing::debug!(
            "Created R3D shader modules for {:?} ({}-byte uniform block)",
            handle,
            block_size
        );
        Ok(handle)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.program(program)?.reflection.location(name)
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.bound = program;
        if let Some(program) = program.and_then(|handle| self.program_mut(handle)) {
            // a rebind may follow a buffer rebuild by the caller
            program.staging.dirty = true;
        }
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(handle) = self.bound else {
            tracing::trace!("Uniform write with no program bound");
            return;
        };
        if let Some(program) = self.program_mut(handle) {
            program.staging.write(location, value);
        }
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        self.raster.stencil_test = enabled;
    }

    fn set_face_culling(&mut self, enabled: bool) {
        self.raster.culling_enabled = enabled;
    }

    fn set_cull_face(&mut self, face: CullFace) {
        self.raster.cull_face = face;
    }
}
