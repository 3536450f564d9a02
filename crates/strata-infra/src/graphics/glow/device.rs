// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cell::{Cell, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;

use glow::HasContext;

use strata_core::renderer::api::{
    truncate_info_log, BufferDescriptor, BufferId, BufferTarget, IndexFormat, PrimitiveTopology, ProgramId,
    ShaderCompileResult, ShaderModuleDescriptor, ShaderModuleId, ShaderStage, TextureDescriptor,
    TextureId, UniformValue, VertexArrayDescriptor, VertexArrayId,
};
use strata_core::renderer::{GraphicsDevice, ResourceError, ShaderError};

use super::conversions::IntoGl;

type GlBuffer = <glow::Context as HasContext>::Buffer;
type GlVertexArray = <glow::Context as HasContext>::VertexArray;
type GlShader = <glow::Context as HasContext>::Shader;
type GlProgram = <glow::Context as HasContext>::Program;
type GlTexture = <glow::Context as HasContext>::Texture;

/// Binding point used to upload buffer contents.
///
/// Neither `ARRAY_BUFFER` nor `ELEMENT_ARRAY_BUFFER`: the element binding is
/// vertex-array state, so it is only ever touched inside `create_vertex_array`.
const UPLOAD_TARGET: u32 = glow::COPY_WRITE_BUFFER;

#[derive(Debug)]
struct GlBufferEntry {
    buffer: GlBuffer,
    target: BufferTarget,
    size: usize,
}

#[derive(Debug)]
struct GlShaderEntry {
    shader: GlShader,
    stage: ShaderStage,
    status: ShaderCompileResult,
}

#[derive(Debug)]
struct GlProgramEntry {
    program: GlProgram,
    status: ShaderCompileResult,
}

#[derive(Debug)]
struct GlTextureEntry {
    texture: GlTexture,
    width: u32,
    height: u32,
}

/// An OpenGL implementation of [`GraphicsDevice`].
///
/// Every GL object is kept in a registry keyed by the opaque id handed out to
/// the caller, so a stale or foreign id is reported as
/// [`ResourceError::NotFound`] instead of reaching the driver.
///
/// The device lives on the thread that owns the GL context, so its
/// registries use `RefCell` and it is neither `Send` nor `Sync`.
pub struct GlowDevice {
    gl: glow::Context,

    buffers: RefCell<HashMap<BufferId, GlBufferEntry>>,
    vertex_arrays: RefCell<HashMap<VertexArrayId, GlVertexArray>>,
    shader_modules: RefCell<HashMap<ShaderModuleId, GlShaderEntry>>,
    programs: RefCell<HashMap<ProgramId, GlProgramEntry>>,
    textures: RefCell<HashMap<TextureId, GlTextureEntry>>,

    next_buffer_id: Cell<usize>,
    next_vertex_array_id: Cell<usize>,
    next_shader_id: Cell<usize>,
    next_program_id: Cell<usize>,
    next_texture_id: Cell<usize>,
}

impl fmt::Debug for GlowDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowDevice")
            .field("next_buffer_id", &self.next_buffer_id)
            .field("next_program_id", &self.next_program_id)
            .field("next_texture_id", &self.next_texture_id)
            .finish_non_exhaustive()
    }
}

fn registry<'a, T>(cell: &'a RefCell<T>, name: &str) -> Result<RefMut<'a, T>, ResourceError> {
    cell.try_borrow_mut().map_err(|e| {
        ResourceError::BackendError(format!("Registry already borrowed ({name}): {e}"))
    })
}

fn next_id(counter: &Cell<usize>) -> usize {
    let id = counter.get();
    counter.set(id + 1);
    id
}

/// Checks that a buffer bound into a vertex array was created for that binding.
fn check_binding(
    id: BufferId,
    expected: BufferTarget,
    actual: BufferTarget,
) -> Result<(), ResourceError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ResourceError::InvalidDescriptor(format!(
            "buffer {id:?} was created as {actual:?} but is bound as {expected:?}"
        )))
    }
}

impl GlowDevice {
    /// Wraps a GL context whose function pointers are already loaded.
    pub fn new(gl: glow::Context) -> Self {
        Self {
            gl,
            buffers: RefCell::new(HashMap::new()),
            vertex_arrays: RefCell::new(HashMap::new()),
            shader_modules: RefCell::new(HashMap::new()),
            programs: RefCell::new(HashMap::new()),
            textures: RefCell::new(HashMap::new()),
            next_buffer_id: Cell::new(0),
            next_vertex_array_id: Cell::new(0),
            next_shader_id: Cell::new(0),
            next_program_id: Cell::new(0),
            next_texture_id: Cell::new(0),
        }
    }

    /// The underlying context, for callers that issue their own GL commands
    /// (clearing, viewport, view/projection uniforms...).
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    // --- ID Generation Helpers ---

    fn generate_buffer_id(&self) -> BufferId {
        BufferId(next_id(&self.next_buffer_id))
    }

    fn generate_vertex_array_id(&self) -> VertexArrayId {
        VertexArrayId(next_id(&self.next_vertex_array_id))
    }

    fn generate_shader_id(&self) -> ShaderModuleId {
        ShaderModuleId(next_id(&self.next_shader_id))
    }

    fn generate_program_id(&self) -> ProgramId {
        ProgramId(next_id(&self.next_program_id))
    }

    fn generate_texture_id(&self) -> TextureId {
        TextureId(next_id(&self.next_texture_id))
    }

    fn buffer(&self, id: BufferId) -> Result<(GlBuffer, BufferTarget), ResourceError> {
        registry(&self.buffers, "buffers")?
            .get(&id)
            .map(|entry| (entry.buffer, entry.target))
            .ok_or(ResourceError::NotFound)
    }

    fn program(&self, id: ProgramId) -> Result<GlProgram, ResourceError> {
        registry(&self.programs, "programs")?
            .get(&id)
            .map(|entry| entry.program)
            .ok_or(ResourceError::NotFound)
    }
}

impl GraphicsDevice for GlowDevice {
    // --- Buffer Operations ---

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let buffer = unsafe {
            let buffer = self
                .gl
                .create_buffer()
                .map_err(ResourceError::BackendError)?;
            self.gl.bind_buffer(UPLOAD_TARGET, Some(buffer));
            self.gl
                .buffer_data_u8_slice(UPLOAD_TARGET, data, descriptor.usage.into_gl());
            self.gl.bind_buffer(UPLOAD_TARGET, None);
            buffer
        };

        let id = self.generate_buffer_id();
        registry(&self.buffers, "buffers")?.insert(
            id,
            GlBufferEntry {
                buffer,
                target: descriptor.target,
                size: data.len(),
            },
        );
        log::debug!(
            "GlowDevice: Created buffer {:?} ({:?}, {} bytes) with ID: {:?}",
            descriptor.label.as_deref().unwrap_or_default(),
            descriptor.target,
            data.len(),
            id
        );
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let entry = registry(&self.buffers, "buffers")?
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        unsafe { self.gl.delete_buffer(entry.buffer) };
        log::debug!(
            "GlowDevice: Destroyed buffer {:?} ({} bytes)",
            id,
            entry.size
        );
        Ok(())
    }

    // --- Vertex Array Operations ---

    fn create_vertex_array(
        &self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<VertexArrayId, ResourceError> {
        let (vertex_buffer, target) = self.buffer(descriptor.vertex_buffer)?;
        check_binding(descriptor.vertex_buffer, BufferTarget::Vertex, target)?;
        let index_buffer = match descriptor.index_buffer {
            Some(id) => {
                let (buffer, target) = self.buffer(id)?;
                check_binding(id, BufferTarget::Index, target)?;
                Some(buffer)
            }
            None => None,
        };

        let vertex_array = unsafe {
            let vertex_array = self
                .gl
                .create_vertex_array()
                .map_err(ResourceError::BackendError)?;
            self.gl.bind_vertex_array(Some(vertex_array));
            self.gl
                .bind_buffer(BufferTarget::Vertex.into_gl(), Some(vertex_buffer));
            if let Some(index_buffer) = index_buffer {
                self.gl
                    .bind_buffer(BufferTarget::Index.into_gl(), Some(index_buffer));
            }

            for attribute in descriptor.attributes.iter() {
                self.gl.vertex_attrib_pointer_f32(
                    attribute.location,
                    attribute.format.components() as i32,
                    attribute.format.into_gl(),
                    false,
                    descriptor.stride as i32,
                    attribute.offset as i32,
                );
                self.gl.enable_vertex_attrib_array(attribute.location);
            }

            // The element binding is VAO state: unbind the VAO first.
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(BufferTarget::Vertex.into_gl(), None);
            vertex_array
        };

        let id = self.generate_vertex_array_id();
        registry(&self.vertex_arrays, "vertex_arrays")?.insert(id, vertex_array);
        log::debug!(
            "GlowDevice: Created vertex array {:?} with {} attribute(s), ID: {:?}",
            descriptor.label.as_deref().unwrap_or_default(),
            descriptor.attributes.len(),
            id
        );
        Ok(id)
    }

    fn destroy_vertex_array(&self, id: VertexArrayId) -> Result<(), ResourceError> {
        let vertex_array = registry(&self.vertex_arrays, "vertex_arrays")?
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        unsafe { self.gl.delete_vertex_array(vertex_array) };
        log::debug!("GlowDevice: Destroyed vertex array with ID: {id:?}");
        Ok(())
    }

    // --- Shader Operations ---

    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let (shader, status) = unsafe {
            let shader = self
                .gl
                .create_shader(descriptor.stage.into_gl())
                .map_err(ResourceError::BackendError)?;
            self.gl.shader_source(shader, &descriptor.source);
            self.gl.compile_shader(shader);

            let status = if self.gl.get_shader_compile_status(shader) {
                ShaderCompileResult::ok()
            } else {
                ShaderCompileResult::failed(truncate_info_log(
                    &self.gl.get_shader_info_log(shader),
                ))
            };
            (shader, status)
        };

        let id = self.generate_shader_id();
        log::debug!(
            "GlowDevice: Compiled {} shader {:?} (success: {}) with ID: {:?}",
            descriptor.stage,
            descriptor.label.unwrap_or_default(),
            status.success,
            id
        );
        registry(&self.shader_modules, "shader_modules")?.insert(
            id,
            GlShaderEntry {
                shader,
                stage: descriptor.stage,
                status,
            },
        );
        Ok(id)
    }

    fn shader_module_status(
        &self,
        id: ShaderModuleId,
    ) -> Result<ShaderCompileResult, ResourceError> {
        registry(&self.shader_modules, "shader_modules")?
            .get(&id)
            .map(|entry| entry.status.clone())
            .ok_or_else(|| ShaderError::NotFound { id }.into())
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        let entry = registry(&self.shader_modules, "shader_modules")?
            .remove(&id)
            .ok_or(ShaderError::NotFound { id })?;
        unsafe { self.gl.delete_shader(entry.shader) };
        log::debug!(
            "GlowDevice: Destroyed {} shader module with ID: {:?}",
            entry.stage,
            id
        );
        Ok(())
    }

    fn create_program(&self, modules: &[ShaderModuleId]) -> Result<ProgramId, ResourceError> {
        let shaders = {
            let modules_guard = registry(&self.shader_modules, "shader_modules")?;
            modules
                .iter()
                .map(|&id| {
                    modules_guard
                        .get(&id)
                        .map(|entry| entry.shader)
                        .ok_or(ShaderError::NotFound { id })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let (program, status) = unsafe {
            let program = self
                .gl
                .create_program()
                .map_err(ResourceError::BackendError)?;
            for &shader in &shaders {
                self.gl.attach_shader(program, shader);
            }
            self.gl.link_program(program);

            let status = if self.gl.get_program_link_status(program) {
                ShaderCompileResult::ok()
            } else {
                ShaderCompileResult::failed(truncate_info_log(
                    &self.gl.get_program_info_log(program),
                ))
            };
            for &shader in &shaders {
                self.gl.detach_shader(program, shader);
            }
            (program, status)
        };

        let id = self.generate_program_id();
        log::debug!(
            "GlowDevice: Linked program from {} stage(s) (success: {}) with ID: {:?}",
            shaders.len(),
            status.success,
            id
        );
        registry(&self.programs, "programs")?.insert(id, GlProgramEntry { program, status });
        Ok(id)
    }

    fn program_link_status(&self, id: ProgramId) -> Result<ShaderCompileResult, ResourceError> {
        registry(&self.programs, "programs")?
            .get(&id)
            .map(|entry| entry.status.clone())
            .ok_or(ResourceError::NotFound)
    }

    fn destroy_program(&self, id: ProgramId) -> Result<(), ResourceError> {
        let entry = registry(&self.programs, "programs")?
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        unsafe { self.gl.delete_program(entry.program) };
        log::debug!("GlowDevice: Destroyed program with ID: {id:?}");
        Ok(())
    }

    fn use_program(&self, program: Option<ProgramId>) -> Result<(), ResourceError> {
        let program = program.map(|id| self.program(id)).transpose()?;
        unsafe { self.gl.use_program(program) };
        Ok(())
    }

    /// Uploads to the program currently bound with [`GraphicsDevice::use_program`];
    /// `program` only serves the location lookup.
    fn set_uniform(
        &self,
        program: ProgramId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError> {
        let gl_program = self.program(program)?;
        let Some(location) = (unsafe { self.gl.get_uniform_location(gl_program, name) }) else {
            log::trace!("GlowDevice: Program {program:?} has no active uniform '{name}'");
            return Ok(());
        };

        unsafe {
            match value {
                UniformValue::Bool(v) => self.gl.uniform_1_i32(Some(&location), v as i32),
                UniformValue::Int(v) => self.gl.uniform_1_i32(Some(&location), v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(Some(&location), v),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(Some(&location), x, y, z),
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(Some(&location), false, &m)
                }
            }
        }
        Ok(())
    }

    // --- Texture Operations ---

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        pixels: &[u8],
    ) -> Result<TextureId, ResourceError> {
        let expected = descriptor.width as usize
            * descriptor.height as usize
            * descriptor.format.bytes_per_pixel() as usize;
        if pixels.len() != expected {
            return Err(ResourceError::InvalidDescriptor(format!(
                "texture {:?} expects {expected} bytes of pixel data, got {}",
                descriptor.label.as_deref().unwrap_or_default(),
                pixels.len()
            )));
        }
        let width = i32::try_from(descriptor.width)
            .map_err(|_| ResourceError::InvalidDescriptor("texture too wide".to_owned()))?;
        let height = i32::try_from(descriptor.height)
            .map_err(|_| ResourceError::InvalidDescriptor("texture too tall".to_owned()))?;
        let (internal_format, format, ty) = descriptor.format.into_gl();

        let texture = unsafe {
            let texture = self
                .gl
                .create_texture()
                .map_err(ResourceError::BackendError)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            self.gl.generate_mipmap(glow::TEXTURE_2D);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };

        let id = self.generate_texture_id();
        registry(&self.textures, "textures")?.insert(
            id,
            GlTextureEntry {
                texture,
                width: descriptor.width,
                height: descriptor.height,
            },
        );
        log::debug!(
            "GlowDevice: Created texture {:?} ({}x{}) with ID: {:?}",
            descriptor.label.as_deref().unwrap_or_default(),
            descriptor.width,
            descriptor.height,
            id
        );
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let entry = registry(&self.textures, "textures")?
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        unsafe { self.gl.delete_texture(entry.texture) };
        log::debug!(
            "GlowDevice: Destroyed texture {:?} ({}x{})",
            id,
            entry.width,
            entry.height
        );
        Ok(())
    }

    fn bind_texture(&self, unit: u32, texture: TextureId) -> Result<(), ResourceError> {
        let texture = registry(&self.textures, "textures")?
            .get(&texture)
            .map(|entry| entry.texture)
            .ok_or(ResourceError::NotFound)?;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
        Ok(())
    }

    // --- Drawing ---

    fn draw_indexed(
        &self,
        vertex_array: VertexArrayId,
        topology: PrimitiveTopology,
        index_format: IndexFormat,
        index_count: u32,
    ) -> Result<(), ResourceError> {
        let vao = registry(&self.vertex_arrays, "vertex_arrays")?
            .get(&vertex_array)
            .copied()
            .ok_or(ResourceError::NotFound)?;
        let count = i32::try_from(index_count).map_err(|_| {
            ResourceError::InvalidDescriptor(format!("index count {index_count} exceeds i32"))
        })?;

        unsafe {
            self.gl.bind_vertex_array(Some(vao));
            self.gl
                .draw_elements(topology.into_gl(), count, index_format.into_gl(), 0);
            self.gl.bind_vertex_array(None);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploads_never_touch_vertex_array_state() {
        assert_ne!(UPLOAD_TARGET, BufferTarget::Index.into_gl());
        assert_ne!(UPLOAD_TARGET, glow::ELEMENT_ARRAY_BUFFER);
    }

    #[test]
    fn test_buffers_are_bound_only_where_they_were_created_for() {
        let id = BufferId(3);
        assert!(check_binding(id, BufferTarget::Index, BufferTarget::Index).is_ok());
        assert!(check_binding(id, BufferTarget::Vertex, BufferTarget::Vertex).is_ok());
        assert!(matches!(
            check_binding(id, BufferTarget::Index, BufferTarget::Vertex),
            Err(ResourceError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_ids_are_sequential() {
        let counter = Cell::new(0);
        assert_eq!(next_id(&counter), 0);
        assert_eq!(next_id(&counter), 1);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_reentrant_registry_access_is_a_backend_error() {
        let cell = RefCell::new(HashMap::<BufferId, usize>::new());
        let _held = registry(&cell, "buffers").unwrap();
        assert!(matches!(
            registry(&cell, "buffers"),
            Err(ResourceError::BackendError(_))
        ));
    }
}
