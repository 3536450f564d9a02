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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The fixed operation set the terrain and shader layers need from a graphics API.
///
/// Implementations are expected to be bound to the thread that owns the graphics
/// context, so no `Send`/`Sync` bound is imposed. Every resource created through
/// the device is referenced by an opaque id and must be released through the
/// matching `destroy_*` call.
pub trait GraphicsDevice: Debug {
    /// Creates a GPU buffer and uploads `data` into it.
    /// ## Arguments
    /// * `descriptor` - The binding target and usage hint of the buffer.
    /// * `data` - The initial contents, as raw bytes.
    /// ## Returns
    /// A `Result` containing the ID of the created buffer or an error if the creation fails.
    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Destroys a GPU buffer.
    /// ## Errors
    /// * `ResourceError::NotFound` - If no buffer exists with this ID.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Creates a vertex array object recording the buffer bindings and attribute
    /// layout described by `descriptor`.
    /// ## Returns
    /// A `Result` containing the ID of the created vertex array or an error if the creation fails.
    fn create_vertex_array(
        &self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<VertexArrayId, ResourceError>;

    /// Destroys a vertex array object.
    fn destroy_vertex_array(&self, id: VertexArrayId) -> Result<(), ResourceError>;

    /// Creates a shader stage object from source and compiles it.
    ///
    /// A compilation failure is *not* an error here: the stage object is still
    /// created and its diagnostics are available through [`Self::shader_module_status`].
    /// ## Errors
    /// * `ResourceError::BackendError` - If the stage object itself cannot be created.
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError>;

    /// Returns the compile status and info log of a shader stage.
    fn shader_module_status(&self, id: ShaderModuleId)
        -> Result<ShaderCompileResult, ResourceError>;

    /// Destroys a shader stage object. Stages already linked into a program stay
    /// alive inside it.
    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError>;

    /// Creates a program, attaches every module in `modules` and links it.
    ///
    /// As with compilation, a link failure still yields a program; check
    /// [`Self::program_link_status`].
    fn create_program(&self, modules: &[ShaderModuleId]) -> Result<ProgramId, ResourceError>;

    /// Returns the link status and info log of a program.
    fn program_link_status(&self, id: ProgramId) -> Result<ShaderCompileResult, ResourceError>;

    /// Destroys a program.
    fn destroy_program(&self, id: ProgramId) -> Result<(), ResourceError>;

    /// Makes `program` current for subsequent draw calls, or unbinds any program when `None`.
    fn use_program(&self, program: Option<ProgramId>) -> Result<(), ResourceError>;

    /// Looks up the uniform `name` in `program` and uploads `value` to it.
    ///
    /// The lookup happens on every call. A name the program does not declare is
    /// silently ignored and reported as success.
    fn set_uniform(
        &self,
        program: ProgramId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError>;

    /// Creates a 2D texture from tightly packed pixel data.
    /// ## Errors
    /// * `ResourceError::InvalidDescriptor` - If `pixels` does not match the described size.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        pixels: &[u8],
    ) -> Result<TextureId, ResourceError>;

    /// Destroys a texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Activates texture unit `unit` and binds `texture` to it.
    fn bind_texture(&self, unit: u32, texture: TextureId) -> Result<(), ResourceError>;

    /// Binds `vertex_array`, draws `index_count` indices from its index buffer
    /// with the given topology, then unbinds it.
    fn draw_indexed(
        &self,
        vertex_array: VertexArrayId,
        topology: PrimitiveTopology,
        index_format: IndexFormat,
        index_count: u32,
    ) -> Result<(), ResourceError>;
}
