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

//! An in-memory `GraphicsDevice` that records every call and mimics the GL
//! behaviors the terrain and shader layers depend on.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use strata_core::renderer::api::*;
use strata_core::renderer::{GraphicsDevice, ResourceError, ShaderError};

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBuffer {
        id: BufferId,
        target: BufferTarget,
        usage: BufferUsage,
        bytes: Vec<u8>,
    },
    DestroyBuffer(BufferId),
    CreateVertexArray {
        id: VertexArrayId,
        vertex_buffer: BufferId,
        index_buffer: Option<BufferId>,
        stride: u32,
        attributes: Vec<VertexAttribute>,
    },
    DestroyVertexArray(VertexArrayId),
    CreateShaderModule {
        id: ShaderModuleId,
        stage: ShaderStage,
    },
    DestroyShaderModule(ShaderModuleId),
    CreateProgram {
        id: ProgramId,
        modules: Vec<ShaderModuleId>,
    },
    DestroyProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    SetUniform {
        program: ProgramId,
        name: String,
        value: UniformValue,
    },
    CreateTexture {
        id: TextureId,
        width: u32,
        height: u32,
    },
    DestroyTexture(TextureId),
    BindTexture {
        unit: u32,
        texture: TextureId,
    },
    DrawIndexed {
        vertex_array: VertexArrayId,
        topology: PrimitiveTopology,
        index_format: IndexFormat,
        count: u32,
    },
}

#[derive(Debug)]
struct Module {
    stage: ShaderStage,
    status: ShaderCompileResult,
    uniforms: HashSet<String>,
}

#[derive(Debug)]
struct Program {
    status: ShaderCompileResult,
    uniforms: HashSet<String>,
    values: HashMap<String, UniformValue>,
}

#[derive(Debug, Default)]
struct State {
    next_id: usize,
    calls: Vec<Call>,
    buffers: HashSet<BufferId>,
    vertex_arrays: HashSet<VertexArrayId>,
    modules: HashMap<ShaderModuleId, Module>,
    programs: HashMap<ProgramId, Program>,
    textures: HashSet<TextureId>,
    fail_vertex_arrays: bool,
}

impl State {
    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

/// Records calls and tracks live resources.
///
/// Compilation succeeds when the source defines `void main`; linking succeeds
/// when exactly one vertex and one fragment stage compiled. Uniforms are
/// "declared" by `uniform <type> <name>;` lines, and only declared uniforms
/// keep a value.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: RefCell<State>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Names of every uniform written since the last `clear_calls`, in order.
    pub fn uniform_writes(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::SetUniform { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn draw_calls(&self) -> Vec<Call> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::DrawIndexed { .. }))
            .cloned()
            .collect()
    }

    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.values.get(name).copied())
    }

    pub fn program_uniform_values(&self, program: ProgramId) -> HashMap<String, UniformValue> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.values.clone())
            .unwrap_or_default()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_modules(&self) -> usize {
        self.state.borrow().modules.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn fail_vertex_arrays(&self, fail: bool) {
        self.state.borrow_mut().fail_vertex_arrays = fail;
    }
}

fn declared_uniforms(source: &str) -> HashSet<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut tokens = line.trim().trim_end_matches(';').split_whitespace();
            match (tokens.next(), tokens.next(), tokens.next()) {
                (Some("uniform"), Some(_ty), Some(name)) => Some(name.to_owned()),
                _ => None,
            }
        })
        .collect()
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let mut state = self.state.borrow_mut();
        let id = BufferId(state.next());
        state.buffers.insert(id);
        state.calls.push(Call::CreateBuffer {
            id,
            target: descriptor.target,
            usage: descriptor.usage,
            bytes: data.to_vec(),
        });
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DestroyBuffer(id));
        if state.buffers.remove(&id) {
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    fn create_vertex_array(
        &self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<VertexArrayId, ResourceError> {
        let mut state = self.state.borrow_mut();
        if state.fail_vertex_arrays {
            return Err(ResourceError::BackendError(
                "vertex arrays disabled".to_owned(),
            ));
        }
        if !state.buffers.contains(&descriptor.vertex_buffer) {
            return Err(ResourceError::NotFound);
        }
        let id = VertexArrayId(state.next());
        state.vertex_arrays.insert(id);
        state.calls.push(Call::CreateVertexArray {
            id,
            vertex_buffer: descriptor.vertex_buffer,
            index_buffer: descriptor.index_buffer,
            stride: descriptor.stride,
            attributes: descriptor.attributes.to_vec(),
        });
        Ok(id)
    }

    fn destroy_vertex_array(&self, id: VertexArrayId) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DestroyVertexArray(id));
        if state.vertex_arrays.remove(&id) {
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let mut state = self.state.borrow_mut();
        let id = ShaderModuleId(state.next());
        let status = if descriptor.source.contains("void main") {
            ShaderCompileResult::ok()
        } else {
            ShaderCompileResult::failed("0:1(1): error: syntax error, missing main function")
        };
        state.modules.insert(
            id,
            Module {
                stage: descriptor.stage,
                status,
                uniforms: declared_uniforms(&descriptor.source),
            },
        );
        state.calls.push(Call::CreateShaderModule {
            id,
            stage: descriptor.stage,
        });
        Ok(id)
    }

    fn shader_module_status(
        &self,
        id: ShaderModuleId,
    ) -> Result<ShaderCompileResult, ResourceError> {
        self.state
            .borrow()
            .modules
            .get(&id)
            .map(|m| m.status.clone())
            .ok_or_else(|| ShaderError::NotFound { id }.into())
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DestroyShaderModule(id));
        match state.modules.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ShaderError::NotFound { id }.into()),
        }
    }

    fn create_program(&self, modules: &[ShaderModuleId]) -> Result<ProgramId, ResourceError> {
        let mut state = self.state.borrow_mut();
        let id = ProgramId(state.next());

        let mut uniforms = HashSet::new();
        let mut vertex = 0;
        let mut fragment = 0;
        let mut all_compiled = true;
        for module_id in modules {
            match state.modules.get(module_id) {
                Some(module) => {
                    all_compiled &= module.status.success;
                    match module.stage {
                        ShaderStage::Vertex => vertex += 1,
                        ShaderStage::Fragment => fragment += 1,
                    }
                    uniforms.extend(module.uniforms.iter().cloned());
                }
                None => all_compiled = false,
            }
        }

        let status = if all_compiled && vertex == 1 && fragment == 1 {
            ShaderCompileResult::ok()
        } else {
            ShaderCompileResult::failed("error: linking with uncompiled/unmatched shader")
        };
        if !status.success {
            uniforms.clear();
        }

        state.programs.insert(
            id,
            Program {
                status,
                uniforms,
                values: HashMap::new(),
            },
        );
        state.calls.push(Call::CreateProgram {
            id,
            modules: modules.to_vec(),
        });
        Ok(id)
    }

    fn program_link_status(&self, id: ProgramId) -> Result<ShaderCompileResult, ResourceError> {
        self.state
            .borrow()
            .programs
            .get(&id)
            .map(|p| p.status.clone())
            .ok_or(ResourceError::NotFound)
    }

    fn destroy_program(&self, id: ProgramId) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DestroyProgram(id));
        match state.programs.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ResourceError::NotFound),
        }
    }

    fn use_program(&self, program: Option<ProgramId>) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        if let Some(id) = program {
            if !state.programs.contains_key(&id) {
                return Err(ResourceError::NotFound);
            }
        }
        state.calls.push(Call::UseProgram(program));
        Ok(())
    }

    fn set_uniform(
        &self,
        program: ProgramId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::SetUniform {
            program,
            name: name.to_owned(),
            value,
        });
        let entry = state
            .programs
            .get_mut(&program)
            .ok_or(ResourceError::NotFound)?;
        if entry.uniforms.contains(name) {
            entry.values.insert(name.to_owned(), value);
        }
        Ok(())
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        pixels: &[u8],
    ) -> Result<TextureId, ResourceError> {
        let expected = (descriptor.width * descriptor.height * descriptor.format.bytes_per_pixel())
            as usize;
        if pixels.len() != expected {
            return Err(ResourceError::InvalidDescriptor(format!(
                "expected {expected} bytes, got {}",
                pixels.len()
            )));
        }
        let mut state = self.state.borrow_mut();
        let id = TextureId(state.next());
        state.textures.insert(id);
        state.calls.push(Call::CreateTexture {
            id,
            width: descriptor.width,
            height: descriptor.height,
        });
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DestroyTexture(id));
        if state.textures.remove(&id) {
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    fn bind_texture(&self, unit: u32, texture: TextureId) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        if !state.textures.contains(&texture) {
            return Err(ResourceError::NotFound);
        }
        state.calls.push(Call::BindTexture { unit, texture });
        Ok(())
    }

    fn draw_indexed(
        &self,
        vertex_array: VertexArrayId,
        topology: PrimitiveTopology,
        index_format: IndexFormat,
        index_count: u32,
    ) -> Result<(), ResourceError> {
        let mut state = self.state.borrow_mut();
        if !state.vertex_arrays.contains(&vertex_array) {
            return Err(ResourceError::NotFound);
        }
        state.calls.push(Call::DrawIndexed {
            vertex_array,
            topology,
            index_format,
            count: index_count,
        });
        Ok(())
    }
}

/// Path of a file under the workspace `assets/` directory.
pub fn asset_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../assets")
        .join(relative)
}

/// Routes `log` output through the test harness. Safe to call from every test.
pub fn init_test_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}
