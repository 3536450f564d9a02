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

//! Two-stage (vertex + fragment) shader programs.
//!
//! Construction is fail-soft: unreadable files, compile errors and link errors
//! are logged with their classic `ERROR::SHADER::...` tags and recorded, but a
//! [`ShaderProgram`] is always returned. Callers that would rather not render
//! with a broken program check [`ShaderProgram::is_valid`] or use
//! [`ShaderProgram::try_from_files`].

use crate::config::ShaderConfig;
use crate::math::{Mat4, Vec3};
use crate::renderer::api::{
    ProgramId, ShaderCompileResult, ShaderModuleDescriptor, ShaderModuleId, ShaderStage,
    UniformValue,
};
use crate::renderer::error::{ResourceError, ShaderError};
use crate::renderer::traits::GraphicsDevice;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// A linked GPU program made of a vertex and a fragment stage.
#[derive(Debug)]
pub struct ShaderProgram {
    device: Rc<dyn GraphicsDevice>,
    id: Option<ProgramId>,
    vertex: ShaderCompileResult,
    fragment: ShaderCompileResult,
    link: ShaderCompileResult,
    diagnostics: Vec<ShaderError>,
}

struct StageSource<'a> {
    stage: ShaderStage,
    label: Cow<'a, str>,
    source: Cow<'a, str>,
}

impl ShaderProgram {
    /// Reads both stage sources from disk, then compiles and links them.
    pub fn from_files(
        device: Rc<dyn GraphicsDevice>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Self {
        let mut diagnostics = Vec::new();
        let vertex = read_stage(ShaderStage::Vertex, vertex_path.as_ref(), &mut diagnostics);
        let fragment = read_stage(
            ShaderStage::Fragment,
            fragment_path.as_ref(),
            &mut diagnostics,
        );
        Self::build(device, vertex, fragment, diagnostics)
    }

    /// Compiles and links in-memory sources.
    pub fn from_sources(
        device: Rc<dyn GraphicsDevice>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Self {
        let vertex = StageSource {
            stage: ShaderStage::Vertex,
            label: Cow::Borrowed("<vertex source>"),
            source: Cow::Borrowed(vertex_source),
        };
        let fragment = StageSource {
            stage: ShaderStage::Fragment,
            label: Cow::Borrowed("<fragment source>"),
            source: Cow::Borrowed(fragment_source),
        };
        Self::build(device, vertex, fragment, Vec::new())
    }

    /// Builds the program from the paths of a [`ShaderConfig`].
    pub fn from_config(device: Rc<dyn GraphicsDevice>, config: &ShaderConfig) -> Self {
        Self::from_files(device, &config.vertex, &config.fragment)
    }

    /// Strict variant of [`Self::from_files`]: returns the first recorded
    /// diagnostic instead of a broken program.
    pub fn try_from_files(
        device: Rc<dyn GraphicsDevice>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let program = Self::from_files(device, vertex_path, fragment_path);
        if program.is_valid() {
            return Ok(program);
        }
        Err(program
            .diagnostics
            .first()
            .cloned()
            .unwrap_or_else(|| ShaderError::LinkError {
                details: program.link.log.clone(),
            }))
    }

    fn build(
        device: Rc<dyn GraphicsDevice>,
        vertex: StageSource<'_>,
        fragment: StageSource<'_>,
        mut diagnostics: Vec<ShaderError>,
    ) -> Self {
        let (vertex_module, vertex_status) = compile_stage(&*device, &vertex, &mut diagnostics);
        let (fragment_module, fragment_status) =
            compile_stage(&*device, &fragment, &mut diagnostics);

        let modules: Vec<ShaderModuleId> = [vertex_module, fragment_module]
            .into_iter()
            .flatten()
            .collect();

        let (id, link) = match device.create_program(&modules) {
            Ok(id) => {
                let status = device
                    .program_link_status(id)
                    .unwrap_or_else(|e| ShaderCompileResult::failed(e.to_string()));
                (Some(id), status)
            }
            Err(e) => (None, ShaderCompileResult::failed(e.to_string())),
        };

        if link.success {
            log::info!(
                "Linked shader program {:?} ({} + {})",
                id,
                vertex.label,
                fragment.label
            );
        } else {
            let err = ShaderError::LinkError {
                details: link.log.clone(),
            };
            log::error!("{}\n{}", err.diagnostic(), link.log);
            diagnostics.push(err);
        }

        // The stages live on inside the linked program.
        for module in modules {
            if let Err(e) = device.destroy_shader_module(module) {
                log::warn!("Failed to destroy shader module {module:?}: {e}");
            }
        }

        Self {
            device,
            id,
            vertex: vertex_status,
            fragment: fragment_status,
            link,
            diagnostics,
        }
    }

    /// The backend program handle, if the backend managed to create one.
    pub fn id(&self) -> Option<ProgramId> {
        self.id
    }

    /// `true` when both stages compiled and the program linked.
    pub fn is_valid(&self) -> bool {
        self.id.is_some() && self.vertex.success && self.fragment.success && self.link.success
    }

    /// Compile result of the vertex stage.
    pub fn vertex_status(&self) -> &ShaderCompileResult {
        &self.vertex
    }

    /// Compile result of the fragment stage.
    pub fn fragment_status(&self) -> &ShaderCompileResult {
        &self.fragment
    }

    /// Link result of the program.
    pub fn link_status(&self) -> &ShaderCompileResult {
        &self.link
    }

    /// Every error recorded while building the program, in order of occurrence.
    pub fn diagnostics(&self) -> &[ShaderError] {
        &self.diagnostics
    }

    /// Activates the program for subsequent draw calls.
    pub fn use_program(&self) -> Result<(), ResourceError> {
        match self.id {
            Some(id) => self.device.use_program(Some(id)),
            None => {
                log::warn!("Ignoring use of a shader program that was never created");
                Ok(())
            }
        }
    }

    /// Sets a `bool` uniform (uploaded as an integer).
    pub fn set_bool(&self, name: &str, value: bool) -> Result<(), ResourceError> {
        self.set_uniform(name, value)
    }

    /// Sets an `int` or sampler uniform.
    pub fn set_int(&self, name: &str, value: i32) -> Result<(), ResourceError> {
        self.set_uniform(name, value)
    }

    /// Sets a `float` uniform.
    pub fn set_float(&self, name: &str, value: f32) -> Result<(), ResourceError> {
        self.set_uniform(name, value)
    }

    /// Sets a `vec3` uniform.
    pub fn set_vec3(&self, name: &str, value: Vec3) -> Result<(), ResourceError> {
        self.set_uniform(name, value)
    }

    /// Sets a `mat4` uniform.
    pub fn set_mat4(&self, name: &str, value: &Mat4) -> Result<(), ResourceError> {
        self.set_uniform(name, *value)
    }

    fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) -> Result<(), ResourceError> {
        match self.id {
            Some(id) => self.device.set_uniform(id, name, value.into()),
            None => {
                log::trace!("Skipping uniform '{name}' on a program that was never created");
                Ok(())
            }
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            if let Err(e) = self.device.destroy_program(id) {
                log::warn!("Failed to destroy shader program {id:?}: {e}");
            }
        }
    }
}

fn read_stage<'a>(
    stage: ShaderStage,
    path: &'a Path,
    diagnostics: &mut Vec<ShaderError>,
) -> StageSource<'a> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            let err = ShaderError::LoadError {
                path: path.display().to_string(),
                source_error: e.to_string(),
            };
            log::error!("{}: {err}", err.diagnostic());
            diagnostics.push(err);
            String::new()
        }
    };
    StageSource {
        stage,
        label: path.to_string_lossy(),
        source: Cow::Owned(source),
    }
}

fn compile_stage(
    device: &dyn GraphicsDevice,
    stage: &StageSource<'_>,
    diagnostics: &mut Vec<ShaderError>,
) -> (Option<ShaderModuleId>, ShaderCompileResult) {
    let descriptor = ShaderModuleDescriptor {
        label: Some(stage.label.as_ref()),
        stage: stage.stage,
        source: Cow::Borrowed(stage.source.as_ref()),
    };

    let (module, status) = match device.create_shader_module(&descriptor) {
        Ok(id) => {
            let status = device
                .shader_module_status(id)
                .unwrap_or_else(|e| ShaderCompileResult::failed(e.to_string()));
            (Some(id), status)
        }
        Err(e) => (None, ShaderCompileResult::failed(e.to_string())),
    };

    if !status.success {
        let err = ShaderError::CompilationError {
            stage: stage.stage,
            label: stage.label.to_string(),
            details: status.log.clone(),
        };
        log::error!("{}\n{}", err.diagnostic(), status.log);
        diagnostics.push(err);
    }

    (module, status)
}
