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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::{ShaderModuleId, ShaderStage};
use std::fmt;

/// An error related to loading, compiling or linking a shader program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// An error occurred while trying to load the shader source from a path.
    LoadError {
        /// The path of the file that failed to load.
        path: String,
        /// The underlying I/O error.
        source_error: String,
    },
    /// A stage was rejected by the backend compiler.
    CompilationError {
        /// The stage that failed.
        stage: ShaderStage,
        /// A descriptive label for the shader, if available.
        label: String,
        /// The compiler's info log.
        details: String,
    },
    /// The program was rejected by the backend linker.
    LinkError {
        /// The linker's info log.
        details: String,
    },
    /// The requested shader module could not be found.
    NotFound {
        /// The ID of the shader module that was not found.
        id: ShaderModuleId,
    },
}

impl ShaderError {
    /// The diagnostic class of this error, as printed in logs.
    pub fn tag(&self) -> &'static str {
        match self {
            ShaderError::LoadError { .. } => "FILE_UNSUCCESSFUL_READ",
            ShaderError::CompilationError { .. } => "COMPILATION_FAILED",
            ShaderError::LinkError { .. } => "LINKING_FAILED",
            ShaderError::NotFound { .. } => "NOT_FOUND",
        }
    }

    /// The full diagnostic prefix, e.g. `ERROR::SHADER::FRAGMENT::COMPILATION_FAILED`.
    pub fn diagnostic(&self) -> String {
        match self {
            ShaderError::CompilationError { stage, .. } => {
                format!("ERROR::SHADER::{}::{}", stage.name(), self.tag())
            }
            ShaderError::LinkError { .. } => format!("ERROR::SHADER::PROGRAM::{}", self.tag()),
            _ => format!("ERROR::SHADER::{}", self.tag()),
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::LoadError { path, source_error } => {
                write!(
                    f,
                    "Failed to load shader source from '{path}': {source_error}"
                )
            }
            ShaderError::CompilationError {
                stage,
                label,
                details,
            } => {
                write!(
                    f,
                    "{stage} shader compilation failed for '{label}': {details}"
                )
            }
            ShaderError::LinkError { details } => {
                write!(f, "Shader program linking failed: {details}")
            }
            ShaderError::NotFound { id } => {
                write!(f, "Shader module not found for ID: {id:?}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation or use of a GPU resource (buffers, textures, etc.).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A generic resource could not be found.
    NotFound,
    /// A descriptor or its data was rejected before reaching the backend.
    InvalidDescriptor(String),
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidDescriptor(msg) => {
                write!(f, "Invalid resource descriptor: {msg}")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// An error raised while turning an image file into a GPU texture.
#[derive(Debug)]
pub enum TextureError {
    /// The texture loader could not read or decode the image.
    Decode {
        /// The image path.
        path: String,
        /// The loader's error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// The decoded image could not be uploaded.
    Upload(ResourceError),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Decode { path, source } => {
                write!(f, "Failed to decode texture '{path}': {source}")
            }
            TextureError::Upload(err) => write!(f, "Failed to upload texture: {err}"),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Decode { source, .. } => Some(source.as_ref()),
            TextureError::Upload(err) => Some(err),
        }
    }
}

impl From<ResourceError> for TextureError {
    fn from(err: ResourceError) -> Self {
        TextureError::Upload(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_error_tags() {
        let load = ShaderError::LoadError {
            path: "missing.vert".into(),
            source_error: "No such file".into(),
        };
        assert_eq!(load.tag(), "FILE_UNSUCCESSFUL_READ");
        assert_eq!(load.diagnostic(), "ERROR::SHADER::FILE_UNSUCCESSFUL_READ");

        let compile = ShaderError::CompilationError {
            stage: ShaderStage::Fragment,
            label: "terrain.frag".into(),
            details: "0:1: syntax error".into(),
        };
        assert_eq!(compile.tag(), "COMPILATION_FAILED");
        assert_eq!(
            compile.diagnostic(),
            "ERROR::SHADER::FRAGMENT::COMPILATION_FAILED"
        );

        let link = ShaderError::LinkError {
            details: String::new(),
        };
        assert_eq!(link.diagnostic(), "ERROR::SHADER::PROGRAM::LINKING_FAILED");
    }

    #[test]
    fn resource_error_wraps_shader_error() {
        let err: ResourceError = ShaderError::NotFound {
            id: ShaderModuleId(3),
        }
        .into();
        assert!(matches!(err, ResourceError::Shader(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("ShaderModuleId(3)"));
    }

    #[test]
    fn texture_error_from_resource_error() {
        let err: TextureError = ResourceError::NotFound.into();
        assert!(matches!(err, TextureError::Upload(ResourceError::NotFound)));
    }
}
