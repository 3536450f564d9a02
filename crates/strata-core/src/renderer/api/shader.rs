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

//! Shader stages, modules, programs and their compile/link diagnostics.

use std::borrow::Cow;
use std::fmt;

/// Maximum number of bytes kept from a backend info log.
pub const INFO_LOG_CAPACITY: usize = 512;

/// The pipeline stage a shader module runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Runs once per vertex.
    Vertex,
    /// Runs once per rasterized fragment.
    Fragment,
}

impl ShaderStage {
    /// The upper-case stage name used in diagnostics (`VERTEX`, `FRAGMENT`).
    pub const fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::Fragment => "FRAGMENT",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describes a shader module to be created by the `GraphicsDevice`.
#[derive(Debug, Clone)]
pub struct ShaderModuleDescriptor<'a> {
    /// An optional debug label, usually the source path.
    pub label: Option<&'a str>,
    /// The stage this module is compiled for.
    pub stage: ShaderStage,
    /// GLSL source code.
    pub source: Cow<'a, str>,
}

/// An opaque handle representing a compiled shader stage object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderModuleId(pub usize);

/// An opaque handle representing a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub usize);

/// The outcome of compiling a stage or linking a program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShaderCompileResult {
    /// Whether the backend accepted the artifact.
    pub success: bool,
    /// The backend's diagnostic log, truncated to [`INFO_LOG_CAPACITY`] bytes.
    pub log: String,
}

impl ShaderCompileResult {
    /// A successful result with an empty log.
    pub fn ok() -> Self {
        Self {
            success: true,
            log: String::new(),
        }
    }

    /// A failed result carrying the (truncated) backend log.
    pub fn failed(log: impl AsRef<str>) -> Self {
        Self {
            success: false,
            log: truncate_info_log(log.as_ref()),
        }
    }
}

/// Truncates a backend info log to at most [`INFO_LOG_CAPACITY`] bytes,
/// never splitting a UTF-8 character.
pub fn truncate_info_log(log: &str) -> String {
    if log.len() <= INFO_LOG_CAPACITY {
        return log.to_owned();
    }
    let mut end = INFO_LOG_CAPACITY;
    while !log.is_char_boundary(end) {
        end -= 1;
    }
    log[..end].to_owned()
}
