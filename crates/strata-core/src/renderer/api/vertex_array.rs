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

//! Vertex-array descriptions: how raw buffer bytes map onto shader attributes.

use super::buffer::BufferId;
use std::borrow::Cow;

/// The data type of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// One 32-bit float.
    Float32,
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
}

impl VertexFormat {
    /// Number of scalar components in the attribute.
    pub const fn components(&self) -> u32 {
        match self {
            VertexFormat::Float32 => 1,
            VertexFormat::Float32x2 => 2,
            VertexFormat::Float32x3 => 3,
            VertexFormat::Float32x4 => 4,
        }
    }

    /// Size of the attribute in bytes.
    pub const fn size(&self) -> u32 {
        self.components() * std::mem::size_of::<f32>() as u32
    }
}

/// A single attribute read from the vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// The `layout(location = N)` slot in the vertex shader.
    pub location: u32,
    /// The attribute's data type.
    pub format: VertexFormat,
    /// Byte offset of the attribute from the start of a vertex.
    pub offset: u32,
}

/// Describes a vertex array object to be created by the `GraphicsDevice`.
#[derive(Debug, Clone)]
pub struct VertexArrayDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The buffer providing per-vertex data.
    pub vertex_buffer: BufferId,
    /// The buffer providing indices, recorded into the vertex array.
    pub index_buffer: Option<BufferId>,
    /// Distance in bytes between two consecutive vertices.
    pub stride: u32,
    /// The attributes to declare and enable.
    pub attributes: Cow<'a, [VertexAttribute]>,
}

/// An opaque handle to a vertex array object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_format_sizes() {
        assert_eq!(VertexFormat::Float32.size(), 4);
        assert_eq!(VertexFormat::Float32x3.components(), 3);
        assert_eq!(VertexFormat::Float32x4.size(), 16);
    }
}
