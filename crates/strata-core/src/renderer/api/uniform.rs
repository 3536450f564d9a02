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

//! Values that can be written to a named shader uniform.

use crate::math::{Mat4, Vec3};

/// A value uploaded to a uniform with [`GraphicsDevice::set_uniform`].
///
/// [`GraphicsDevice::set_uniform`]: crate::renderer::GraphicsDevice::set_uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Uploaded as an `int` of 0 or 1, as GLSL `bool` uniforms expect.
    Bool(bool),
    /// A signed integer, also used for sampler units.
    Int(i32),
    /// A single float.
    Float(f32),
    /// A `vec3`.
    Vec3([f32; 3]),
    /// A column-major `mat4`.
    Mat4([f32; 16]),
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        UniformValue::Bool(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value.to_array())
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value.to_cols_array())
    }
}
