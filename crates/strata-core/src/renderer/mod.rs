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

//! Provides the backend-agnostic rendering contracts used by the terrain.
//!
//! This module defines the "common language" for all rendering operations: the
//! abstract [`GraphicsDevice`] trait, the descriptors and ids it works with, and
//! the error types that cross its boundary. On top of those contracts it builds
//! the two owning wrappers the rest of the crate relies on: [`ShaderProgram`]
//! and [`Texture`].
//!
//! The 'how' of rendering lives in a concrete backend (the OpenGL device in
//! `strata-infra`), which implements these traits.

pub mod api;
pub mod error;
pub mod shader_program;
pub mod texture;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{ResourceError, ShaderError, TextureError};
pub use self::shader_program::ShaderProgram;
pub use self::texture::Texture;
pub use self::traits::{GraphicsDevice, TextureLoader};
