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

//! Terrain mesh generation and rendering.

pub mod grid;
pub mod terrain_mesh;

pub use self::grid::{
    strip_index_count, strip_indices, GridError, GridMesh, DEFAULT_RESOLUTION, DEFAULT_WIDTH,
    MAX_RESOLUTION,
};
pub use self::terrain_mesh::{uniforms, Terrain, TerrainError, TEXTURE_UNIT};
