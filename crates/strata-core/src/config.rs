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

//! Scene configuration: shader paths and terrain parameters.
//!
//! Configuration is stored as JSON. Every field has a default, so an empty
//! object `{}` is a valid scene. Relative paths are resolved against the
//! directory of the configuration file by [`SceneConfig::load`].

use crate::renderer::api::ImageFormatHint;
use crate::terrain::grid::{DEFAULT_RESOLUTION, DEFAULT_WIDTH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything needed to set up the terrain scene.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Paths of the terrain shader stages.
    pub shader: ShaderConfig,
    /// Terrain grid and texture parameters.
    pub terrain: TerrainConfig,
}

/// Source files of a two-stage shader program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShaderConfig {
    /// Vertex stage source path.
    pub vertex: PathBuf,
    /// Fragment stage source path.
    pub fragment: PathBuf,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("shaders/terrain.vert"),
            fragment: PathBuf::from("shaders/terrain.frag"),
        }
    }
}

/// Terrain grid parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerrainConfig {
    /// Vertices per side.
    pub resolution: u32,
    /// World-space scale.
    pub width: f32,
    /// First tuning scalar forwarded to the shader.
    pub ds: f32,
    /// Second tuning scalar forwarded to the shader.
    pub dss: f32,
    /// Image applied to the terrain, if any.
    pub texture: Option<PathBuf>,
    /// Encoding of `texture`.
    pub texture_format: ImageFormatHint,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            width: DEFAULT_WIDTH,
            ds: 0.0,
            dss: 0.0,
            texture: None,
            texture_format: ImageFormatHint::Auto,
        }
    }
}

impl SceneConfig {
    /// Parses a configuration from JSON text. Paths are left as written.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid scene configuration")
    }

    /// Reads a JSON configuration file and resolves its relative paths
    /// against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene configuration '{}'", path.display()))?;
        let mut config = Self::from_json_str(&json)
            .with_context(|| format!("Failed to parse scene configuration '{}'", path.display()))?;

        if let Some(base_dir) = path.parent() {
            config.resolve_paths(base_dir);
        }
        log::debug!("Loaded scene configuration from {}", path.display());
        Ok(config)
    }

    /// Makes every relative path absolute against `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        resolve(&mut self.shader.vertex, base_dir);
        resolve(&mut self.shader.fragment, base_dir);
        if let Some(texture) = self.terrain.texture.as_mut() {
            resolve(texture, base_dir);
        }
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize scene configuration")
    }
}

fn resolve(path: &mut PathBuf, base_dir: &Path) {
    if path.is_relative() {
        *path = base_dir.join(&*path);
    }
}
