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

//! The GPU side of the terrain: buffer ownership, uniform refresh and drawing.

use super::grid::{GridError, GridMesh};
use crate::config::TerrainConfig;
use crate::math::{Mat4, Vec3};
use crate::renderer::api::{
    BufferDescriptor, BufferId, BufferTarget, BufferUsage, IndexFormat, PrimitiveTopology,
    VertexArrayDescriptor, VertexArrayId, VertexAttribute, VertexFormat,
};
use crate::renderer::error::ResourceError;
use crate::renderer::shader_program::ShaderProgram;
use crate::renderer::texture::Texture;
use crate::renderer::traits::{GraphicsDevice, TextureLoader};
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// Texture unit the terrain texture is bound to.
pub const TEXTURE_UNIT: u32 = 0;

/// Names of the uniforms the terrain writes.
pub mod uniforms {
    /// `sampler2D` bound to [`super::TEXTURE_UNIT`].
    pub const TERRAIN_TEXTURE: &str = "terrainTexture";
    /// `bool` whether a texture is bound to the sampler.
    pub const TEXTURED: &str = "textured";
    /// `mat4` model matrix.
    pub const MODEL: &str = "model";
    /// `int` vertices per side.
    pub const RESOLUTION: &str = "resolution";
    /// `float` world-space scale.
    pub const WIDTH: &str = "width";
    /// `float` reciprocal of the resolution.
    pub const INV_RESOLUTION: &str = "invResolution";
    /// `float` reciprocal of the squared resolution.
    pub const INV_RESOLUTION_SQUARE: &str = "invResolutionSquare";
    /// `float` first tuning scalar.
    pub const DS: &str = "ds";
    /// `float` second tuning scalar.
    pub const DSS: &str = "dss";
}

/// The single height attribute: one `f32` at location 0.
const HEIGHT_ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
    location: 0,
    format: VertexFormat::Float32,
    offset: 0,
}];

/// An error raised while building a [`Terrain`].
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainError {
    /// The grid parameters were rejected.
    Grid(GridError),
    /// A GPU resource could not be created.
    Resource(ResourceError),
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerrainError::Grid(err) => write!(f, "Invalid terrain grid: {err}"),
            TerrainError::Resource(err) => write!(f, "Terrain GPU setup failed: {err}"),
        }
    }
}

impl std::error::Error for TerrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TerrainError::Grid(err) => Some(err),
            TerrainError::Resource(err) => Some(err),
        }
    }
}

impl From<GridError> for TerrainError {
    fn from(err: GridError) -> Self {
        TerrainError::Grid(err)
    }
}

impl From<ResourceError> for TerrainError {
    fn from(err: ResourceError) -> Self {
        TerrainError::Resource(err)
    }
}

#[derive(Debug, Clone, Copy)]
struct GpuMesh {
    vertex_array: VertexArrayId,
    vertex_buffer: BufferId,
    index_buffer: BufferId,
}

/// A height-mapped grid uploaded to the GPU, ready to be drawn as one triangle strip.
///
/// The vertex array, vertex buffer and index buffer are created in
/// [`Terrain::new`] and released when the terrain is dropped.
///
/// Uniforms that rarely change (the model matrix and the grid "features")
/// are only sent when their dirty flag is set. Both flags start set, so the
/// first [`Terrain::draw`] uploads everything; afterwards they are re-sent
/// only after [`Terrain::mark_model_dirty`] / [`Terrain::mark_features_dirty`]
/// or a setter that changes them. The flags track this terrain's last upload,
/// so drawing it with a different program requires marking both dirty.
#[derive(Debug)]
pub struct Terrain {
    device: Rc<dyn GraphicsDevice>,
    grid: GridMesh,
    texture: Option<Rc<Texture>>,
    position: Vec3,
    ds: f32,
    dss: f32,
    mesh: GpuMesh,
    should_update_model: bool,
    should_update_features: bool,
}

impl Terrain {
    /// Uploads `grid` and wraps the resulting GPU buffers.
    pub fn new(
        device: Rc<dyn GraphicsDevice>,
        grid: GridMesh,
        texture: Option<Rc<Texture>>,
    ) -> Result<Self, ResourceError> {
        let mesh = setup_mesh(&*device, &grid)?;
        log::info!(
            "Terrain ready: {}x{} grid, {} indices, textured: {}",
            grid.resolution(),
            grid.resolution(),
            grid.index_count(),
            texture.is_some()
        );

        Ok(Self {
            device,
            grid,
            texture,
            position: Vec3::ZERO,
            ds: 0.0,
            dss: 0.0,
            mesh,
            should_update_model: true,
            should_update_features: true,
        })
    }

    /// The default terrain: a flat 8x8 grid of width 1.
    pub fn with_default_grid(
        device: Rc<dyn GraphicsDevice>,
        texture: Option<Rc<Texture>>,
    ) -> Result<Self, ResourceError> {
        Self::new(device, GridMesh::default(), texture)
    }

    /// Builds a flat terrain from configuration, loading its texture through `loader`.
    ///
    /// A texture that cannot be loaded is logged and the terrain is built without one.
    pub fn from_config(
        device: Rc<dyn GraphicsDevice>,
        config: &TerrainConfig,
        loader: &dyn TextureLoader,
    ) -> Result<Self, TerrainError> {
        let grid = GridMesh::flat(config.resolution, config.width)?;

        let texture = config.texture.as_deref().and_then(|path| {
            match Texture::load(device.clone(), loader, path, config.texture_format) {
                Ok(texture) => Some(Rc::new(texture)),
                Err(e) => {
                    log::warn!("Terrain texture unavailable, drawing untextured: {e}");
                    None
                }
            }
        });

        let mut terrain = Self::new(device, grid, texture)?;
        terrain.ds = config.ds;
        terrain.dss = config.dss;
        Ok(terrain)
    }

    /// Sends the uniforms that need refreshing and issues the strip draw call.
    ///
    /// `shader` must be the current program (see [`ShaderProgram::use_program`]).
    pub fn draw(&mut self, shader: &ShaderProgram) -> Result<(), ResourceError> {
        shader.set_int(uniforms::TERRAIN_TEXTURE, TEXTURE_UNIT as i32)?;
        shader.set_bool(uniforms::TEXTURED, self.texture.is_some())?;
        if let Some(texture) = &self.texture {
            self.device.bind_texture(TEXTURE_UNIT, texture.id())?;
        }

        if self.should_update_model {
            shader.set_mat4(uniforms::MODEL, &self.model_matrix())?;
            self.should_update_model = false;
        }

        if self.should_update_features {
            shader.set_int(uniforms::RESOLUTION, self.grid.resolution() as i32)?;
            shader.set_float(uniforms::WIDTH, self.grid.width())?;
            shader.set_float(uniforms::INV_RESOLUTION, self.grid.inv_resolution())?;
            shader.set_float(
                uniforms::INV_RESOLUTION_SQUARE,
                self.grid.inv_resolution_square(),
            )?;
            shader.set_float(uniforms::DS, self.ds)?;
            shader.set_float(uniforms::DSS, self.dss)?;
            self.should_update_features = false;
        }

        if self.grid.is_empty() {
            log::trace!("Skipping draw of an empty terrain grid");
            return Ok(());
        }

        let index_count = u32::try_from(self.grid.index_count()).map_err(|_| {
            ResourceError::InvalidDescriptor(format!(
                "terrain strip of {} indices exceeds a single draw call",
                self.grid.index_count()
            ))
        })?;
        self.device.draw_indexed(
            self.mesh.vertex_array,
            PrimitiveTopology::TriangleStrip,
            IndexFormat::Uint32,
            index_count,
        )
    }

    /// The model matrix: a translation to [`Self::position`].
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }

    /// The CPU-side grid data.
    pub fn grid(&self) -> &GridMesh {
        &self.grid
    }

    /// The texture bound when drawing, if any.
    pub fn texture(&self) -> Option<&Rc<Texture>> {
        self.texture.as_ref()
    }

    /// World-space position of the grid origin.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Moves the terrain; the model matrix is re-sent on the next draw.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.should_update_model = true;
    }

    /// The `(ds, dss)` tuning scalars.
    pub fn tuning(&self) -> (f32, f32) {
        (self.ds, self.dss)
    }

    /// Changes the tuning scalars; features are re-sent on the next draw.
    pub fn set_tuning(&mut self, ds: f32, dss: f32) {
        self.ds = ds;
        self.dss = dss;
        self.should_update_features = true;
    }

    /// Requests a model matrix upload on the next draw.
    pub fn mark_model_dirty(&mut self) {
        self.should_update_model = true;
    }

    /// Requests a feature uniform upload on the next draw.
    pub fn mark_features_dirty(&mut self) {
        self.should_update_features = true;
    }

    /// Whether the next draw uploads the model matrix.
    pub fn is_model_dirty(&self) -> bool {
        self.should_update_model
    }

    /// Whether the next draw uploads the feature uniforms.
    pub fn is_features_dirty(&self) -> bool {
        self.should_update_features
    }
}

impl Drop for Terrain {
    fn drop(&mut self) {
        let GpuMesh {
            vertex_array,
            vertex_buffer,
            index_buffer,
        } = self.mesh;

        if let Err(e) = self.device.destroy_vertex_array(vertex_array) {
            log::warn!("Failed to destroy terrain vertex array {vertex_array:?}: {e}");
        }
        for buffer in [vertex_buffer, index_buffer] {
            if let Err(e) = self.device.destroy_buffer(buffer) {
                log::warn!("Failed to destroy terrain buffer {buffer:?}: {e}");
            }
        }
        log::debug!("Released terrain GPU resources");
    }
}

fn setup_mesh(device: &dyn GraphicsDevice, grid: &GridMesh) -> Result<GpuMesh, ResourceError> {
    let vertex_buffer = device.create_buffer_with_data(
        &BufferDescriptor {
            label: Some(Cow::Borrowed("Terrain Height Buffer")),
            target: BufferTarget::Vertex,
            usage: BufferUsage::Static,
        },
        grid.height_bytes(),
    )?;

    let index_buffer = match device.create_buffer_with_data(
        &BufferDescriptor {
            label: Some(Cow::Borrowed("Terrain Index Buffer")),
            target: BufferTarget::Index,
            usage: BufferUsage::Static,
        },
        grid.index_bytes(),
    ) {
        Ok(id) => id,
        Err(e) => {
            release_buffers(device, &[vertex_buffer]);
            return Err(e);
        }
    };

    let vertex_array = match device.create_vertex_array(&VertexArrayDescriptor {
        label: Some(Cow::Borrowed("Terrain Vertex Array")),
        vertex_buffer,
        index_buffer: Some(index_buffer),
        stride: VertexFormat::Float32.size(),
        attributes: Cow::Borrowed(&HEIGHT_ATTRIBUTES[..]),
    }) {
        Ok(id) => id,
        Err(e) => {
            release_buffers(device, &[vertex_buffer, index_buffer]);
            return Err(e);
        }
    };

    Ok(GpuMesh {
        vertex_array,
        vertex_buffer,
        index_buffer,
    })
}

fn release_buffers(device: &dyn GraphicsDevice, buffers: &[BufferId]) {
    for &buffer in buffers {
        if let Err(e) = device.destroy_buffer(buffer) {
            log::warn!("Failed to release buffer {buffer:?} after a setup error: {e}");
        }
    }
}
