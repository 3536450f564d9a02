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

//! CPU-side generation of the terrain grid.
//!
//! A grid of `resolution x resolution` vertices stores a single height per
//! vertex; the X/Z position of a vertex is implied by its index in row-major
//! order and reconstructed in the vertex shader. The whole grid is drawn as
//! one triangle strip: each pair of rows forms a strip segment, and
//! consecutive segments are stitched together with duplicated (degenerate)
//! vertices at the start and end of every segment.

use std::fmt;

/// Number of vertices per side used when nothing else is configured.
pub const DEFAULT_RESOLUTION: u32 = 8;
/// World-space scale used when nothing else is configured.
pub const DEFAULT_WIDTH: f32 = 1.0;
/// Largest resolution whose strip index count still fits a GL draw count (`i32`).
///
/// `strip_index_count(32_768)` is `2 * (32_768² - 1) = i32::MAX - 1`.
pub const MAX_RESOLUTION: u32 = 32_768;

/// Rejected grid parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridError {
    /// The strip would hold more indices than a single draw call can submit.
    ResolutionTooLarge {
        /// The requested resolution.
        resolution: u32,
    },
    /// The world-space width is NaN or infinite.
    InvalidWidth {
        /// The requested width.
        width: f32,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::ResolutionTooLarge { resolution } => write!(
                f,
                "Grid resolution {resolution} exceeds the maximum of {MAX_RESOLUTION}"
            ),
            GridError::InvalidWidth { width } => {
                write!(f, "Grid width must be finite, got {width}")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Heights and triangle-strip indices of a regular square grid.
///
/// Once built, the data never changes; a different grid means a new `GridMesh`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh {
    resolution: u32,
    width: f32,
    heights: Vec<f32>,
    indices: Vec<u32>,
}

impl GridMesh {
    /// A grid whose heights are all `0.0`.
    pub fn flat(resolution: u32, width: f32) -> Result<Self, GridError> {
        Self::from_height_fn(resolution, width, |_, _| 0.0)
    }

    /// A grid whose heights are produced by `height(row, col)`, evaluated in
    /// row-major order.
    pub fn from_height_fn<F>(resolution: u32, width: f32, mut height: F) -> Result<Self, GridError>
    where
        F: FnMut(u32, u32) -> f32,
    {
        validate(resolution, width)?;

        let mut heights = Vec::with_capacity(resolution as usize * resolution as usize);
        for row in 0..resolution {
            for col in 0..resolution {
                heights.push(height(row, col));
            }
        }

        Ok(Self {
            resolution,
            width,
            heights,
            indices: strip_indices(resolution),
        })
    }

    /// A grid that only records its parameters: no heights, no indices.
    ///
    /// Drawing it is a no-op. It exists for callers that want to reserve a
    /// terrain slot before any height data is known.
    pub fn empty(resolution: u32, width: f32) -> Result<Self, GridError> {
        validate(resolution, width)?;
        Ok(Self {
            resolution,
            width,
            heights: Vec::new(),
            indices: Vec::new(),
        })
    }

    /// Number of vertices per side.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// World-space scale of the grid.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// One height per vertex, row-major.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Triangle-strip indices into [`Self::heights`].
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices actually stored.
    pub fn vertex_count(&self) -> usize {
        self.heights.len()
    }

    /// Number of indices actually stored.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// `true` when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// `1 / resolution`, as uploaded to the shader.
    pub fn inv_resolution(&self) -> f32 {
        1.0 / self.resolution as f32
    }

    /// `1 / resolution²`, as uploaded to the shader.
    pub fn inv_resolution_square(&self) -> f32 {
        1.0 / (self.resolution as f32 * self.resolution as f32)
    }

    /// The heights as raw bytes for a vertex buffer upload.
    pub fn height_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.heights)
    }

    /// The indices as raw bytes for an index buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl Default for GridMesh {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            width: DEFAULT_WIDTH,
            heights: vec![0.0; (DEFAULT_RESOLUTION * DEFAULT_RESOLUTION) as usize],
            indices: strip_indices(DEFAULT_RESOLUTION),
        }
    }
}

fn validate(resolution: u32, width: f32) -> Result<(), GridError> {
    if resolution > MAX_RESOLUTION {
        return Err(GridError::ResolutionTooLarge { resolution });
    }
    if !width.is_finite() {
        return Err(GridError::InvalidWidth { width });
    }
    Ok(())
}

/// Number of indices [`strip_indices`] produces: `(resolution - 1) * (2 * resolution + 2)`.
pub fn strip_index_count(resolution: u32) -> usize {
    let r = resolution as usize;
    r.saturating_sub(1)
        .saturating_mul(r.saturating_mul(2).saturating_add(2))
}

/// Builds the triangle-strip index sequence of a `resolution x resolution` grid.
///
/// For every pair of rows `(row, row + 1)` the segment is:
/// the first vertex of `row` (duplicated), then the two rows interleaved
/// column by column, then the last vertex of `row + 1` (duplicated).
/// The duplicates produce zero-area triangles, so all segments can be drawn
/// with a single strip draw call.
pub fn strip_indices(resolution: u32) -> Vec<u32> {
    let cols = resolution;
    let mut indices = Vec::with_capacity(strip_index_count(resolution));

    for row in 0..resolution.saturating_sub(1) {
        indices.push(row * cols);

        for col in 0..cols {
            indices.push(row * cols + col);
            indices.push((row + 1) * cols + col);
        }

        indices.push((row + 1) * cols + (cols - 1));
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resolution_three_matches_reference_sequence() {
        let grid = GridMesh::flat(3, 1.0).unwrap();
        assert_eq!(grid.vertex_count(), 9);
        assert_eq!(
            grid.indices(),
            &[0, 0, 3, 1, 4, 2, 5, 5, 3, 3, 6, 4, 7, 5, 8, 8]
        );
    }

    #[test]
    fn test_vertex_and_index_counts() {
        for resolution in 2..=40 {
            let grid = GridMesh::flat(resolution, 1.0).unwrap();
            let r = resolution as usize;
            assert_eq!(grid.vertex_count(), r * r, "resolution {resolution}");
            assert_eq!(
                grid.index_count(),
                (r - 1) * (2 * r + 2),
                "resolution {resolution}"
            );
            assert_eq!(grid.index_count(), strip_index_count(resolution));
        }
    }

    #[test]
    fn test_indices_stay_in_bounds() {
        for resolution in 2..=32 {
            let max = resolution * resolution - 1;
            assert!(strip_indices(resolution).iter().all(|&i| i <= max));
        }
    }

    #[test]
    fn test_every_vertex_is_referenced() {
        let resolution = 6;
        let indices = strip_indices(resolution);
        for v in 0..resolution * resolution {
            assert!(indices.contains(&v), "vertex {v} never drawn");
        }
    }

    #[test]
    fn test_row_segments_start_and_end_with_duplicates() {
        let resolution = 5u32;
        let indices = strip_indices(resolution);
        let segment_len = 2 * resolution as usize + 2;

        for (row, segment) in indices.chunks(segment_len).enumerate() {
            let row = row as u32;
            assert_eq!(segment.len(), segment_len);
            // Leading duplicate: first vertex of the upper row, twice.
            assert_eq!(segment[0], row * resolution);
            assert_eq!(segment[0], segment[1]);
            // Trailing duplicate: last vertex of the lower row, twice.
            let last = segment.len() - 1;
            assert_eq!(segment[last], (row + 2) * resolution - 1);
            assert_eq!(segment[last], segment[last - 1]);
        }
    }

    #[test]
    fn test_row_seams_only_produce_degenerate_triangles() {
        let resolution = 4u32;
        let indices = strip_indices(resolution);
        let segment_len = 2 * resolution as usize + 2;

        // Any strip triangle that spans a seam between two segments must
        // repeat a vertex, i.e. have zero area.
        for seam in (segment_len..indices.len()).step_by(segment_len) {
            for start in seam - 2..seam {
                let tri = [indices[start], indices[start + 1], indices[start + 2]];
                assert!(
                    tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2],
                    "non-degenerate triangle {tri:?} across seam at {seam}"
                );
            }
        }
    }

    #[test]
    fn test_tiny_grids_have_no_indices() {
        assert!(strip_indices(0).is_empty());
        assert!(strip_indices(1).is_empty());
        assert_eq!(strip_index_count(0), 0);
        assert_eq!(strip_index_count(1), 0);

        let single = GridMesh::flat(1, 1.0).unwrap();
        assert_eq!(single.vertex_count(), 1);
        assert!(single.is_empty());
    }

    #[test]
    fn test_height_fn_is_row_major() {
        let grid = GridMesh::from_height_fn(3, 2.0, |row, col| (row * 10 + col) as f32).unwrap();
        assert_eq!(
            grid.heights(),
            &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0, 20.0, 21.0, 22.0]
        );
        assert_eq!(grid.indices(), strip_indices(3).as_slice());
    }

    #[test]
    fn test_empty_grid_keeps_parameters_only() {
        let grid = GridMesh::empty(16, 4.0).unwrap();
        assert_eq!(grid.resolution(), 16);
        assert_eq!(grid.width(), 4.0);
        assert_eq!(grid.vertex_count(), 0);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_default_grid() {
        let grid = GridMesh::default();
        assert_eq!(grid, GridMesh::flat(DEFAULT_RESOLUTION, DEFAULT_WIDTH).unwrap());
        assert!(grid.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_reciprocals() {
        let grid = GridMesh::flat(8, 1.0).unwrap();
        assert_relative_eq!(grid.inv_resolution(), 0.125);
        assert_relative_eq!(grid.inv_resolution_square(), 1.0 / 64.0);
    }

    #[test]
    fn test_byte_views_match_element_counts() {
        let grid = GridMesh::flat(4, 1.0).unwrap();
        assert_eq!(grid.height_bytes().len(), 16 * 4);
        assert_eq!(grid.index_bytes().len(), grid.index_count() * 4);
    }

    #[test]
    fn test_max_resolution_fits_a_single_draw_call() {
        assert!(strip_index_count(MAX_RESOLUTION) <= i32::MAX as usize);
        assert!(strip_index_count(MAX_RESOLUTION + 1) > i32::MAX as usize);

        assert!(GridMesh::empty(MAX_RESOLUTION, 1.0).is_ok());
        assert_eq!(
            GridMesh::empty(50_000, 1.0),
            Err(GridError::ResolutionTooLarge { resolution: 50_000 })
        );
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        assert_eq!(
            GridMesh::flat(MAX_RESOLUTION + 1, 1.0),
            Err(GridError::ResolutionTooLarge {
                resolution: MAX_RESOLUTION + 1
            })
        );
        assert!(matches!(
            GridMesh::empty(4, f32::NAN),
            Err(GridError::InvalidWidth { .. })
        ));
        assert!(GridMesh::flat(2, f32::INFINITY).is_err());
    }
}
