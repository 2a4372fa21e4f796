use bytemuck::{Pod, Zeroable};

use crate::terrain::error::{Result, TerrainError};

/// Vertical exaggeration applied to raw intensity.
pub const HEIGHT_SCALE: f32 = 0.05;
/// Horizontal spacing between neighbouring samples.
pub const POSITION_SCALE: f32 = 0.1;
/// Offset subtracted from both horizontal axes to recentre the grid.
pub const DISPLAY_SCALE: f32 = 12.8;
/// Divisor normalising intensity into `[0, 1]`.
pub const COLOR_SCALE: f32 = 255.0;

/// One terrain sample as uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    /// Zero until the normal pass has visited this slot.
    pub normal: [f32; 3],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshScales {
    pub height: f32,
    pub position: f32,
    pub display: f32,
    pub color: f32,
}

impl Default for MeshScales {
    fn default() -> Self {
        Self {
            height: HEIGHT_SCALE,
            position: POSITION_SCALE,
            display: DISPLAY_SCALE,
            color: COLOR_SCALE,
        }
    }
}

/// Which grid cells emit a quad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Cell `(row, col)` emits when it has a row below and `col < height - 1`.
    /// The column is bounded by the grid *height*, so non-square maps either
    /// lose their rightmost cells or gain quads that wrap onto the next row.
    #[default]
    Legacy,
    /// Cell emits when it has a row below and `col < width - 1`.
    Corrected,
}

/// Vertex and index arrays of one terrain surface.
///
/// The vertex count is fixed at `width * height` when the grid is built; callers
/// get slices, never the backing `Vec`, so the arrays cannot be resized.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBuffers {
    width: u32,
    height: u32,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl MeshBuffers {
    /// Assemble buffers from raw parts, checking the layout invariants.
    pub fn from_parts(
        width: u32,
        height: u32,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> Result<Self> {
        let mesh = Self {
            width,
            height,
            vertices,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    pub(crate) fn new_unchecked(
        width: u32,
        height: u32,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> Self {
        Self {
            width,
            height,
            vertices,
            indices,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Lowest and highest vertex elevation.
    pub fn height_range(&self) -> (f32, f32) {
        self.vertices
            .iter()
            .map(|v| v.position[2])
            .fold((f32::MAX, f32::MIN), |(lo, hi), z| (lo.min(z), hi.max(z)))
    }

    pub fn validate(&self) -> Result<()> {
        let expected = self.width as usize * self.height as usize;
        if self.vertices.len() != expected {
            return Err(TerrainError::InvalidMesh(format!(
                "{} vertices for a {}x{} grid (expected {})",
                self.vertices.len(),
                self.width,
                self.height,
                expected
            )));
        }

        if self.indices.len() % 3 != 0 {
            return Err(TerrainError::InvalidMesh(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }

        if let Some(pos) = self
            .indices
            .iter()
            .position(|&idx| idx as usize >= expected)
        {
            return Err(TerrainError::InvalidMesh(format!(
                "index {} at position {} is out of range for {} vertices",
                self.indices[pos], pos, expected
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: u32, height: u32) -> Vec<Vertex> {
        vec![Vertex::default(); (width * height) as usize]
    }

    #[test]
    fn default_scales() {
        let s = MeshScales::default();
        assert_eq!(s.height, 0.05);
        assert_eq!(s.position, 0.1);
        assert_eq!(s.display, 12.8);
        assert_eq!(s.color, 255.0);
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
    }

    #[test]
    fn from_parts_accepts_valid_layout() {
        let mesh = MeshBuffers::from_parts(2, 2, flat(2, 2), vec![0, 1, 2, 2, 1, 3]).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [2, 1, 3]]);
    }

    #[test]
    fn validate_catches_wrong_vertex_count() {
        let err = MeshBuffers::from_parts(3, 2, flat(2, 2), vec![]).unwrap_err();
        assert!(matches!(err, TerrainError::InvalidMesh(_)));
    }

    #[test]
    fn validate_catches_partial_triangle() {
        assert!(MeshBuffers::from_parts(2, 2, flat(2, 2), vec![0, 1]).is_err());
    }

    #[test]
    fn validate_catches_out_of_range_index() {
        assert!(MeshBuffers::from_parts(2, 2, flat(2, 2), vec![0, 1, 4]).is_err());
    }

    #[test]
    fn height_range_spans_elevations() {
        let mut verts = flat(2, 1);
        verts[0].position[2] = -1.5;
        verts[1].position[2] = 4.0;
        let mesh = MeshBuffers::from_parts(2, 1, verts, vec![]).unwrap();
        assert_eq!(mesh.height_range(), (-1.5, 4.0));
    }
}
