//! Grid builder: samples a heightmap into terrain vertices and a triangle list.
//!
//! Each pixel becomes one vertex. The pixel row drives world X and the pixel
//! column drives world Y; intensity drives Z and the grayscale colour.

use log::debug;

use crate::terrain::error::{Result, TerrainError};
use crate::terrain::mesh::{EdgePolicy, MeshBuffers, MeshScales, Vertex};
use crate::terrain::pixels::HeightmapSource;

#[derive(Clone, Copy, Debug, Default)]
pub struct GridBuilder {
    scales: MeshScales,
    edge_policy: EdgePolicy,
}

impl GridBuilder {
    pub fn new(scales: MeshScales) -> Self {
        Self {
            scales,
            edge_policy: EdgePolicy::Legacy,
        }
    }

    pub fn with_edge_policy(mut self, edge_policy: EdgePolicy) -> Self {
        self.edge_policy = edge_policy;
        self
    }

    /// Build positions, colours and indices. Normals are left zeroed.
    pub fn build<S: HeightmapSource + ?Sized>(&self, source: &S) -> Result<MeshBuffers> {
        let vertex_count = checked_vertex_count(source)?;
        let width = source.width() as usize;
        let height = source.height() as usize;
        let bpp = source.bytes_per_pixel() as usize;
        let pixels = source.pixels();
        let s = &self.scales;

        let mut vertices = Vec::with_capacity(vertex_count);
        let mut indices =
            Vec::with_capacity(6 * width.saturating_sub(1) * height.saturating_sub(1));

        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let p = pixels[i * bpp] as f32;
                let shade = p / s.color;

                vertices.push(Vertex {
                    position: [
                        y as f32 * s.position - s.display,
                        x as f32 * s.position - s.display,
                        p * s.height,
                    ],
                    color: [shade, shade, shade],
                    normal: [0.0; 3],
                });

                if emits_quad(self.edge_policy, i, x, width, height) {
                    let a = i as u32;
                    let b = (i + 1) as u32;
                    let c = (i + width) as u32;
                    let d = (i + width + 1) as u32;
                    indices.extend_from_slice(&[a, b, c, c, b, d]);
                }
            }
        }

        debug!(
            "built {}x{} grid: {} vertices, {} triangles ({:?} edges)",
            width,
            height,
            vertices.len(),
            indices.len() / 3,
            self.edge_policy
        );

        Ok(MeshBuffers::new_unchecked(
            source.width(),
            source.height(),
            vertices,
            indices,
        ))
    }
}

/// Build a grid with the legacy edge policy.
pub fn build_grid<S: HeightmapSource + ?Sized>(
    source: &S,
    scales: &MeshScales,
) -> Result<MeshBuffers> {
    GridBuilder::new(*scales).build(source)
}

/// Whether the quad anchored at slot `i` (column `x`) is triangulated.
///
/// Under both policies the far corner `i + width + 1` must exist; with the
/// legacy rule on a grid narrower than it is tall, that drops the single quad
/// anchored at the last column of the second-to-last row.
pub fn emits_quad(policy: EdgePolicy, i: usize, x: usize, width: usize, height: usize) -> bool {
    let total = width * height;
    let has_row_below = i + width < total;
    let in_columns = match policy {
        EdgePolicy::Legacy => x + 1 < height,
        EdgePolicy::Corrected => x + 1 < width,
    };
    has_row_below && in_columns && i + width + 1 < total
}

fn checked_vertex_count<S: HeightmapSource + ?Sized>(source: &S) -> Result<usize> {
    let (width, height, bpp) = (
        source.width() as usize,
        source.height() as usize,
        source.bytes_per_pixel() as usize,
    );

    let count = width
        .checked_mul(height)
        .ok_or_else(|| TerrainError::invalid_input(format!("{width}x{height} grid overflows")))?;
    if count == 0 {
        return Err(TerrainError::invalid_input(format!(
            "heightmap has no pixels ({width}x{height})"
        )));
    }
    if count > u32::MAX as usize {
        return Err(TerrainError::invalid_input(format!(
            "{count} vertices exceed the 32-bit index range"
        )));
    }
    if bpp == 0 {
        return Err(TerrainError::invalid_input("bytes per pixel is zero"));
    }

    let required = count
        .checked_mul(bpp)
        .ok_or_else(|| TerrainError::invalid_input("pixel buffer size overflows"))?;
    let available = source.pixels().len();
    if available < required {
        return Err(TerrainError::invalid_input(format!(
            "pixel buffer holds {available} bytes, {width}x{height}x{bpp} needs {required}"
        )));
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::pixels::PixelBuffer;
    use approx::assert_relative_eq;

    fn ramp(width: u32, height: u32) -> PixelBuffer {
        let data = (0..width * height).map(|v| (v % 256) as u8).collect();
        PixelBuffer::luma(width, height, data)
    }

    #[test]
    fn two_by_two_scenario() {
        let pixels = PixelBuffer::luma(2, 2, vec![0, 128, 128, 255]);
        let mesh = build_grid(&pixels, &MeshScales::default()).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices(), &[0, 1, 2, 2, 1, 3]);

        let v = mesh.vertices();
        assert_relative_eq!(v[0].position[2], 0.0);
        assert_relative_eq!(v[1].position[2], 6.4, epsilon = 1e-5);
        assert_relative_eq!(v[2].position[2], 6.4, epsilon = 1e-5);
        assert_relative_eq!(v[3].position[2], 12.75, epsilon = 1e-5);
        assert_relative_eq!(v[1].color[0], 128.0 / 255.0);
        assert_relative_eq!(v[3].color[0], 1.0);
    }

    #[test]
    fn row_feeds_x_and_column_feeds_y() {
        let mesh = build_grid(&ramp(3, 2), &MeshScales::default()).unwrap();
        let v = mesh.vertices();

        // slot 2 is row 0, column 2
        assert_relative_eq!(v[2].position[0], -12.8, epsilon = 1e-5);
        assert_relative_eq!(v[2].position[1], 2.0 * 0.1 - 12.8, epsilon = 1e-5);
        // slot 3 is row 1, column 0
        assert_relative_eq!(v[3].position[0], 0.1 - 12.8, epsilon = 1e-5);
        assert_relative_eq!(v[3].position[1], -12.8, epsilon = 1e-5);
    }

    #[test]
    fn normals_left_unset() {
        let mesh = build_grid(&ramp(4, 4), &MeshScales::default()).unwrap();
        assert!(mesh.vertices().iter().all(|v| v.normal == [0.0; 3]));
    }

    #[test]
    fn only_first_channel_is_sampled() {
        let pixels = PixelBuffer::new(2, 1, 3, vec![10, 200, 200, 20, 255, 255]);
        let mesh = build_grid(&pixels, &MeshScales::default()).unwrap();
        let v = mesh.vertices();
        assert_relative_eq!(v[0].position[2], 10.0 * 0.05, epsilon = 1e-6);
        assert_relative_eq!(v[1].position[2], 20.0 * 0.05, epsilon = 1e-6);
    }

    #[test]
    fn square_grid_emits_every_interior_cell() {
        let mesh = build_grid(&ramp(5, 5), &MeshScales::default()).unwrap();
        assert_eq!(mesh.indices().len(), 6 * 4 * 4);
    }

    #[test]
    fn legacy_wide_grid_bounds_columns_by_height() {
        // W=4, H=2: only column 0 satisfies x < H - 1
        let mesh = build_grid(&ramp(4, 2), &MeshScales::default()).unwrap();
        assert_eq!(mesh.indices(), &[0, 1, 4, 4, 1, 5]);
    }

    #[test]
    fn legacy_tall_grid_wraps_but_stays_in_range() {
        // W=2, H=4: every column passes x < 3, the last-column quads wrap and
        // the one anchored at slot 5 would need vertex 8
        let mesh = build_grid(&ramp(2, 4), &MeshScales::default()).unwrap();
        assert_eq!(mesh.triangle_count(), 10);
        assert_eq!(&mesh.indices()[6..12], &[1, 2, 3, 3, 2, 4]);
        assert!(mesh.indices().iter().all(|&i| i < 8));
    }

    #[test]
    fn corrected_policy_uses_width() {
        let builder = GridBuilder::new(MeshScales::default()).with_edge_policy(EdgePolicy::Corrected);
        let tall = builder.build(&ramp(2, 4)).unwrap();
        assert_eq!(tall.triangle_count(), 2 * 3);
        let wide = builder.build(&ramp(4, 2)).unwrap();
        assert_eq!(wide.triangle_count(), 2 * 3);
    }

    #[test]
    fn rejects_empty_grid() {
        let err = build_grid(&PixelBuffer::luma(0, 3, vec![]), &MeshScales::default()).unwrap_err();
        assert!(matches!(err, TerrainError::InvalidInput(_)));
    }

    #[test]
    fn rejects_zero_bytes_per_pixel() {
        let pixels = PixelBuffer::new(2, 2, 0, vec![0; 4]);
        assert!(build_grid(&pixels, &MeshScales::default()).is_err());
    }

    #[test]
    fn rejects_grid_beyond_u32_indices() {
        // 65536 * 65537 vertices; the count check runs before the buffer is read
        let err = build_grid(&PixelBuffer::luma(65536, 65537, vec![]), &MeshScales::default())
            .unwrap_err();
        assert!(matches!(err, TerrainError::InvalidInput(_)));
        assert!(err.to_string().contains("32-bit index range"));
    }

    #[test]
    fn rejects_truncated_buffer() {
        let pixels = PixelBuffer::new(2, 2, 3, vec![0; 11]);
        let err = build_grid(&pixels, &MeshScales::default()).unwrap_err();
        assert!(err.to_string().contains("needs 12"));
    }
}
