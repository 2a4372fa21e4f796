//! Per-slot normal estimation.
//!
//! Each slot takes the normal of one triangle chosen by the parity of its
//! index. This is not an average over adjacent faces; the shading of the
//! rendered terrain depends on exactly this rule.

use glam::Vec3;
use log::debug;

use crate::terrain::error::{Result, TerrainError};
use crate::terrain::mesh::{MeshBuffers, Vertex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalRule {
    /// `(v[i], v[i+1], v[i+W])`
    Even,
    /// `(v[i+W], v[i+1], v[i+W+1])`
    Odd,
}

impl NormalRule {
    pub fn for_slot(i: usize) -> Self {
        if i % 2 == 0 {
            NormalRule::Even
        } else {
            NormalRule::Odd
        }
    }

    /// Vertex slots `[A, B, C]` of the triangle sampled for slot `i`.
    pub fn triangle(self, i: usize, width: usize) -> [usize; 3] {
        match self {
            NormalRule::Even => [i, i + 1, i + width],
            NormalRule::Odd => [i + width, i + 1, i + width + 1],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalReport {
    pub written: usize,
    /// Slots whose triangle was collinear; their normal is NaN.
    pub degenerate: usize,
}

/// Normal of triangle `(a, b, c)` from the edges `ab` and `ac`.
///
/// Collinear input divides by zero and returns a non-finite vector.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;

    let n = Vec3::new(
        ac.y * ab.z - ac.z * ab.y,
        -(ab.z * ac.x - ab.x * ac.z),
        ac.x * ab.y - ac.y * ab.x,
    );

    let factor = (n.x * n.x + n.y * n.y + n.z * n.z).sqrt();
    Vec3::new(n.x / factor, n.y / factor, n.z / factor)
}

/// Write normals into slots `0..W*H - W - 1`; later slots are untouched.
pub fn estimate_normals(vertices: &mut [Vertex], width: u32, height: u32) -> Result<NormalReport> {
    let width = width as usize;
    let total = width * height as usize;
    if vertices.len() != total {
        return Err(TerrainError::invalid_input(format!(
            "{} vertices do not match a {}x{} grid",
            vertices.len(),
            width,
            height
        )));
    }

    let end = total.saturating_sub(width + 1);
    let mut report = NormalReport::default();

    for i in 0..end {
        let [a, b, c] = NormalRule::for_slot(i).triangle(i, width);
        let n = face_normal(
            Vec3::from(vertices[a].position),
            Vec3::from(vertices[b].position),
            Vec3::from(vertices[c].position),
        );

        if !n.is_finite() {
            report.degenerate += 1;
        }
        vertices[i].normal = n.to_array();
        report.written += 1;
    }

    debug!(
        "estimated {} normals ({} degenerate)",
        report.written, report.degenerate
    );
    Ok(report)
}

pub fn estimate_mesh_normals(mesh: &mut MeshBuffers) -> Result<NormalReport> {
    let (width, height) = (mesh.width(), mesh.height());
    estimate_normals(mesh.vertices_mut(), width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::grid::build_grid;
    use crate::terrain::mesh::MeshScales;
    use crate::terrain::pixels::PixelBuffer;
    use approx::assert_relative_eq;

    fn bumpy(width: u32, height: u32) -> PixelBuffer {
        let data = (0..width * height)
            .map(|i| ((i * 37 + i * i * 11) % 256) as u8)
            .collect();
        PixelBuffer::luma(width, height, data)
    }

    fn pos(mesh: &MeshBuffers, i: usize) -> Vec3 {
        Vec3::from(mesh.vertices()[i].position)
    }

    #[test]
    fn parity_selects_triangle() {
        assert_eq!(NormalRule::for_slot(0), NormalRule::Even);
        assert_eq!(NormalRule::for_slot(7), NormalRule::Odd);
        assert_eq!(NormalRule::Even.triangle(0, 4), [0, 1, 4]);
        assert_eq!(NormalRule::Odd.triangle(1, 4), [5, 2, 6]);
    }

    #[test]
    fn face_normal_of_axis_triangle() {
        let n = face_normal(Vec3::ZERO, Vec3::Y, Vec3::X);
        assert_eq!(n, Vec3::Z);
    }

    #[test]
    fn face_normal_is_unit_length() {
        let n = face_normal(
            Vec3::new(0.3, -1.0, 2.0),
            Vec3::new(1.5, 0.2, -0.4),
            Vec3::new(-2.0, 4.0, 1.0),
        );
        assert_relative_eq!(n.length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn collinear_triangle_is_not_finite() {
        let n = face_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(!n.is_finite());
    }

    #[test]
    fn four_by_four_parity() {
        let mut mesh = build_grid(&bumpy(4, 4), &MeshScales::default()).unwrap();
        estimate_mesh_normals(&mut mesh).unwrap();

        let n0 = face_normal(pos(&mesh, 0), pos(&mesh, 1), pos(&mesh, 4));
        let n1 = face_normal(pos(&mesh, 5), pos(&mesh, 2), pos(&mesh, 6));
        assert_eq!(mesh.vertices()[0].normal, n0.to_array());
        assert_eq!(mesh.vertices()[1].normal, n1.to_array());
    }

    #[test]
    fn flat_terrain_faces_up() {
        let mut mesh = build_grid(&PixelBuffer::luma(3, 3, vec![90; 9]), &MeshScales::default())
            .unwrap();
        let report = estimate_mesh_normals(&mut mesh).unwrap();
        assert_eq!(report.written, 5);
        for i in [0, 1, 3, 4] {
            let n = mesh.vertices()[i].normal;
            assert_relative_eq!(n[0], 0.0, epsilon = 1e-6);
            assert_relative_eq!(n[1], 0.0, epsilon = 1e-6);
            assert_relative_eq!(n[2], 1.0, epsilon = 1e-6);
        }
        // slot 2 sits on the last column, its even triangle reaches back to
        // the start of the next row and flips
        assert_relative_eq!(mesh.vertices()[2].normal[2], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn trailing_slots_keep_their_normal() {
        let mut mesh = build_grid(&bumpy(3, 3), &MeshScales::default()).unwrap();
        estimate_mesh_normals(&mut mesh).unwrap();
        for v in &mesh.vertices()[5..] {
            assert_eq!(v.normal, [0.0; 3]);
        }
    }

    #[test]
    fn single_column_grid_is_degenerate() {
        let mut mesh = build_grid(&PixelBuffer::luma(1, 3, vec![1, 2, 3]), &MeshScales::default())
            .unwrap();
        let report = estimate_mesh_normals(&mut mesh).unwrap();
        assert_eq!(report, NormalReport { written: 1, degenerate: 1 });
        assert!(mesh.vertices()[0].normal[0].is_nan());
    }

    #[test]
    fn single_row_writes_nothing() {
        let mut mesh = build_grid(&PixelBuffer::luma(4, 1, vec![5; 4]), &MeshScales::default())
            .unwrap();
        assert_eq!(estimate_mesh_normals(&mut mesh).unwrap().written, 0);
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let mut verts = vec![Vertex::default(); 5];
        assert!(estimate_normals(&mut verts, 2, 3).is_err());
    }

    #[test]
    fn mesh_pass_matches_slice_pass() {
        let mut mesh = build_grid(&bumpy(5, 4), &MeshScales::default()).unwrap();
        let mut verts = mesh.vertices().to_vec();

        let from_mesh = estimate_mesh_normals(&mut mesh).unwrap();
        let from_slice = estimate_normals(&mut verts, 5, 4).unwrap();

        assert_eq!(from_mesh.written, from_slice.written);
        assert_eq!(from_mesh.written, 5 * 4 - 5 - 1);
        assert_eq!(
            bytemuck::cast_slice::<Vertex, u8>(mesh.vertices()),
            bytemuck::cast_slice::<Vertex, u8>(&verts)
        );
    }
}
