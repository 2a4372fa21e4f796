//! Integration tests for heightmap-to-terrain conversion.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use glam::Vec3;
use heightmap3d::terrain::grid::emits_quad;
use heightmap3d::terrain::{
    EdgePolicy, GridBuilder, MeshScales, PixelBuffer, build_grid, build_terrain, face_normal,
};

fn noise(width: u32, height: u32) -> PixelBuffer {
    let mut state = 0x2545_f491_u32 ^ (width * 31 + height);
    let data = (0..width * height)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    PixelBuffer::luma(width, height, data)
}

const SHAPES: &[(u32, u32)] = &[(2, 2), (3, 2), (2, 3), (5, 5), (7, 3), (3, 7), (16, 9), (1, 4)];

// ─── Grid builder ─────────────────────────────────────────────

#[test]
fn vertex_count_matches_pixel_count() {
    for &(w, h) in SHAPES {
        let mesh = build_grid(&noise(w, h), &MeshScales::default()).unwrap();
        assert_eq!(mesh.vertex_count(), (w * h) as usize, "{w}x{h}");
        assert!(mesh.validate().is_ok());
    }
}

#[test]
fn indices_stay_in_range_for_every_shape() {
    for policy in [EdgePolicy::Legacy, EdgePolicy::Corrected] {
        for w in 1..12 {
            for h in 1..12 {
                let mesh = GridBuilder::new(MeshScales::default())
                    .with_edge_policy(policy)
                    .build(&noise(w, h))
                    .unwrap();
                assert_eq!(mesh.indices().len() % 3, 0);
                assert!(
                    mesh.indices().iter().all(|&i| i < w * h),
                    "{w}x{h} {policy:?}"
                );
            }
        }
    }
}

#[test]
fn qualifying_cells_emit_six_indices_in_order() {
    let (w, h) = (7u32, 5u32);
    let mesh = build_grid(&noise(w, h), &MeshScales::default()).unwrap();
    let (wu, hu) = (w as usize, h as usize);

    let mut expected = Vec::new();
    for y in 0..hu {
        for x in 0..wu {
            let i = y * wu + x;
            if emits_quad(EdgePolicy::Legacy, i, x, wu, hu) {
                let i = i as u32;
                expected.extend_from_slice(&[i, i + 1, i + w, i + w, i + 1, i + w + 1]);
            }
        }
    }

    assert_eq!(mesh.indices(), expected.as_slice());
    // columns are bounded by the height: 4 usable columns on each of 4 rows
    assert_eq!(mesh.triangle_count(), 2 * 4 * 4);
}

#[test]
fn colour_channels_are_equal_and_normalised() {
    let data: Vec<u8> = (0..=255).collect();
    let mesh = build_grid(&PixelBuffer::luma(16, 16, data), &MeshScales::default()).unwrap();

    for (i, v) in mesh.vertices().iter().enumerate() {
        let [r, g, b] = v.color;
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert!((0.0..=1.0).contains(&r));
        assert_relative_eq!(r, i as f32 / 255.0);
    }
}

#[test]
fn two_by_two_reference_mesh() {
    let pixels = PixelBuffer::luma(2, 2, vec![0, 128, 128, 255]);
    let (mesh, report) = build_terrain(&pixels, &MeshScales::default(), EdgePolicy::Legacy).unwrap();

    assert_eq!(mesh.indices(), &[0, 1, 2, 2, 1, 3]);
    assert_eq!(report.written, 1);

    let v = mesh.vertices();
    assert_abs_diff_eq!(v[0].position[2], 0.0);
    assert_relative_eq!(v[1].position[2], 6.4, epsilon = 1e-5);
    assert_relative_eq!(v[2].color[1], 128.0 / 255.0);

    let n = Vec3::from(v[0].normal);
    assert_relative_eq!(n.length(), 1.0, epsilon = 1e-6);
    // ab = (0, 0.1, 6.4), ac = (0.1, 0, 6.4)
    let expected = Vec3::new(-0.64, -0.64, 0.01).normalize();
    assert_relative_eq!(n.x, expected.x, epsilon = 1e-4);
    assert_relative_eq!(n.y, expected.y, epsilon = 1e-4);
    assert_relative_eq!(n.z, expected.z, epsilon = 1e-4);
}

// ─── Normal estimator ─────────────────────────────────────────

#[test]
fn estimated_normals_are_unit_length() {
    for &(w, h) in SHAPES.iter().filter(|(w, _)| *w > 1) {
        let (mesh, report) =
            build_terrain(&noise(w, h), &MeshScales::default(), EdgePolicy::Legacy).unwrap();
        assert_eq!(report.degenerate, 0);

        let written = ((w * h) as usize).saturating_sub(w as usize + 1);
        assert_eq!(report.written, written);
        for v in &mesh.vertices()[..written] {
            assert_relative_eq!(Vec3::from(v.normal).length(), 1.0, epsilon = 1e-5);
        }
    }
}

#[test]
fn parity_rule_on_four_by_four() {
    let (mesh, _) = build_terrain(&noise(4, 4), &MeshScales::default(), EdgePolicy::Legacy).unwrap();
    let p = |i: usize| Vec3::from(mesh.vertices()[i].position);

    assert_eq!(
        mesh.vertices()[0].normal,
        face_normal(p(0), p(1), p(4)).to_array()
    );
    assert_eq!(
        mesh.vertices()[1].normal,
        face_normal(p(5), p(2), p(6)).to_array()
    );
}

#[test]
fn degenerate_column_is_reported_not_raised() {
    let (mesh, report) =
        build_terrain(&noise(1, 4), &MeshScales::default(), EdgePolicy::Legacy).unwrap();
    assert_eq!(report.written, 2);
    assert_eq!(report.degenerate, 2);
    assert!(!mesh.vertices()[0].normal[2].is_finite());
}

// ─── Whole pipeline ───────────────────────────────────────────

#[test]
fn rebuilding_is_deterministic() {
    let pixels = noise(13, 8);
    let scales = MeshScales::default();
    let (a, _) = build_terrain(&pixels, &scales, EdgePolicy::Legacy).unwrap();
    let (b, _) = build_terrain(&pixels, &scales, EdgePolicy::Legacy).unwrap();

    let bytes_a: &[u8] = bytemuck::cast_slice(a.vertices());
    let bytes_b: &[u8] = bytemuck::cast_slice(b.vertices());
    assert_eq!(bytes_a, bytes_b);
    assert_eq!(a.indices(), b.indices());
}

#[test]
fn invalid_input_aborts_construction() {
    let scales = MeshScales::default();
    assert!(build_terrain(&PixelBuffer::luma(0, 0, vec![]), &scales, EdgePolicy::Legacy).is_err());
    assert!(build_terrain(&PixelBuffer::luma(3, 3, vec![0; 8]), &scales, EdgePolicy::Legacy).is_err());
}
