pub mod engine;
pub mod error;
pub mod grid;
pub mod image_source;
pub mod mesh;
pub mod normals;
pub mod pixels;

use log::warn;

pub use engine::{LoadedTerrain, TerrainEngine, TerrainResult};
pub use error::{Result, TerrainError};
pub use grid::{GridBuilder, build_grid};
pub use image_source::ImageHeightmap;
pub use mesh::{EdgePolicy, MeshBuffers, MeshScales, Vertex};
pub use normals::{NormalReport, NormalRule, estimate_mesh_normals, estimate_normals, face_normal};
pub use pixels::{HeightmapSource, PixelBuffer};

/// Run the grid pass followed by the normal pass.
pub fn build_terrain<S: HeightmapSource + ?Sized>(
    source: &S,
    scales: &MeshScales,
    edge_policy: EdgePolicy,
) -> Result<(MeshBuffers, NormalReport)> {
    let mut mesh = GridBuilder::new(*scales)
        .with_edge_policy(edge_policy)
        .build(source)?;
    let report = estimate_mesh_normals(&mut mesh)?;

    if report.degenerate > 0 {
        warn!(
            "{} of {} normals came from collinear triangles and are not finite",
            report.degenerate, report.written
        );
    }

    Ok((mesh, report))
}
