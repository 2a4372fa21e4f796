use std::path::PathBuf;

use thiserror::Error;

/// Result type for terrain construction
pub type Result<T> = std::result::Result<T, TerrainError>;

/// Errors that can occur while turning a heightmap into a mesh
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("Invalid heightmap input: {0}")]
    InvalidInput(String),

    #[error("Failed to decode heightmap {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
}

impl TerrainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
