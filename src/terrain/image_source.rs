//! Heightmap decoding on top of the `image` crate.

use std::path::Path;

use image::DynamicImage;
use log::info;

use crate::terrain::error::{Result, TerrainError};
use crate::terrain::pixels::HeightmapSource;

/// Decoded 8-bit heightmap. Luma, luma+alpha, RGB and RGBA images keep their
/// channel layout; anything else is converted to 8-bit RGB.
#[derive(Clone, Debug)]
pub struct ImageHeightmap {
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
    data: Vec<u8>,
}

impl ImageHeightmap {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| TerrainError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let heightmap = Self::from_image(image);
        info!(
            "decoded {}: {}x{}, {} bytes per pixel",
            path.display(),
            heightmap.width,
            heightmap.height,
            heightmap.bytes_per_pixel
        );
        Ok(heightmap)
    }

    pub fn from_image(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (bytes_per_pixel, data) = match image {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            other => (3, other.to_rgb8().into_raw()),
        };

        Self {
            width,
            height,
            bytes_per_pixel,
            data,
        }
    }
}

impl HeightmapSource for ImageHeightmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bytes_per_pixel(&self) -> u32 {
        self.bytes_per_pixel
    }

    fn pixels(&self) -> &[u8] {
        &self.data
    }
}
