//! Decoded heightmap pixels and the decoder interface the grid builder reads from.

/// Read-only view of a decoded raster image.
///
/// Intensity at grid cell `(row, col)` is the byte at `(row * width + col) * bytes_per_pixel`;
/// any further channels of that pixel are ignored by the mesh passes.
pub trait HeightmapSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn bytes_per_pixel(&self) -> u32;
    fn pixels(&self) -> &[u8];
}

/// Owned pixel buffer, the plain in-memory form of a decoded heightmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, bytes_per_pixel: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
            data,
        }
    }

    /// Single-channel 8-bit buffer.
    pub fn luma(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self::new(width, height, 1, data)
    }
}

impl HeightmapSource for PixelBuffer {
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

impl<T: HeightmapSource + ?Sized> HeightmapSource for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn bytes_per_pixel(&self) -> u32 {
        (**self).bytes_per_pixel()
    }

    fn pixels(&self) -> &[u8] {
        (**self).pixels()
    }
}
