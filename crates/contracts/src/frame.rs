//! Frame - decoded, display-ready pixels.

/// Decoded RGB frame.
///
/// Pixels are stored column-major (`x` outer, `y` inner) with three bytes per
/// pixel, matching the orientation of the presentation surface:
/// the pixel at `(x, y)` starts at `(x * height + y) * 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Bytes per pixel
    pub const CHANNELS: usize = 3;

    /// Build a frame from column-major RGB bytes.
    ///
    /// Returns `None` when `pixels` does not hold exactly `width * height * 3` bytes.
    pub fn from_columns(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(Self::CHANNELS)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw column-major RGB bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// RGB value at `(x, y)`, `None` when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (x as usize * self.height as usize + y as usize) * Self::CHANNELS;
        let px = &self.pixels[offset..offset + Self::CHANNELS];
        Some([px[0], px[1], px[2]])
    }
}
