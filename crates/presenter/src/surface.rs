//! Display surfaces

use contracts::Frame;

use crate::error::SurfaceError;

/// Fixed-size, double-buffered output surface.
///
/// `blit` writes the back buffer, `present` makes it visible.
/// Presenting without a new blit shows the previous contents again.
pub trait Surface {
    /// Surface size in pixels
    fn size(&self) -> (u32, u32);

    /// Copy `frame` to the back buffer at the origin, clipped to the surface
    fn blit(&mut self, frame: &Frame) -> Result<(), SurfaceError>;

    /// Swap buffers
    fn present(&mut self) -> Result<(), SurfaceError>;
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn blit(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        (**self).blit(frame)
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        (**self).present()
    }
}

/// Visit every frame pixel that lands inside a `width`×`height` surface.
pub(crate) fn for_each_visible(
    frame: &Frame,
    width: u32,
    height: u32,
    mut f: impl FnMut(usize, usize, &[u8]),
) {
    let visible_w = frame.width().min(width) as usize;
    let visible_h = frame.height().min(height) as usize;
    let frame_h = frame.height() as usize;
    let bytes = frame.as_bytes();

    for x in 0..visible_w {
        let column = &bytes[x * frame_h * Frame::CHANNELS..];
        for y in 0..visible_h {
            let offset = y * Frame::CHANNELS;
            f(x, y, &column[offset..offset + Frame::CHANNELS]);
        }
    }
}

/// In-memory surface, used without a window and in tests
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    /// Row-major RGB
    back: Vec<u8>,
    front: Vec<u8>,
    blits: u64,
    presents: u64,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::init(format!(
                "invalid surface size {width}x{height}"
            )));
        }
        let len = width as usize * height as usize * Frame::CHANNELS;
        Ok(Self {
            width,
            height,
            back: vec![0; len],
            front: vec![0; len],
            blits: 0,
            presents: 0,
        })
    }

    /// Visible RGB value at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * Frame::CHANNELS;
        let px = &self.front[offset..offset + Frame::CHANNELS];
        Some([px[0], px[1], px[2]])
    }

    /// Visible row-major RGB bytes
    pub fn front(&self) -> &[u8] {
        &self.front
    }

    pub fn blit_count(&self) -> u64 {
        self.blits
    }

    pub fn present_count(&self) -> u64 {
        self.presents
    }
}

impl Surface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn blit(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        let width = self.width as usize;
        let back = &mut self.back;
        for_each_visible(frame, self.width, self.height, |x, y, rgb| {
            let offset = (y * width + x) * Frame::CHANNELS;
            back[offset..offset + Frame::CHANNELS].copy_from_slice(rgb);
        });
        self.blits += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        // 后缓冲保留上一帧内容，swap 后仍然一致
        self.front.copy_from_slice(&self.back);
        self.presents += 1;
        Ok(())
    }
}
