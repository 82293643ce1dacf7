//! RGBA frame storage

/// Frame width in pixels
pub const FRAME_WIDTH: usize = 256;
/// Frame height in pixels
pub const FRAME_HEIGHT: usize = 240;
/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;
/// Total byte length of one frame
pub const FRAME_BYTES: usize = FRAME_WIDTH * FRAME_HEIGHT * BYTES_PER_PIXEL;

/// One rendered frame
///
/// A buffer belongs to exactly one side at a time: the engine renders into
/// it, then ownership moves through the exchange to the presenter. The
/// sequence number is stamped when the frame is published.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pixels: Box<[u8]>,
    sequence: u64,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: vec![0u8; FRAME_BYTES].into_boxed_slice(),
            sequence: 0,
        }
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Publish-order stamp, 0 for a frame that was never published
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    /// Write one pixel; coordinates outside the frame are ignored
    pub fn put_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if x >= FRAME_WIDTH || y >= FRAME_HEIGHT {
            return;
        }
        let offset = (y * FRAME_WIDTH + x) * BYTES_PER_PIXEL;
        self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    /// Fill the whole frame with one color
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for pixel in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&rgba);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_dimensions() {
        let frame = FrameBuffer::new();
        assert_eq!(frame.pixels().len(), FRAME_BYTES);
        assert_eq!(FRAME_BYTES, 256 * 240 * 4);
        assert_eq!(frame.sequence(), 0);
    }

    #[test]
    fn test_put_pixel() {
        let mut frame = FrameBuffer::new();
        frame.put_pixel(0, 0, [1, 2, 3, 4]);
        frame.put_pixel(255, 239, [5, 6, 7, 8]);

        assert_eq!(&frame.pixels()[0..4], &[1, 2, 3, 4]);
        let last = FRAME_BYTES - BYTES_PER_PIXEL;
        assert_eq!(&frame.pixels()[last..], &[5, 6, 7, 8]);
    }

    #[test]
    fn test_put_pixel_out_of_bounds_ignored() {
        let mut frame = FrameBuffer::new();
        frame.put_pixel(256, 0, [0xFF; 4]);
        frame.put_pixel(0, 240, [0xFF; 4]);

        assert!(frame.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fill() {
        let mut frame = FrameBuffer::new();
        frame.fill([10, 20, 30, 255]);

        for pixel in frame.pixels().chunks_exact(BYTES_PER_PIXEL) {
            assert_eq!(pixel, &[10, 20, 30, 255]);
        }
    }
}
