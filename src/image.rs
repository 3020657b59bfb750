// image.rs — Runtime-sized RGBA8 image container.
//
// Row-major, contiguous buffer with explicit stride, measured in *pixels*
// (not bytes). Stride may exceed width so that each row can start at an
// aligned address when the buffer is handed to the GPU:
//
//   data index:  0  1  2  3 [4]  5  6  7  8 [9] 10 11 12 13 [14]
//   pixel:       ■  ■  ■  ■  ·   ■  ■  ■  ■  ·   ■  ■  ■  ■  ·
//   row:         |--- row 0 ---|  |--- row 1 ---|  |--- row 2 ---|
//
//   (stride = 5, width = 4; [4], [9], [14] are padding pixels)
//
// The pixel type is fixed at RGBA8 — the fill target is a 4-channel,
// 8-bit-per-channel image and nothing in this crate needs another layout.

use std::fmt;

/// A 4-channel pixel: `[r, g, b, a]`, 8 bits per channel.
pub type Rgba = [u8; 4];

/// A 2D RGBA8 image with runtime dimensions.
pub struct Image {
    /// Pixel data in row-major order. Length = height * stride.
    data: Vec<Rgba>,
    /// Image width in pixels.
    width: usize,
    /// Image height in pixels.
    height: usize,
    /// Row stride in pixels. stride >= width; pixels for row y start at
    /// index y * stride.
    stride: usize,
}

impl Image {
    /// Create a zero-initialized image (all pixels transparent black),
    /// stride == width.
    pub fn new(width: usize, height: usize) -> Self {
        Self::new_with_stride(width, height, width)
    }

    /// Create a zero-initialized image with an explicit stride.
    ///
    /// # Panics
    /// Panics if `stride < width`.
    pub fn new_with_stride(width: usize, height: usize, stride: usize) -> Self {
        assert!(stride >= width, "stride {stride} < width {width}");
        Image {
            data: vec![Rgba::default(); height * stride],
            width,
            height,
            stride,
        }
    }

    /// Build an image from a row-major pixel vector, stride == width.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<Rgba>) -> Self {
        assert_eq!(data.len(), width * height, "pixel count mismatch");
        Image {
            data,
            width,
            height,
            stride: width,
        }
    }

    /// Build an image where every pixel has the same value. Used by tests
    /// to set up a known prior state before a partial fill.
    pub fn filled(width: usize, height: usize, pixel: Rgba) -> Self {
        Image {
            data: vec![pixel; width * height],
            width,
            height,
            stride: width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Read the pixel at (x, y). Out-of-bounds coordinates are a caller
    /// bug, caught by a debug assertion.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.stride + x]
    }

    /// Write the pixel at (x, y).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, pixel: Rgba) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.stride + x] = pixel;
    }

    /// The active pixels of row `y` (width pixels, padding excluded).
    pub fn row(&self, y: usize) -> &[Rgba] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// The full backing slice, including any stride padding.
    pub fn as_slice(&self) -> &[Rgba] {
        &self.data
    }

    /// Compact copy of the pixel data as raw bytes, row-major, stride
    /// padding stripped. Length = width * height * 4.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height * 4);
        for y in 0..self.height {
            for px in self.row(y) {
                out.extend_from_slice(px);
            }
        }
        out
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image {{ {}×{}, stride {} }}",
            self.width, self.height, self.stride
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zero_initialized() {
        let img = Image::new(8, 4);
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 4);
        assert_eq!(img.get(0, 0), [0, 0, 0, 0]);
        assert_eq!(img.get(7, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn test_set_get_consistency() {
        let mut img = Image::new(3, 2);
        img.set(2, 1, [10, 20, 30, 40]);
        assert_eq!(img.get(2, 1), [10, 20, 30, 40]);
        assert_eq!(img.get(1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn test_from_vec_layout() {
        // 3×2, row-major: second row starts at index 3.
        let data: Vec<Rgba> = (0u8..6).map(|i| [i, i, i, 255]).collect();
        let img = Image::from_vec(3, 2, data);
        assert_eq!(img.get(2, 0), [2, 2, 2, 255]);
        assert_eq!(img.get(0, 1), [3, 3, 3, 255]);
    }

    #[test]
    fn test_stride_does_not_affect_pixel_access() {
        let mut img = Image::new_with_stride(3, 2, 8);
        img.set(0, 0, [1, 1, 1, 1]);
        img.set(2, 1, [2, 2, 2, 2]);
        assert_eq!(img.get(0, 0), [1, 1, 1, 1]);
        assert_eq!(img.get(2, 1), [2, 2, 2, 2]);
        assert_eq!(img.row(0).len(), 3);
    }

    #[test]
    fn test_to_bytes_strips_padding() {
        let mut img = Image::new_with_stride(2, 2, 4);
        img.set(0, 0, [1, 2, 3, 4]);
        img.set(1, 0, [5, 6, 7, 8]);
        img.set(0, 1, [9, 10, 11, 12]);
        img.set(1, 1, [13, 14, 15, 16]);
        let bytes = img.to_bytes();
        assert_eq!(bytes.len(), 2 * 2 * 4);
        assert_eq!(&bytes[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[8..], &[9, 10, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    #[should_panic(expected = "stride")]
    fn test_stride_smaller_than_width_rejected() {
        let _ = Image::new_with_stride(4, 1, 2);
    }
}
