use std::borrow::Cow;

/// Rows are padded so each starts on a 4-byte boundary, matching the
/// aligned scanlines of typical image memory.
const ROW_ALIGN: usize = 4;

/// A single-channel 8-bit image with an explicit row stride.
///
/// The stride may exceed the width; every access goes through it, so a
/// `GrayImage` can alias buffers with padded scanlines without copying.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
    stride: usize,
}

impl GrayImage {
    /// Allocates a zeroed image with an aligned stride.
    pub fn new(width: usize, height: usize) -> Self {
        let stride = aligned_stride(width);
        Self {
            data: vec![0; stride * height],
            width,
            height,
            stride,
        }
    }

    /// Builds an image from tightly packed pixels (stride == width).
    pub fn from_packed(pixels: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width * height,
            "packed pixel length must equal width * height"
        );
        Self {
            data: pixels,
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

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.stride + x] = value;
    }

    /// The `width` visible pixels of row `y`, excluding stride padding.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.stride..y * self.stride + self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.data[y * self.stride..y * self.stride + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Pixels with stride padding stripped. Borrows when the image is
    /// already tightly packed.
    pub fn packed(&self) -> Cow<'_, [u8]> {
        if self.stride == self.width {
            Cow::Borrowed(&self.data)
        } else {
            let mut out = Vec::with_capacity(self.width * self.height);
            for row in self.rows() {
                out.extend_from_slice(row);
            }
            Cow::Owned(out)
        }
    }

    /// Stable address of the backing buffer, used to verify reuse.
    pub fn buffer_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }
}

fn aligned_stride(width: usize) -> usize {
    width.div_ceil(ROW_ALIGN) * ROW_ALIGN
}
