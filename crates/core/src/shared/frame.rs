/// A raw camera frame as delivered by the capture collaborator.
///
/// The buffer starts with a full-resolution luminance plane in row-major
/// order (the layout of planar YUV camera formats such as NV21); any
/// chroma bytes that follow are ignored by the pipeline. The frame is
/// borrowed transiently for one processing call and never retained.
#[derive(Clone, Debug)]
pub struct CameraFrame {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl CameraFrame {
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert!(
            data.len() >= width * height,
            "frame buffer must hold at least a width * height luma plane"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// The full-resolution luminance plane.
    pub fn luma(&self) -> &[u8] {
        &self.data[..self.width * self.height]
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}
