use crate::shared::frame::CameraFrame;
use crate::shared::gray_image::GrayImage;

/// Decimates camera frames into a reduced grayscale working image.
///
/// Samples every `factor`-th luminance byte (nearest-neighbor, no
/// averaging); detection does not need full resolution and the shrink
/// keeps the per-frame cost bounded. The destination buffer is owned
/// here and reused across frames; it is reallocated only when the
/// requested dimensions change (first frame, or a camera resolution
/// switch).
pub struct FrameDownsampler {
    factor: usize,
    output: Option<GrayImage>,
}

impl FrameDownsampler {
    pub fn new(factor: usize) -> Self {
        debug_assert!(factor >= 1, "subsampling factor must be at least 1");
        Self {
            factor,
            output: None,
        }
    }

    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Overwrites the shared working image with the decimated frame and
    /// returns it. The result stays valid until the next call.
    pub fn downsample(&mut self, frame: &CameraFrame) -> &GrayImage {
        let f = self.factor;
        let out_w = frame.width() / f;
        let out_h = frame.height() / f;

        let needs_realloc = !matches!(
            self.output,
            Some(ref img) if img.width() == out_w && img.height() == out_h
        );
        if needs_realloc {
            self.output = Some(GrayImage::new(out_w, out_h));
        }

        let image = self.output.as_mut().unwrap();
        let luma = frame.luma();
        let src_row_step = f * frame.width();
        for y in 0..out_h {
            let src_row = &luma[y * src_row_step..];
            let dst_row = image.row_mut(y);
            for (x, dst) in dst_row.iter_mut().enumerate() {
                *dst = src_row[x * f];
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn gradient_frame(width: usize, height: usize) -> CameraFrame {
        let data: Vec<u8> = (0..width * height).map(|i| (i % 251) as u8).collect();
        CameraFrame::new(data, width, height)
    }

    #[rstest]
    #[case::factor_4(640, 480, 4, 160, 120)]
    #[case::factor_2(100, 60, 2, 50, 30)]
    #[case::factor_1(33, 21, 1, 33, 21)]
    #[case::truncating(101, 61, 4, 25, 15)]
    fn test_output_dimensions(
        #[case] w: usize,
        #[case] h: usize,
        #[case] factor: usize,
        #[case] out_w: usize,
        #[case] out_h: usize,
    ) {
        let mut ds = FrameDownsampler::new(factor);
        let img = ds.downsample(&gradient_frame(w, h));
        assert_eq!(img.width(), out_w);
        assert_eq!(img.height(), out_h);
    }

    #[test]
    fn test_nearest_neighbor_sampling() {
        // 8x4 frame, factor 2: destination (x, y) takes source (2x, 2y)
        let frame = gradient_frame(8, 4);
        let mut ds = FrameDownsampler::new(2);
        let img = ds.downsample(&frame);
        for y in 0..2 {
            for x in 0..4 {
                let expected = frame.luma()[y * 2 * 8 + x * 2];
                assert_eq!(img.pixel(x, y), expected);
            }
        }
    }

    #[test]
    fn test_buffer_reused_across_same_size_frames() {
        let mut ds = FrameDownsampler::new(4);
        let first_ptr = ds.downsample(&gradient_frame(64, 48)).buffer_ptr();
        let second_ptr = ds.downsample(&gradient_frame(64, 48)).buffer_ptr();
        assert_eq!(first_ptr, second_ptr);
    }

    #[test]
    fn test_buffer_reallocated_on_resolution_change() {
        let mut ds = FrameDownsampler::new(4);
        let first = ds.downsample(&gradient_frame(64, 48)).buffer_ptr();
        let second = ds.downsample(&gradient_frame(128, 96)).buffer_ptr();
        assert_ne!(first, second);
    }

    #[test]
    fn test_second_frame_overwrites_pixels() {
        let mut ds = FrameDownsampler::new(2);
        ds.downsample(&CameraFrame::new(vec![200u8; 16], 4, 4));
        let img = ds.downsample(&CameraFrame::new(vec![10u8; 16], 4, 4));
        assert!(img.rows().all(|row| row.iter().all(|&p| p == 10)));
    }
}
