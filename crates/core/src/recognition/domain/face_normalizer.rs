use crate::shared::gray_image::GrayImage;
use crate::shared::region::FaceRegion;

/// Crops a detected face out of the working image and rescales it to
/// the canonical classification size.
///
/// A region that cannot be reconciled with the image bounds yields
/// `None`; one bad detection must not abort the frame loop. The output
/// owns its pixels, so the source image may be overwritten by the next
/// frame immediately.
pub struct FaceNormalizer {
    out_width: u32,
    out_height: u32,
}

impl FaceNormalizer {
    pub fn new(out_width: u32, out_height: u32) -> Self {
        Self {
            out_width,
            out_height,
        }
    }

    pub fn normalize(&self, image: &GrayImage, region: &FaceRegion) -> Option<GrayImage> {
        // Detectors may report boxes nudged past an edge; shrink to the
        // overlap and only give up when nothing usable remains.
        let region = region.clamp_to(image.width(), image.height());
        if !region.is_valid(image.width(), image.height()) {
            return None;
        }

        let cropped = crop(image, &region);
        let resized = image::imageops::resize(
            &cropped,
            self.out_width,
            self.out_height,
            image::imageops::FilterType::Triangle,
        );
        Some(GrayImage::from_packed(
            resized.into_raw(),
            self.out_width as usize,
            self.out_height as usize,
        ))
    }
}

fn crop(image: &GrayImage, region: &FaceRegion) -> image::GrayImage {
    let (x, y) = (region.x as usize, region.y as usize);
    let (w, h) = (region.width as usize, region.height as usize);
    let mut pixels = Vec::with_capacity(w * h);
    for row in 0..h {
        pixels.extend_from_slice(&image.row(y + row)[x..x + w]);
    }
    image::GrayImage::from_raw(w as u32, h as u32, pixels)
        .expect("crop buffer length matches region dimensions")
}
