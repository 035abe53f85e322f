/// An axis-aligned face rectangle in [`GrayImage`] pixel coordinates.
///
/// Coordinates are signed because detection engines may report boxes
/// that extend past the image edges; such regions fail [`is_valid`] and
/// must be clamped or rejected before any pixel access.
///
/// [`GrayImage`]: crate::shared::gray_image::GrayImage
/// [`is_valid`]: FaceRegion::is_valid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True iff the region lies fully inside an `image_w` x `image_h`
    /// image and has positive area.
    pub fn is_valid(&self, image_w: usize, image_h: usize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && self.x + self.width <= image_w as i32
            && self.y + self.height <= image_h as i32
    }

    /// Intersection with the image rectangle.
    ///
    /// Shrinks an out-of-bounds region instead of failing; losing a few
    /// border pixels is preferable to dropping the detection. The result
    /// may still be invalid (zero area) when there is no overlap at all.
    pub fn clamp_to(&self, image_w: usize, image_h: usize) -> FaceRegion {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = (self.x + self.width).min(image_w as i32);
        let y2 = (self.y + self.height).min(image_h as i32);
        FaceRegion {
            x: x1,
            y: y1,
            width: (x2 - x1).max(0),
            height: (y2 - y1).max(0),
        }
    }
}
