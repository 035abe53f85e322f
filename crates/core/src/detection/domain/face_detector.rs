use crate::shared::gray_image::GrayImage;
use crate::shared::region::FaceRegion;

/// Domain interface for face localization.
///
/// Candidates come back in the engine's internal scan order; callers
/// impose no re-sorting. Implementations may keep mutable engine state,
/// hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, image: &GrayImage) -> Result<Vec<FaceRegion>, Box<dyn std::error::Error>>;
}
