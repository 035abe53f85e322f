use std::path::PathBuf;

use thiserror::Error;

use crate::recognition::domain::training_set::TrainingSet;
use crate::shared::gray_image::GrayImage;

/// Outcome of classifying one normalized face.
#[derive(Clone, Debug, PartialEq)]
pub enum Prediction {
    /// No trained model exists; classification cannot be performed.
    /// Distinct from [`Prediction::Unknown`].
    Unavailable,
    /// A model exists but the face matched no gallery identity within
    /// the rejection threshold.
    Unknown,
    /// Best gallery match within the rejection threshold.
    Match { label: i32, distance: f64 },
}

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("cannot read training gallery {path}: {source}")]
    GalleryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("training gallery {path} contains no usable images")]
    EmptyGallery { path: PathBuf },
    #[error("training image {name} has no parsable identity label")]
    UnlabeledImage { name: String },
    #[error("failed to read training image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("training image {index} is {actual_w}x{actual_h}, expected {expected_w}x{expected_h}")]
    InconsistentDimensions {
        index: usize,
        expected_w: usize,
        expected_h: usize,
        actual_w: usize,
        actual_h: usize,
    },
    #[error("training set contains no images")]
    NoTrainingImages,
    #[error("training images are too uniform to fit a subspace model")]
    DegenerateGallery,
}

/// Domain interface for the gallery-trained face classifier.
///
/// `train` replaces any existing model wholesale; after a failed
/// training no model remains and `predict` reports
/// [`Prediction::Unavailable`].
pub trait FaceClassifier: Send {
    fn train(&mut self, set: &TrainingSet) -> Result<(), TrainingError>;

    fn predict(&self, face: &GrayImage) -> Prediction;

    fn is_trained(&self) -> bool;

    /// Discards any trained model; subsequent predictions report
    /// [`Prediction::Unavailable`] until the next successful `train`.
    fn reset(&mut self);
}
