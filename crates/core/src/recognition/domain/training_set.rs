use crate::shared::gray_image::GrayImage;

/// Ordered training gallery: image `i` carries `labels()[i]`.
///
/// Built once per training pass and handed to the classifier, which
/// consumes it to fit a model; it is not retained afterwards.
#[derive(Clone, Debug, Default)]
pub struct TrainingSet {
    images: Vec<GrayImage>,
    labels: Vec<i32>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: GrayImage, label: i32) {
        self.images.push(image);
        self.labels.push(label);
    }

    pub fn images(&self) -> &[GrayImage] {
        &self.images
    }

    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
