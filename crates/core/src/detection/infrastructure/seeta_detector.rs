use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::gray_image::GrayImage;
use crate::shared::region::FaceRegion;

/// Pyramid scale step between detection passes; carries the 1.1 scan
/// ratio of the staged classifier this detector replaces.
const PYRAMID_SCALE_FACTOR: f32 = 1.0 / 1.1;

/// Minimum stage score for a window to count as a face.
const SCORE_THRESH: f64 = 2.0;

const MIN_FACE_SIZE: u32 = 20;
const SLIDE_WINDOW_STEP: u32 = 4;

#[derive(Error, Debug)]
pub enum DetectorInitError {
    #[error("failed to read detector model {path}: {source}")]
    ModelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("detector model {path} is corrupt: {source}")]
    ModelParse {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Face detector backed by the `rustface` staged classifier engine.
///
/// The model is parsed once at construction; a missing or corrupt model
/// file is fatal, since no detection can proceed without it. The engine
/// itself holds non-`Send` scratch state, so a fresh detector instance
/// is created from the parsed model on every call (the model is plain
/// data and cheap to share).
pub struct SeetaFaceDetector {
    model: rustface::Model,
}

impl SeetaFaceDetector {
    pub fn from_model_file(path: &Path) -> Result<Self, DetectorInitError> {
        let bytes = fs::read(path).map_err(|source| DetectorInitError::ModelRead {
            path: path.to_path_buf(),
            source,
        })?;
        let model = rustface::read_model(Cursor::new(bytes)).map_err(|source| {
            DetectorInitError::ModelParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::info!("loaded detector model from {}", path.display());
        Ok(Self { model })
    }
}

impl FaceDetector for SeetaFaceDetector {
    fn detect(&mut self, image: &GrayImage) -> Result<Vec<FaceRegion>, Box<dyn std::error::Error>> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESH);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        let pixels = image.packed();
        let data = rustface::ImageData::new(&pixels, image.width() as u32, image.height() as u32);
        let faces = detector.detect(&data);

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceRegion::new(
                    bbox.x(),
                    bbox.y(),
                    bbox.width() as i32,
                    bbox.height() as i32,
                )
            })
            .collect())
    }
}
