use std::path::Path;

use crate::detection::domain::downsampler::FrameDownsampler;
use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::recognition_sink::{RecognitionSink, SessionHandle};
use crate::pipeline::snapshot_writer::SnapshotWriter;
use crate::recognition::domain::face_classifier::{FaceClassifier, Prediction};
use crate::recognition::domain::face_normalizer::FaceNormalizer;
use crate::recognition::domain::label_table::LabelTable;
use crate::recognition::infrastructure::gallery_loader::load_gallery;
use crate::shared::constants::{
    CANONICAL_FACE_HEIGHT, CANONICAL_FACE_WIDTH, SUBSAMPLING_FACTOR, UNKNOWN_LABEL_ID,
};
use crate::shared::frame::CameraFrame;

/// Result of driving one camera frame through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// The session already recognized someone; the frame was skipped.
    SessionStopped,
    /// No usable face in this frame (includes per-frame soft failures).
    NoFace,
    /// A face was classified but matched no gallery identity.
    Unknown,
    /// A face was found but no trained model exists.
    Unavailable,
    /// A gallery identity was recognized; the session is now stopped.
    Recognized(String),
}

/// Drives one frame through downsample → detect → normalize → classify
/// and dispatches the result to the injected sink.
///
/// Per-frame problems (bad region, detector hiccup, absent model)
/// degrade to an advisory outcome and never abort the frame loop. A
/// positive classification dispatches exactly one alert and stops the
/// session; later frames are no-ops.
pub struct RecognitionPipeline {
    downsampler: FrameDownsampler,
    detector: Box<dyn FaceDetector>,
    normalizer: FaceNormalizer,
    classifier: Box<dyn FaceClassifier>,
    labels: LabelTable,
    sink: Box<dyn RecognitionSink>,
    snapshot: Option<SnapshotWriter>,
    session: SessionHandle,
}

impl RecognitionPipeline {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        classifier: Box<dyn FaceClassifier>,
        sink: Box<dyn RecognitionSink>,
        snapshot: Option<SnapshotWriter>,
    ) -> Self {
        Self {
            downsampler: FrameDownsampler::new(SUBSAMPLING_FACTOR),
            detector,
            normalizer: FaceNormalizer::new(CANONICAL_FACE_WIDTH, CANONICAL_FACE_HEIGHT),
            classifier,
            labels: LabelTable::new(),
            sink,
            snapshot,
            session: SessionHandle::new(),
        }
    }

    /// Builds the pipeline and immediately trains from `gallery_dir`.
    ///
    /// Training failure is not fatal: the pipeline still detects faces,
    /// it just reports [`FrameOutcome::Unavailable`] until a successful
    /// [`retrain`](Self::retrain).
    pub fn with_gallery(
        detector: Box<dyn FaceDetector>,
        classifier: Box<dyn FaceClassifier>,
        sink: Box<dyn RecognitionSink>,
        snapshot: Option<SnapshotWriter>,
        gallery_dir: &Path,
    ) -> Self {
        let mut pipeline = Self::new(detector, classifier, sink, snapshot);
        pipeline.retrain(gallery_dir);
        pipeline
    }

    /// Overrides the default downsampling ratio. Takes effect from the
    /// next frame; the working buffer is reallocated on first use.
    pub fn with_subsampling_factor(mut self, factor: usize) -> Self {
        self.downsampler = FrameDownsampler::new(factor);
        self
    }

    /// Handle observing this pipeline's detection session.
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// One-shot blocking retrain from the gallery directory.
    ///
    /// On success the label table and classifier model are replaced
    /// wholesale. On failure both are cleared (a stale model must not
    /// answer for a gallery it was not trained on) and a diagnostic
    /// notification is emitted. Returns whether a model is now trained.
    pub fn retrain(&mut self, gallery_dir: &Path) -> bool {
        let result = load_gallery(gallery_dir)
            .and_then(|(table, set)| self.classifier.train(&set).map(|()| table));
        match result {
            Ok(table) => {
                self.labels = table;
                true
            }
            Err(err) => {
                log::warn!("training failed: {err}");
                self.classifier.reset();
                self.labels = LabelTable::new();
                self.sink.notify("problem with training");
                false
            }
        }
    }

    pub fn process_frame(&mut self, frame: &CameraFrame) -> FrameOutcome {
        if self.session.is_stopped() {
            return FrameOutcome::SessionStopped;
        }

        let working = self.downsampler.downsample(frame);

        let candidates = match self.detector.detect(working) {
            Ok(candidates) => candidates,
            Err(err) => {
                log::warn!("detection failed on this frame: {err}");
                self.sink.notify("problem with detection");
                return FrameOutcome::NoFace;
            }
        };

        // Single-face policy: only the first candidate in scan order is
        // used, regardless of how many the detector returned.
        let Some(region) = candidates.first() else {
            return FrameOutcome::NoFace;
        };

        let Some(face) = self.normalizer.normalize(working, region) else {
            self.sink.notify("no face image");
            return FrameOutcome::NoFace;
        };

        if let Some(writer) = &self.snapshot {
            if let Err(err) = writer.write(&face) {
                log::warn!("failed to save face snapshot: {err}");
            }
        }

        match self.classifier.predict(&face) {
            Prediction::Unavailable => {
                self.sink.notify("recognizer not trained yet");
                FrameOutcome::Unavailable
            }
            Prediction::Unknown => {
                self.sink.notify("unknown");
                FrameOutcome::Unknown
            }
            Prediction::Match { label, distance } => self.resolve_match(label, distance),
        }
    }

    fn resolve_match(&mut self, label: i32, distance: f64) -> FrameOutcome {
        // Both the reserved unknown id and an id missing from the table
        // funnel to the same advisory outcome.
        let name = match self.labels.name_of(label) {
            Some(name) if label != UNKNOWN_LABEL_ID => name.to_string(),
            _ => {
                self.sink.notify("unknown");
                return FrameOutcome::Unknown;
            }
        };

        log::info!("recognized {name} (distance {distance:.1})");
        self.sink.notify(&name);
        self.sink.dispatch_alert(&name, &self.session);
        self.session.request_stop();
        FrameOutcome::Recognized(name)
    }
}
