pub const DETECTOR_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta.bin";

/// Integer ratio by which a camera frame is shrunk before detection.
pub const SUBSAMPLING_FACTOR: usize = 4;

/// Fixed output size every detected face is rescaled to before
/// classification.
pub const CANONICAL_FACE_WIDTH: u32 = 200;
pub const CANONICAL_FACE_HEIGHT: u32 = 150;

/// Distance beyond which a prediction is treated as "unknown" rather
/// than the nearest gallery identity.
pub const REJECTION_THRESHOLD: f64 = 2000.0;

/// Separates the identity label from the rest of a training file name,
/// e.g. `alice-3.jpg` labels the image "alice".
pub const LABEL_DELIMITER: char = '-';

/// Reserved label id for the "unknown" identity.
pub const UNKNOWN_LABEL_ID: i32 = -1;

pub const GALLERY_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Default file name for the diagnostic snapshot of the last
/// normalized face.
pub const SNAPSHOT_FILENAME: &str = "last_face.png";
