pub mod downsampler;
pub mod face_detector;
