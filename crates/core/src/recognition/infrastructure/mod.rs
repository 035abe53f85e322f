pub mod eigen_classifier;
pub mod gallery_loader;
