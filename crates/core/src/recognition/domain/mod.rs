pub mod face_classifier;
pub mod face_normalizer;
pub mod label_table;
pub mod training_set;
