//! Face recognition pipeline: frame downsampling, face localization,
//! region normalization, and gallery-trained classification.
//!
//! The library is organized in domain/infrastructure layers per concern.
//! Camera capture, UI notification, and alert delivery are external
//! collaborators reached through the traits in [`pipeline`].

pub mod detection;
pub mod pipeline;
pub mod recognition;
pub mod shared;
