// src/processing/mod.rs
//! Spectral processing: windowing, forward transform, features and filter design

pub mod features;
pub mod filters;
pub mod transform;
pub mod windowing;

pub use features::{frequency, ExtractorState, SpectralFeatureExtractor};
pub use filters::{FilterProvider, FilterSpec, PassFilter};
pub use transform::{FftTransform, FftTransformFactory, SpectrumTransform, TransformFactory};
pub use windowing::WindowType;
