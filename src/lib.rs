//! Spectral-Core: acquisition parameters and frequency-domain features
//!
//! This library turns a sampled biosignal into spectral features. It provides:
//!
//! - An acquisition configuration (sample rate, block size) that derives its
//!   pacing interval and notifies listeners of changes
//! - A feature extractor that keeps a forward transform sized to that
//!   configuration and derives log-power lookups, band averages, RMS,
//!   weighted moving averages and normalizations from its output
//! - Cutoff design for external low/high/band-pass filters
//! - Layered TOML settings with environment overrides
//!
//! # Quick Start
//!
//! ```rust
//! use spectral_core::acquisition::AcquisitionConfig;
//! use spectral_core::processing::{SpectralFeatureExtractor, WindowType};
//!
//! fn main() -> Result<(), spectral_core::DspError> {
//!     let config = AcquisitionConfig::new(256, 256)?.into_shared();
//!     let extractor = SpectralFeatureExtractor::new(config.clone(), WindowType::Hanning, 1.0)?;
//!
//!     let sample: Vec<f64> = (0..256)
//!         .map(|i| (2.0 * std::f64::consts::PI * 10.0 * i as f64 / 256.0).sin())
//!         .collect();
//!     let log_powers = extractor.forward_log_power_spectrum(&sample)?;
//!     let alpha = extractor.band_log_power(&log_powers, 8, 12)?;
//!     println!("alpha band: {}", alpha);
//!
//!     // The transform follows the configuration
//!     config.write().set_sample_size(128)?;
//!     assert_eq!(extractor.fft_size(), 128);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod events;
pub mod processing;
pub mod utils;

// Re-export commonly used types for convenience
pub use acquisition::{
    AcquisitionConfig, CallbackListener, ListenerHandle, SampleParameterListener,
    SharedAcquisitionConfig, TimeUnit,
};
pub use config::{ConfigError, ConfigLoader, DspSettings};
pub use error::{DspError, DspErrorBuilder, DspResult, ErrorContext};
pub use events::{EventPublisher, FeatureEvent, FeaturePayload, HostPort};
pub use processing::{
    ExtractorState, FilterProvider, FilterSpec, PassFilter, SpectralFeatureExtractor, WindowType,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Acquisition parameters and frequency-domain feature extraction".to_string(),
        features: vec![
            "Acquisition configuration with change notification".to_string(),
            "FFT-backed spectral feature extraction".to_string(),
            "Decimal round-half-up feature arithmetic".to_string(),
            "Filter cutoff design".to_string(),
            "Layered TOML settings".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}
