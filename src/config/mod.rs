// src/config/mod.rs
//! Settings for an acquisition session and its feature extractor

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use serde::{Deserialize, Serialize};

use crate::acquisition::AcquisitionConfig;
use crate::processing::windowing::WindowType;

/// Everything needed to build an [`AcquisitionConfig`] and a
/// [`crate::processing::SpectralFeatureExtractor`]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DspSettings {
    #[serde(default = "defaults::sample_rate_hz")]
    pub sample_rate_hz: u32,

    #[serde(default = "defaults::sample_size")]
    pub sample_size: usize,

    #[serde(default = "defaults::window")]
    pub window: WindowType,

    /// Raw signal range (max - min) of the acquisition device
    #[serde(default = "defaults::signal_breadth")]
    pub signal_breadth: f64,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;
    use crate::processing::windowing::WindowType;

    pub fn sample_rate_hz() -> u32 { acquisition::DEFAULT_SAMPLE_RATE_HZ }
    pub fn sample_size() -> usize { acquisition::DEFAULT_SAMPLE_SIZE }
    pub fn window() -> WindowType { WindowType::Hanning }
    pub fn signal_breadth() -> f64 { features::DEFAULT_SIGNAL_BREADTH }
}

impl Default for DspSettings {
    fn default() -> Self {
        Self {
            sample_rate_hz: defaults::sample_rate_hz(),
            sample_size: defaults::sample_size(),
            window: defaults::window(),
            signal_breadth: defaults::signal_breadth(),
        }
    }
}

impl DspSettings {
    /// Check every field, collecting all problems
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = AcquisitionConfig::from_settings(self) {
            errors.push(e.to_string());
        }

        if !self.signal_breadth.is_finite() || self.signal_breadth == 0.0 {
            errors.push(format!(
                "signal_breadth must be finite and non-zero, got {}",
                self.signal_breadth
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = DspSettings::default();
        assert_eq!(settings.sample_rate_hz, 512);
        assert_eq!(settings.sample_size, 512);
        assert_eq!(settings.window, WindowType::Hanning);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: DspSettings = toml::from_str("sample_rate_hz = 8000").unwrap();
        assert_eq!(settings.sample_rate_hz, 8000);
        assert_eq!(settings.sample_size, 512);
        assert_eq!(settings.signal_breadth, 1.0);
    }

    #[test]
    fn test_validation_reports_acquisition_and_breadth() {
        let settings = DspSettings {
            sample_rate_hz: 0,
            sample_size: 500,
            window: WindowType::Hamming,
            signal_breadth: 0.0,
        };

        let errors = settings.validate().unwrap_err();
        // the acquisition check stops at the first bad field
        assert_eq!(errors.len(), 2);
        assert!(errors[1].contains("signal_breadth"));
    }
}
