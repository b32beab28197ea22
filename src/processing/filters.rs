// src/processing/filters.rs
//! Cutoff design for the external filter constructors
//!
//! This crate does not filter; it validates cutoffs against the Nyquist
//! frequency and normalizes them by the sample rate. A [`FilterProvider`]
//! turns the resulting [`FilterSpec`] into a runtime filter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DspErrorBuilder, DspResult};

/// Family of pass filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassFilter {
    LowPass,
    HighPass,
    BandPass,
    NoPassFilter,
}

/// Normalized cutoff fractions (cutoff Hz / sample rate), each in `(0, 0.5)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FilterSpec {
    LowPass { cutoff: f64 },
    HighPass { cutoff: f64 },
    BandPass { lower: f64, upper: f64 },
}

impl FilterSpec {
    /// Low-pass at `cutoff_hz`, which must lie in `(0, nyquist)`
    pub fn low_pass(cutoff_hz: f64, sample_rate: u32) -> DspResult<Self> {
        check_cutoff("design_low_pass_filter", cutoff_hz, sample_rate)?;
        Ok(FilterSpec::LowPass { cutoff: cutoff_hz / f64::from(sample_rate) })
    }

    /// High-pass at `cutoff_hz`, which must lie in `(0, nyquist)`
    pub fn high_pass(cutoff_hz: f64, sample_rate: u32) -> DspResult<Self> {
        check_cutoff("design_high_pass_filter", cutoff_hz, sample_rate)?;
        Ok(FilterSpec::HighPass { cutoff: cutoff_hz / f64::from(sample_rate) })
    }

    /// Band-pass over `0 < lower_hz < upper_hz < nyquist`
    pub fn band_pass(lower_hz: f64, upper_hz: f64, sample_rate: u32) -> DspResult<Self> {
        check_cutoff("design_band_pass_filter", lower_hz, sample_rate)?;
        check_cutoff("design_band_pass_filter", upper_hz, sample_rate)?;
        if lower_hz >= upper_hz {
            return Err(DspErrorBuilder::new("filters", "design_band_pass_filter").out_of_range(
                "band",
                "lower < upper",
                format!("{}..{}", lower_hz, upper_hz),
            ));
        }

        let rate = f64::from(sample_rate);
        Ok(FilterSpec::BandPass { lower: lower_hz / rate, upper: upper_hz / rate })
    }

    pub fn kind(&self) -> PassFilter {
        match self {
            FilterSpec::LowPass { .. } => PassFilter::LowPass,
            FilterSpec::HighPass { .. } => PassFilter::HighPass,
            FilterSpec::BandPass { .. } => PassFilter::BandPass,
        }
    }

    /// The normalized fractions, lowest first
    pub fn fractions(&self) -> Vec<f64> {
        match *self {
            FilterSpec::LowPass { cutoff } | FilterSpec::HighPass { cutoff } => vec![cutoff],
            FilterSpec::BandPass { lower, upper } => vec![lower, upper],
        }
    }

    /// Recover the cutoffs in Hz for `sample_rate`
    pub fn cutoffs_hz(&self, sample_rate: u32) -> Vec<f64> {
        let rate = f64::from(sample_rate);
        self.fractions().into_iter().map(|fraction| fraction * rate).collect()
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::LowPass { cutoff } => write!(f, "low-pass @ {:.6}", cutoff),
            FilterSpec::HighPass { cutoff } => write!(f, "high-pass @ {:.6}", cutoff),
            FilterSpec::BandPass { lower, upper } => write!(f, "band-pass {:.6}..{:.6}", lower, upper),
        }
    }
}

fn check_cutoff(operation: &str, cutoff_hz: f64, sample_rate: u32) -> DspResult<()> {
    let nyquist = f64::from(sample_rate) / 2.0;
    if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
        return Err(DspErrorBuilder::new("filters", operation).out_of_range(
            "cutoff_hz",
            format!("(0, {})", nyquist),
            cutoff_hz,
        ));
    }
    Ok(())
}

/// Builds runtime filters from normalized cutoffs
pub trait FilterProvider {
    type Filter;
    type Error: std::error::Error + Send + Sync + 'static;

    fn build(&self, spec: &FilterSpec) -> Result<Self::Filter, Self::Error>;
}
