// src/config/constants.rs
//! Crate-wide constants

/// Ticks per second for each pacing unit
pub mod time_units {
    pub const ONE_THOUSAND: u64 = 1_000;
    pub const ONE_MILLION: u64 = 1_000_000;
    pub const ONE_BILLION: u64 = 1_000_000_000;
}

/// Acquisition defaults
pub mod acquisition {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 512;
    pub const DEFAULT_SAMPLE_SIZE: usize = 512;
}

/// Feature extraction constants
pub mod features {
    /// Raw signal range (max - min) used by whole-array normalization
    pub const DEFAULT_SIGNAL_BREADTH: f64 = 1.0;

    /// Default target scale of whole-array normalization
    pub const DEFAULT_NORMALIZE_SCALE: f64 = 1.0;

    /// Distance below Nyquist of the convenience low-pass cutoff
    pub const NYQUIST_GUARD_HZ: f64 = 0.1;

    /// Lowest frequency accepted by point lookups
    pub const MIN_LOOKUP_FREQUENCY_HZ: f64 = 1.0;

    /// Kaiser window shape parameter
    pub const KAISER_BETA: f64 = 5.0;
}

/// Configuration file locations and environment overrides
pub mod paths {
    pub const DEFAULT_CONFIG_FILE: &str = "spectral.toml";
    pub const LOCAL_CONFIG_FILE: &str = "config/spectral.toml";
    pub const ENV_PREFIX: &str = "SPECTRAL_";
}
