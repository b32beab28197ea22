// src/acquisition/acquisition_config.rs
//! Sample rate and sample block size for an acquisition session
//!
//! [`AcquisitionConfig`] owns the two parameters every spectral feature
//! depends on. The time unit and per-sample sleep interval are derived from
//! the sample rate and recomputed synchronously on every rate change, and
//! registered listeners are told about each change before the setter
//! returns.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::listeners::{ListenerHandle, SampleParameterListener};
use crate::config::constants::time_units::{ONE_BILLION, ONE_MILLION, ONE_THOUSAND};
use crate::config::DspSettings;
use crate::error::{DspErrorBuilder, DspResult};
use crate::utils::decimal::divide_integers_half_up;

/// Shared handle used when several components observe one configuration
pub type SharedAcquisitionConfig = Arc<RwLock<AcquisitionConfig>>;

/// Granularity used to pace sample playback, chosen from the sample rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl TimeUnit {
    /// Rates up to 1 kHz tick in milliseconds, up to 1 MHz in microseconds,
    /// anything faster in nanoseconds.
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        let rate = u64::from(sample_rate);
        if rate <= ONE_THOUSAND {
            TimeUnit::Milliseconds
        } else if rate <= ONE_MILLION {
            TimeUnit::Microseconds
        } else {
            TimeUnit::Nanoseconds
        }
    }

    /// Ticks of this unit per second
    pub fn base(&self) -> u64 {
        match self {
            TimeUnit::Milliseconds => ONE_THOUSAND,
            TimeUnit::Microseconds => ONE_MILLION,
            TimeUnit::Nanoseconds => ONE_BILLION,
        }
    }

    pub fn to_duration(&self, ticks: u64) -> Duration {
        match self {
            TimeUnit::Milliseconds => Duration::from_millis(ticks),
            TimeUnit::Microseconds => Duration::from_micros(ticks),
            TimeUnit::Nanoseconds => Duration::from_nanos(ticks),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Milliseconds => write!(f, "ms"),
            TimeUnit::Microseconds => write!(f, "us"),
            TimeUnit::Nanoseconds => write!(f, "ns"),
        }
    }
}

/// Sample rate / sample size state with change notification
pub struct AcquisitionConfig {
    sample_rate: u32,
    sample_size: usize,
    time_unit: TimeUnit,
    listeners: Vec<(ListenerHandle, Arc<dyn SampleParameterListener>)>,
    next_handle: u64,
}

impl AcquisitionConfig {
    /// Create a validated configuration
    pub fn new(sample_rate: u32, sample_size: usize) -> DspResult<Self> {
        validate_sample_rate(sample_rate)?;
        validate_sample_size(sample_size)?;

        Ok(Self {
            sample_rate,
            sample_size,
            time_unit: TimeUnit::for_sample_rate(sample_rate),
            listeners: Vec::new(),
            next_handle: 0,
        })
    }

    pub fn from_settings(settings: &DspSettings) -> DspResult<Self> {
        Self::new(settings.sample_rate_hz, settings.sample_size)
    }

    /// Wrap into the shared handle the extractor binds to
    pub fn into_shared(self) -> SharedAcquisitionConfig {
        Arc::new(RwLock::new(self))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    /// Highest frequency representable without aliasing
    pub fn nyquist(&self) -> f64 {
        f64::from(self.sample_rate) / 2.0
    }

    /// Set the sample rate; rejects zero.
    ///
    /// Listeners are notified only when the rate actually changes.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> DspResult<()> {
        validate_sample_rate(sample_rate)?;

        if sample_rate == self.sample_rate {
            return Ok(());
        }

        self.sample_rate = sample_rate;
        self.time_unit = TimeUnit::for_sample_rate(sample_rate);
        debug!(sample_rate, time_unit = %self.time_unit, "sample rate changed");

        for (handle, listener) in &self.listeners {
            trace!(?handle, "dispatching sample rate change");
            listener.sample_rate_changed(self);
        }
        Ok(())
    }

    /// Set the sample block size; must be a power of two.
    pub fn set_sample_size(&mut self, sample_size: usize) -> DspResult<()> {
        validate_sample_size(sample_size)?;

        if sample_size == self.sample_size {
            return Ok(());
        }

        self.sample_size = sample_size;
        debug!(sample_size, "sample size changed");

        for (handle, listener) in &self.listeners {
            trace!(?handle, "dispatching sample size change");
            listener.sample_size_changed(self);
        }
        Ok(())
    }

    /// Time between consecutive samples in [`Self::time_unit`] ticks,
    /// rounded half up.
    pub fn sleep_interval(&self) -> u64 {
        divide_integers_half_up(self.time_unit.base(), u64::from(self.sample_rate))
    }

    /// [`Self::sleep_interval`] as a [`Duration`]
    pub fn sleep_duration(&self) -> Duration {
        self.time_unit.to_duration(self.sleep_interval())
    }

    /// Register a listener; callbacks fire in registration order.
    pub fn add_listener(&mut self, listener: Arc<dyn SampleParameterListener>) -> ListenerHandle {
        let handle = ListenerHandle(self.next_handle);
        self.next_handle += 1;
        self.listeners.push((handle, listener));
        handle
    }

    /// Remove a listener by handle. Returns false if it was not registered.
    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for AcquisitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquisitionConfig")
            .field("sample_rate", &self.sample_rate)
            .field("sample_size", &self.sample_size)
            .field("time_unit", &self.time_unit)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn validate_sample_rate(sample_rate: u32) -> DspResult<()> {
    if sample_rate == 0 {
        return Err(DspErrorBuilder::new("acquisition", "set_sample_rate")
            .out_of_range("sample_rate", "> 0", sample_rate));
    }
    Ok(())
}

fn validate_sample_size(sample_size: usize) -> DspResult<()> {
    if !sample_size.is_power_of_two() {
        return Err(DspErrorBuilder::new("acquisition", "set_sample_size")
            .out_of_range("sample_size", "a power of two", sample_size));
    }
    Ok(())
}
