//! Spectral feature extraction bound to an acquisition configuration
//!
//! [`SpectralFeatureExtractor`] owns a forward transform sized for the
//! current sample rate and sample size. It listens to its
//! [`AcquisitionConfig`] and replaces the transform synchronously whenever
//! either parameter changes, so a caller never sees a transform with stale
//! dimensions. The numeric features themselves live in [`frequency`] and
//! are exposed here with the Nyquist frequency filled in.

pub mod frequency;

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::acquisition::{
    AcquisitionConfig, ListenerHandle, SampleParameterListener, SharedAcquisitionConfig,
};
use crate::config::constants::features::{DEFAULT_NORMALIZE_SCALE, NYQUIST_GUARD_HZ};
use crate::config::DspSettings;
use crate::error::{DspErrorBuilder, DspResult};
use crate::events::{EventPublisher, FeatureEvent, FeaturePayload};
use crate::processing::filters::FilterSpec;
use crate::processing::transform::{FftTransformFactory, SpectrumTransform, TransformFactory};
use crate::processing::windowing::WindowType;

/// Whether the extractor currently holds a transform matching its config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorState {
    Bound,
    /// The last rebuild failed; forward calls error until the next change
    Stale,
}

struct TransformSlot {
    transform: Option<Box<dyn SpectrumTransform>>,
    window: WindowType,
}

/// Recreates the extractor's transform on every config change
struct TransformRebuilder {
    slot: Weak<Mutex<TransformSlot>>,
    factory: Arc<dyn TransformFactory>,
}

impl TransformRebuilder {
    fn rebuild(&self, config: &AcquisitionConfig) {
        let Some(slot) = self.slot.upgrade() else {
            return;
        };
        let mut slot = slot.lock();

        match self.factory.create(config.sample_size(), config.sample_rate(), slot.window) {
            Ok(transform) => {
                debug!(
                    fft_size = config.sample_size(),
                    sample_rate = config.sample_rate(),
                    "transform rebuilt"
                );
                slot.transform = Some(transform);
            }
            Err(e) => {
                warn!(error = %e, "transform rebuild failed, extractor is stale");
                slot.transform = None;
            }
        }
    }
}

impl SampleParameterListener for TransformRebuilder {
    fn sample_rate_changed(&self, config: &AcquisitionConfig) {
        self.rebuild(config);
    }

    fn sample_size_changed(&self, config: &AcquisitionConfig) {
        self.rebuild(config);
    }
}

/// Frequency-domain feature extractor
///
/// Forward calls lock the owned transform, so concurrent calls on one
/// extractor are serialized. Use one extractor per thread for parallelism.
///
/// Dropping an extractor takes the configuration's write lock to remove its
/// listener. Do not drop one while the same thread holds that lock, for
/// example from inside a [`SampleParameterListener`] callback or while a
/// `config.write()` guard is alive; the lock is not reentrant and the drop
/// deadlocks.
pub struct SpectralFeatureExtractor {
    config: SharedAcquisitionConfig,
    slot: Arc<Mutex<TransformSlot>>,
    signal_breadth: f64,
    registration: ListenerHandle,
}

impl SpectralFeatureExtractor {
    /// Bind to `config` using the default FFT transform
    pub fn new(config: SharedAcquisitionConfig, window: WindowType, signal_breadth: f64) -> DspResult<Self> {
        Self::with_factory(config, window, signal_breadth, Arc::new(FftTransformFactory))
    }

    pub fn from_settings(config: SharedAcquisitionConfig, settings: &DspSettings) -> DspResult<Self> {
        Self::new(config, settings.window, settings.signal_breadth)
    }

    /// Bind to `config`, creating transforms with `factory`
    pub fn with_factory(
        config: SharedAcquisitionConfig,
        window: WindowType,
        signal_breadth: f64,
        factory: Arc<dyn TransformFactory>,
    ) -> DspResult<Self> {
        if signal_breadth == 0.0 || !signal_breadth.is_finite() {
            return Err(DspErrorBuilder::new("extractor", "create")
                .out_of_range("signal_breadth", "finite and non-zero", signal_breadth));
        }

        // Held across creation and registration so no change slips in between.
        let mut guard = config.write();
        let transform = factory.create(guard.sample_size(), guard.sample_rate(), window)?;

        let slot = Arc::new(Mutex::new(TransformSlot {
            transform: Some(transform),
            window,
        }));
        let registration = guard.add_listener(Arc::new(TransformRebuilder {
            slot: Arc::downgrade(&slot),
            factory,
        }));
        drop(guard);

        Ok(Self {
            config,
            slot,
            signal_breadth,
            registration,
        })
    }

    pub fn config(&self) -> &SharedAcquisitionConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.read().sample_rate()
    }

    pub fn fft_size(&self) -> usize {
        self.config.read().sample_size()
    }

    /// Highest frequency measurable at the current sample rate
    pub fn nyquist(&self) -> f64 {
        self.config.read().nyquist()
    }

    /// Alias of [`Self::nyquist`]
    pub fn upper_measurable_frequency(&self) -> f64 {
        self.nyquist()
    }

    pub fn signal_breadth(&self) -> f64 {
        self.signal_breadth
    }

    pub fn state(&self) -> ExtractorState {
        if self.slot.lock().transform.is_some() {
            ExtractorState::Bound
        } else {
            ExtractorState::Stale
        }
    }

    pub fn window(&self) -> WindowType {
        self.slot.lock().window
    }

    /// Swap the window on the live transform and on every future rebuild
    pub fn set_window(&self, window: WindowType) {
        let mut slot = self.slot.lock();
        slot.window = window;
        if let Some(transform) = slot.transform.as_mut() {
            transform.set_window(window);
        }
    }

    /// Real component of the forward transform of `sample`
    pub fn forward_spectrum(&self, sample: &[f64]) -> DspResult<Vec<f64>> {
        self.with_transform("forward_spectrum", sample, |t| t.real_spectrum())
    }

    /// Log power of the forward transform of `sample`
    pub fn forward_log_power_spectrum(&self, sample: &[f64]) -> DspResult<Vec<f64>> {
        self.with_transform("forward_log_power_spectrum", sample, |t| t.log_power_spectrum())
    }

    fn with_transform<F>(&self, operation: &str, sample: &[f64], read: F) -> DspResult<Vec<f64>>
    where
        F: FnOnce(&dyn SpectrumTransform) -> Vec<f64>,
    {
        let mut slot = self.slot.lock();
        let transform = slot
            .transform
            .as_mut()
            .ok_or_else(|| DspErrorBuilder::new("extractor", operation).transform("no transform bound"))?;

        transform.forward(sample)?;
        Ok(read(&**transform))
    }

    /// Point or interpolated log power, see [`frequency::log_power_at`]
    pub fn log_power_at(&self, log_powers: &[f64], frequency_hz: f64) -> DspResult<f64> {
        frequency::log_power_at(log_powers, frequency_hz, self.nyquist())
    }

    /// Triangularly weighted band average, see [`frequency::band_log_power`]
    pub fn band_log_power(&self, log_powers: &[f64], lower_hz: usize, upper_hz: usize) -> DspResult<f64> {
        frequency::band_log_power(log_powers, lower_hz, upper_hz, self.nyquist())
    }

    /// Transform `sample` once and resolve each requested frequency.
    ///
    /// Returns `(frequency, log power)` pairs in request order. Every
    /// frequency is validated before the transform runs.
    pub fn log_powers_for(&self, sample: &[f64], frequencies: &[f64]) -> DspResult<Vec<(f64, f64)>> {
        if frequencies.is_empty() {
            return Err(DspErrorBuilder::new("extractor", "log_powers_for")
                .invalid_argument("frequencies", "must not be empty"));
        }

        // Held until the transform has run so a concurrent resize cannot
        // shrink the spectrum between validation and indexing.
        let config = self.config.read();
        let (nyquist, fft_size) = (config.nyquist(), config.sample_size());

        for &frequency in frequencies {
            let integral = frequency.fract() == 0.0;
            let in_range = frequency >= 1.0
                && frequency < nyquist
                && (integral || frequency <= nyquist - 1.0)
                && (frequency.ceil() as usize) < fft_size;

            if !in_range {
                return Err(DspErrorBuilder::new("extractor", "log_powers_for").out_of_range(
                    "frequency_hz",
                    format!("[1, {})", nyquist),
                    frequency,
                ));
            }
        }

        let log_powers = self.forward_log_power_spectrum(sample)?;
        drop(config);

        frequencies
            .iter()
            .map(|&frequency| {
                let power = if frequency.fract() == 0.0 {
                    log_powers[frequency as usize]
                } else {
                    frequency::log_power_at(&log_powers, frequency, nyquist)?
                };
                Ok((frequency, power))
            })
            .collect()
    }

    /// Compute [`Self::log_powers_for`] and hand the result to `publisher`
    pub fn publish_log_powers<E>(
        &self,
        sample: &[f64],
        frequencies: &[f64],
        event_type: E,
        publisher: &dyn EventPublisher<E>,
    ) -> DspResult<()> {
        let powers = self.log_powers_for(sample, frequencies)?;
        publisher.publish(FeatureEvent::new(event_type, FeaturePayload::LogPowers(powers)));
        Ok(())
    }

    /// Root mean square over a range, see [`frequency::rms`]
    pub fn rms(&self, lower_hz: usize, upper_hz: usize, values: &[f64]) -> DspResult<f64> {
        frequency::rms(lower_hz, upper_hz, values, self.nyquist())
    }

    pub fn weighted_moving_average(&self, values: &[f64]) -> f64 {
        frequency::weighted_moving_average(values)
    }

    /// Min-max normalize a cutoff range, see [`frequency::normalize_range`]
    pub fn normalize(&self, values: &[f64], lower_cutoff_hz: usize, upper_cutoff_hz: usize) -> DspResult<Vec<f64>> {
        frequency::normalize_range(values, lower_cutoff_hz, upper_cutoff_hz, self.nyquist())
    }

    /// Rescale raw device units into `[0, 1]`-ish amplitude
    pub fn normalize_sample(&self, sample: &[f64]) -> DspResult<Vec<f64>> {
        self.normalize_sample_scaled(sample, DEFAULT_NORMALIZE_SCALE)
    }

    /// Rescale raw device units by `scale / signal_breadth`
    pub fn normalize_sample_scaled(&self, sample: &[f64], scale: f64) -> DspResult<Vec<f64>> {
        frequency::normalize_scaled(sample, scale, self.signal_breadth)
    }

    pub fn design_band_pass_filter(&self, lower_hz: f64, upper_hz: f64) -> DspResult<FilterSpec> {
        FilterSpec::band_pass(lower_hz, upper_hz, self.sample_rate())
    }

    pub fn design_high_pass_filter(&self, cutoff_hz: f64) -> DspResult<FilterSpec> {
        FilterSpec::high_pass(cutoff_hz, self.sample_rate())
    }

    pub fn design_low_pass_filter(&self, cutoff_hz: f64) -> DspResult<FilterSpec> {
        FilterSpec::low_pass(cutoff_hz, self.sample_rate())
    }

    /// Low-pass just below Nyquist, suppressing content at or above it
    #[doc(alias = "esp_low_pass_filter")]
    pub fn nyquist_low_pass_filter(&self) -> DspResult<FilterSpec> {
        let sample_rate = self.sample_rate();
        FilterSpec::low_pass(f64::from(sample_rate) / 2.0 - NYQUIST_GUARD_HZ, sample_rate)
    }

    pub fn absolute_values(&self, values: &[f64]) -> Vec<f64> {
        frequency::absolute_values(values)
    }
}

impl Drop for SpectralFeatureExtractor {
    fn drop(&mut self) {
        self.config.write().remove_listener(self.registration);
    }
}

impl fmt::Debug for SpectralFeatureExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralFeatureExtractor")
            .field("config", &*self.config.read())
            .field("signal_breadth", &self.signal_breadth)
            .field("registration", &self.registration)
            .finish()
    }
}
