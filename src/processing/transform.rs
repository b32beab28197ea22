// src/processing/transform.rs
//! Forward transform from a time-domain block to per-bin spectra
//!
//! The feature extractor only talks to [`SpectrumTransform`] and
//! [`TransformFactory`]; [`FftTransform`] is the default provider, built on
//! `rustfft`. A transform is sized once at creation and must be replaced,
//! not resized, when the acquisition parameters change.

use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::windowing::WindowType;
use crate::error::{DspErrorBuilder, DspResult};

/// A forward transform bound to one FFT size and sample rate
pub trait SpectrumTransform: Send {
    fn fft_size(&self) -> usize;

    fn sample_rate(&self) -> u32;

    fn window(&self) -> WindowType;

    fn set_window(&mut self, window: WindowType);

    /// Transform `sample` in place; its length must equal [`Self::fft_size`].
    fn forward(&mut self, sample: &[f64]) -> DspResult<()>;

    /// Real component of every bin of the last forward call
    fn real_spectrum(&self) -> Vec<f64>;

    /// Natural log of the power of every bin of the last forward call
    fn log_power_spectrum(&self) -> Vec<f64>;
}

/// Creates transforms for the current acquisition parameters
pub trait TransformFactory: Send + Sync {
    fn create(
        &self,
        fft_size: usize,
        sample_rate: u32,
        window: WindowType,
    ) -> DspResult<Box<dyn SpectrumTransform>>;
}

/// Factory for [`FftTransform`]
#[derive(Debug, Default, Clone, Copy)]
pub struct FftTransformFactory;

impl TransformFactory for FftTransformFactory {
    fn create(
        &self,
        fft_size: usize,
        sample_rate: u32,
        window: WindowType,
    ) -> DspResult<Box<dyn SpectrumTransform>> {
        Ok(Box::new(FftTransform::new(fft_size, sample_rate, window)?))
    }
}

/// Windowed complex FFT over real input
pub struct FftTransform {
    fft_size: usize,
    sample_rate: u32,
    window: WindowType,
    coefficients: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl FftTransform {
    pub fn new(fft_size: usize, sample_rate: u32, window: WindowType) -> DspResult<Self> {
        if !fft_size.is_power_of_two() {
            return Err(DspErrorBuilder::new("transform", "create")
                .out_of_range("fft_size", "a power of two", fft_size));
        }
        if sample_rate == 0 {
            return Err(DspErrorBuilder::new("transform", "create")
                .out_of_range("sample_rate", "> 0", sample_rate));
        }

        let fft = FftPlanner::<f64>::new().plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            fft_size,
            sample_rate,
            window,
            coefficients: window.coefficients(fft_size),
            fft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
        })
    }
}

impl SpectrumTransform for FftTransform {
    fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn window(&self) -> WindowType {
        self.window
    }

    fn set_window(&mut self, window: WindowType) {
        if window != self.window {
            self.window = window;
            self.coefficients = window.coefficients(self.fft_size);
        }
    }

    fn forward(&mut self, sample: &[f64]) -> DspResult<()> {
        if sample.len() != self.fft_size {
            return Err(DspErrorBuilder::new("transform", "forward")
                .out_of_range("sample length", self.fft_size, sample.len()));
        }

        for ((slot, &value), &coefficient) in self
            .buffer
            .iter_mut()
            .zip(sample.iter())
            .zip(self.coefficients.iter())
        {
            *slot = Complex::new(value * coefficient, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
        Ok(())
    }

    fn real_spectrum(&self) -> Vec<f64> {
        self.buffer.iter().map(|c| c.re).collect()
    }

    fn log_power_spectrum(&self) -> Vec<f64> {
        self.buffer.iter().map(|c| c.norm_sqr().ln()).collect()
    }
}

impl fmt::Debug for FftTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftTransform")
            .field("fft_size", &self.fft_size)
            .field("sample_rate", &self.sample_rate)
            .field("window", &self.window)
            .finish()
    }
}
