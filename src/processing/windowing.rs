// src/processing/windowing.rs
//! Windowing functions applied before the forward transform

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::constants::features::KAISER_BETA;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Rectangular,
    Hamming,
    Hanning,
    Blackman,
    Kaiser,
}

impl WindowType {
    /// Window coefficients for a block of `size` samples
    pub fn coefficients(&self, size: usize) -> Vec<f64> {
        if size <= 1 {
            return vec![1.0; size];
        }
        let span = (size - 1) as f64;

        match self {
            WindowType::Rectangular => vec![1.0; size],
            WindowType::Hamming => (0..size)
                .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / span).cos())
                .collect(),
            WindowType::Hanning => (0..size)
                .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / span).cos()))
                .collect(),
            WindowType::Blackman => (0..size)
                .map(|i| {
                    let n = i as f64 / span;
                    0.42 - 0.5 * (2.0 * PI * n).cos() + 0.08 * (4.0 * PI * n).cos()
                })
                .collect(),
            WindowType::Kaiser => {
                let i0_beta = modified_bessel_i0(KAISER_BETA);
                (0..size)
                    .map(|i| {
                        let n = 2.0 * i as f64 / span - 1.0;
                        let arg = KAISER_BETA * (1.0 - n * n).max(0.0).sqrt();
                        modified_bessel_i0(arg) / i0_beta
                    })
                    .collect()
            }
        }
    }
}

// Polynomial approximation of the modified Bessel function I0
fn modified_bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let y = (x / 3.75).powi(2);
        1.0 + y * (3.5156229 + y * (3.0899424 + y * (1.2067492
            + y * (0.2659732 + y * (0.0360768 + y * 0.0045813)))))
    } else {
        let y = 3.75 / ax;
        (ax.exp() / ax.sqrt()) * (0.39894228 + y * (0.01328592
            + y * (0.00225319 + y * (-0.00157565 + y * (0.00916281
            + y * (-0.02057706 + y * (0.02635537 + y * (-0.01647633
            + y * 0.00392377))))))))
    }
}
