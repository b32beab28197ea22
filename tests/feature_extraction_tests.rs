// ================================================================================
// Integration tests for spectral feature extraction
// File: tests/feature_extraction_tests.rs
// ================================================================================

use proptest::prelude::*;
use spectral_core::acquisition::AcquisitionConfig;
use spectral_core::processing::frequency;
use spectral_core::processing::{FilterSpec, SpectralFeatureExtractor, WindowType};
use std::f64::consts::PI;

const SAMPLE_RATE: u32 = 512;
const NYQUIST: f64 = 256.0;

fn extractor(sample_rate: u32, sample_size: usize, signal_breadth: f64) -> SpectralFeatureExtractor {
    let config = AcquisitionConfig::new(sample_rate, sample_size).unwrap().into_shared();
    SpectralFeatureExtractor::new(config, WindowType::Hanning, signal_breadth).unwrap()
}

fn sine(frequency_hz: f64, amplitude: f64, sample_rate: u32, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| amplitude * (2.0 * PI * frequency_hz * i as f64 / sample_rate as f64).sin())
        .collect()
}

#[test]
fn test_end_to_end_scenario() {
    let mut config = AcquisitionConfig::new(SAMPLE_RATE, 512).unwrap();
    config.set_sample_rate(8000).unwrap();
    assert_eq!(config.time_unit(), spectral_core::TimeUnit::Microseconds);
    assert_eq!(config.sleep_interval(), 125);
    assert!(config.set_sample_size(512).is_ok());
    assert!(config.set_sample_size(500).is_err());

    let extractor = extractor(SAMPLE_RATE, 512, 10.0);
    let normalized = extractor.normalize_sample(&[0.0, 5.0, 10.0]).unwrap();
    for (actual, expected) in normalized.iter().zip([0.0, 0.5, 1.0]) {
        assert!((actual - expected).abs() < 1e-12);
    }

    let flat = [0.0, -10.0, -10.0, -10.0, -10.0, -10.0];
    assert_eq!(extractor.band_log_power(&flat, 1, 5).unwrap(), -10.0);
}

#[test]
fn test_alpha_tone_dominates_alpha_band() {
    let extractor = extractor(256, 256, 1.0);
    let signal: Vec<f64> = sine(10.0, 1.0, 256, 256)
        .iter()
        .zip(sine(40.0, 0.1, 256, 256))
        .map(|(a, b)| a + b)
        .collect();

    let log_powers = extractor.forward_log_power_spectrum(&signal).unwrap();
    // Hanning spreads a bin-centred tone over exactly three bins
    let alpha = extractor.band_log_power(&log_powers, 9, 11).unwrap();
    let beta = extractor.band_log_power(&log_powers, 18, 24).unwrap();
    let gamma = extractor.band_log_power(&log_powers, 39, 41).unwrap();

    assert!(alpha > gamma);
    assert!(gamma > beta);
}

#[test]
fn test_transform_follows_configuration_changes() {
    let config = AcquisitionConfig::new(256, 256).unwrap().into_shared();
    let extractor = SpectralFeatureExtractor::new(config.clone(), WindowType::Hamming, 1.0).unwrap();

    assert_eq!(extractor.forward_spectrum(&sine(10.0, 1.0, 256, 256)).unwrap().len(), 256);

    config.write().set_sample_size(1024).unwrap();
    config.write().set_sample_rate(1024).unwrap();
    assert_eq!(extractor.fft_size(), 1024);
    assert_eq!(extractor.nyquist(), 512.0);

    let spectrum = extractor.forward_log_power_spectrum(&sine(300.0, 1.0, 1024, 1024)).unwrap();
    assert_eq!(spectrum.len(), 1024);
    assert!(extractor.log_power_at(&spectrum, 300.0).unwrap() > extractor.log_power_at(&spectrum, 100.0).unwrap());
    assert!(extractor.forward_spectrum(&[0.0; 256]).unwrap_err().is_invalid_argument());
}

#[test]
fn test_independent_extractors_per_thread() {
    let handles: Vec<_> = (0..4)
        .map(|t| {
            std::thread::spawn(move || {
                let extractor = extractor(256, 256, 1.0);
                let tone = 10.0 + t as f64 * 20.0;
                let spectrum = extractor.forward_log_power_spectrum(&sine(tone, 1.0, 256, 256)).unwrap();
                (1..128)
                    .max_by(|&a, &b| spectrum[a].total_cmp(&spectrum[b]))
                    .unwrap()
            })
        })
        .collect();

    let peaks: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(peaks, vec![10, 30, 50, 70]);
}

#[test]
fn test_shared_extractor_serializes_forward_calls() {
    let extractor = std::sync::Arc::new(extractor(256, 256, 1.0));
    let reference = extractor.forward_log_power_spectrum(&sine(20.0, 1.0, 256, 256)).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let extractor = extractor.clone();
            std::thread::spawn(move || {
                (0..20)
                    .map(|_| extractor.forward_log_power_spectrum(&sine(20.0, 1.0, 256, 256)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for spectrum in handle.join().unwrap() {
            assert_eq!(spectrum, reference);
        }
    }
}

#[test]
fn test_log_powers_for_during_concurrent_resize() {
    let config = AcquisitionConfig::new(512, 512).unwrap().into_shared();
    let extractor = SpectralFeatureExtractor::new(config.clone(), WindowType::Hanning, 1.0).unwrap();
    let stop = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));

    let resizer = {
        let config = config.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                config.write().set_sample_size(128).unwrap();
                config.write().set_sample_rate(256).unwrap();
                config.write().set_sample_size(512).unwrap();
                config.write().set_sample_rate(512).unwrap();
            }
        })
    };

    // 200 Hz is only valid for the 512/512 configuration, a 128-sample
    // block only for the 128-point transform, so every call must fail
    // cleanly whatever configuration it observes.
    let short_block = sine(10.0, 1.0, 256, 128);
    for _ in 0..2000 {
        let result = extractor.log_powers_for(&short_block, &[200.0]);
        assert!(result.unwrap_err().is_invalid_argument());
    }

    stop.store(true, std::sync::atomic::Ordering::Relaxed);
    resizer.join().unwrap();
}

#[test]
fn test_rms_and_wma_on_spectrum() {
    let extractor = extractor(256, 256, 1.0);
    let cosine: Vec<f64> = (0..256)
        .map(|i| (2.0 * PI * 10.0 * i as f64 / 256.0).cos())
        .collect();
    let spectrum = extractor.forward_spectrum(&cosine).unwrap();
    let magnitudes = extractor.absolute_values(&spectrum);

    let band_rms = extractor.rms(8, 12, &magnitudes).unwrap();
    let quiet_rms = extractor.rms(60, 64, &magnitudes).unwrap();
    assert!(band_rms > quiet_rms);

    let history = [band_rms, band_rms, band_rms];
    assert!((extractor.weighted_moving_average(&history) - band_rms).abs() < 1e-9);
}

#[test]
fn test_filter_designs() {
    let extractor = extractor(SAMPLE_RATE, 512, 1.0);

    let band = extractor.design_band_pass_filter(8.0, 12.0).unwrap();
    assert_eq!(band.cutoffs_hz(SAMPLE_RATE), vec![8.0, 12.0]);

    let high = extractor.design_high_pass_filter(0.5).unwrap();
    assert!(matches!(high, FilterSpec::HighPass { .. }));

    assert!(extractor.design_low_pass_filter(NYQUIST).is_err());
    assert!(extractor.design_band_pass_filter(0.0, 12.0).is_err());

    match extractor.nyquist_low_pass_filter().unwrap() {
        FilterSpec::LowPass { cutoff } => assert!(cutoff < 0.5 && cutoff > 0.499),
        other => panic!("unexpected filter {:?}", other),
    }
}

proptest! {
    #[test]
    fn prop_integral_lookup_is_exact(
        powers in prop::collection::vec(-100.0f64..100.0, 256),
        frequency in 1usize..=NYQUIST as usize - 1,
    ) {
        let value = frequency::log_power_at(&powers, frequency as f64, NYQUIST).unwrap();
        prop_assert_eq!(value, powers[frequency]);
    }

    #[test]
    fn prop_interpolation_is_strictly_between_neighbours(
        low in -100.0f64..100.0,
        delta in prop_oneof![-100.0f64..-0.01, 0.01f64..100.0],
        bin in 1usize..250,
        fraction in 0.01f64..0.99,
    ) {
        let high = low + delta;
        let mut powers = vec![0.0; 256];
        powers[bin] = low;
        powers[bin + 1] = high;

        let value = frequency::log_power_at(&powers, bin as f64 + fraction, NYQUIST).unwrap();
        prop_assert!(value > low.min(high) && value < low.max(high));

        let expected = low + (high - low) * fraction;
        prop_assert!((value - expected).abs() < 1e-6);
    }

    #[test]
    fn prop_interpolation_with_infinite_neighbour_is_zero(
        finite in -100.0f64..100.0,
        bin in 1usize..250,
        fraction in 0.01f64..0.99,
        infinite in prop_oneof![Just(f64::INFINITY), Just(f64::NEG_INFINITY)],
        infinite_high in any::<bool>(),
    ) {
        let mut powers = vec![0.0; 256];
        powers[bin] = if infinite_high { finite } else { infinite };
        powers[bin + 1] = if infinite_high { infinite } else { finite };

        prop_assert_eq!(frequency::log_power_at(&powers, bin as f64 + fraction, NYQUIST).unwrap(), 0.0);
    }

    #[test]
    fn prop_band_average_of_constant_is_constant(
        value in -100.0f64..100.0,
        lower in 1usize..200,
        width in 1usize..=6,
    ) {
        let powers = vec![value; 256];
        let upper = lower + width - 1;

        let average = frequency::band_log_power(&powers, lower, upper, NYQUIST).unwrap();
        prop_assert!((average - value).abs() < 1e-9, "{} vs {}", average, value);
    }

    #[test]
    fn prop_normalize_range_bounds(
        values in prop::collection::vec(-1000.0f64..1000.0, 64),
        lower in 1usize..30,
        span in 1usize..30,
    ) {
        let upper = lower + span;
        let normalized = frequency::normalize_range(&values, lower, upper, NYQUIST).unwrap();

        prop_assert_eq!(normalized.len(), values.len());
        for (i, v) in normalized.iter().enumerate() {
            if i < lower || i > upper {
                prop_assert_eq!(*v, 0.0);
            } else {
                prop_assert!((0.0..=1.0).contains(v), "index {} -> {}", i, v);
            }
        }
    }

    #[test]
    fn prop_normalize_range_infinite_passes_through(
        values in prop::collection::vec(-1000.0f64..1000.0, 64),
        lower in 1usize..30,
        span in 1usize..30,
        offset in 0usize..30,
    ) {
        let mut values = values;
        let upper = lower + span;
        values[lower + offset % (span + 1)] = f64::INFINITY;

        let normalized = frequency::normalize_range(&values, lower, upper, NYQUIST).unwrap();
        prop_assert_eq!(&normalized[lower..=upper], &values[lower..=upper]);
    }

    #[test]
    fn prop_low_pass_design_recovers_cutoff(cutoff in 0.001f64..255.999) {
        let spec = FilterSpec::low_pass(cutoff, SAMPLE_RATE).unwrap();
        let recovered = spec.cutoffs_hz(SAMPLE_RATE)[0];
        prop_assert!((recovered - cutoff).abs() < 1e-9);
    }
}
