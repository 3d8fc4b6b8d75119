//! Spectral transform and filter tests.

use proptest::prelude::*;

use genesis_kernel::math::spectral::{forward, inverse, percentile, HarmonicFilter, SpectralSample};

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()))
}

#[test]
fn roundtrip_reproduces_signal() {
    let signal = [0.5, -1.25, 3.0, 7.75, -2.0, 0.0, 4.5];
    let restored = inverse(&forward(&signal));
    assert_eq!(restored.len(), signal.len());
    for (a, b) in signal.iter().zip(&restored) {
        assert!((a - b).abs() < 1e-12, "{a} vs {b}");
    }
}

#[test]
fn zero_percentile_filter_keeps_everything() {
    let signal = [1.0, 2.0, 3.0, 4.0, 5.0];
    let spectrum = forward(&signal);
    let filtered = HarmonicFilter::new(0.0).apply(&spectrum).expect("finite");
    assert_eq!(filtered, spectrum);
}

#[test]
fn default_filter_keeps_only_strong_bins() {
    let spectrum = forward(&[1.0, 2.0, 3.0, 4.0]);
    let filtered = HarmonicFilter::default().apply(&spectrum).expect("finite");

    assert_eq!(filtered[0], spectrum[0]);
    for sample in &filtered[1..] {
        assert_eq!(*sample, SpectralSample::ZERO);
    }

    let restored = inverse(&filtered);
    for value in restored {
        assert!((value - 2.5).abs() < 1e-12);
    }
}

#[test]
fn pure_tone_lands_in_two_bins() {
    let n = 16;
    let signal: Vec<f64> = (0..n)
        .map(|i| (std::f64::consts::TAU * 3.0 * f64::from(i) / f64::from(n)).cos())
        .collect();
    let magnitudes: Vec<f64> = forward(&signal).iter().map(|s| s.magnitude()).collect();

    for (k, magnitude) in magnitudes.iter().enumerate() {
        if k == 3 || k == 13 {
            assert!((magnitude - 8.0).abs() < 1e-9, "bin {k}: {magnitude}");
        } else {
            assert!(*magnitude < 1e-9, "bin {k}: {magnitude}");
        }
    }
}

#[test]
fn percentile_matches_linear_interpolation() {
    let values = [10.0, 20.0, 30.0, 40.0, 50.0];
    assert!((percentile(&values, 90.0) - 46.0).abs() < 1e-12);
    assert!((percentile(&values, 0.0) - 10.0).abs() < 1e-12);
    assert!((percentile(&values, 100.0) - 50.0).abs() < 1e-12);
    assert!((percentile(&values, 50.0) - 30.0).abs() < 1e-12);
}

#[test]
fn transforms_are_bit_reproducible() {
    let signal: Vec<f64> = (0..200).map(|i| f64::from(i).sin() * 100.0).collect();
    assert_eq!(forward(&signal), forward(&signal));
    assert_eq!(inverse(&forward(&signal)), inverse(&forward(&signal)));
}

proptest! {
    #[test]
    fn roundtrip_within_tolerance(signal in proptest::collection::vec(-1.0e6_f64..1.0e6, 1..=64)) {
        let restored = inverse(&forward(&signal));
        let scale = max_abs(&signal);
        prop_assert_eq!(restored.len(), signal.len());
        for (a, b) in signal.iter().zip(&restored) {
            prop_assert!((a - b).abs() <= 1e-9 * scale, "{} vs {}", a, b);
        }
    }

    #[test]
    fn filter_never_grows_a_sample(signal in proptest::collection::vec(-1.0e3_f64..1.0e3, 1..=32)) {
        let spectrum = forward(&signal);
        let filtered = HarmonicFilter::default().apply(&spectrum).expect("finite");
        for (before, after) in spectrum.iter().zip(&filtered) {
            prop_assert!(*after == *before || *after == SpectralSample::ZERO);
        }
    }
}
